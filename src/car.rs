use rand::Rng;

use crate::track::Track;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarSpec {
    pub max_speed: f32,      // units / frame
    pub acceleration: f32,   // speed gained per frame of throttle
    pub deceleration: f32,   // reverse build-up once stopped
    pub braking_power: f32,  // speed shed per frame of brake while moving forward
    pub reverse_speed: f32,  // magnitude of the negative speed limit
    pub max_steering: f32,   // |steering| limit
    pub steering_speed: f32, // steering change per frame
    pub drift_factor: f32,   // 0..1, speed kept per drifting frame

    // --- Sprite ---
    pub width: f32,
    pub height: f32,
    pub color: &'static str,
}

pub const PLAYER_SPEC: CarSpec = CarSpec {
    max_speed: 300.0,
    acceleration: 1.5,
    deceleration: 2.0,
    braking_power: 4.0,
    reverse_speed: 100.0,
    max_steering: 0.1,
    steering_speed: 0.03,
    drift_factor: 0.95,
    width: 30.0,
    height: 50.0,
    color: "#FF0000",
};

pub const AI_COLORS: [&str; 4] = ["#0000FF", "#00FF00", "#FFFF00", "#FF00FF"];

impl CarSpec {
    /// A freshly rolled opponent; returns the spec and its starting speed.
    pub fn random_ai<R: Rng + ?Sized>(rng: &mut R, color: &'static str) -> (CarSpec, f32) {
        let start_speed = 150.0 + rng.gen_range(0.0..1.0f32) * 50.0;
        let spec = CarSpec {
            max_speed: 250.0 + rng.gen_range(0.0..1.0f32) * 50.0,
            acceleration: 1.0 + rng.gen_range(0.0..1.0f32),
            max_steering: 0.08,
            steering_speed: 0.02 + rng.gen_range(0.0..1.0f32) * 0.01,
            color,
            ..PLAYER_SPEC
        };
        (spec, start_speed)
    }
}

/// Fixed driving personality of an AI car.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiProfile {
    pub aggression: f32, // 0.5..1, scales steering response
    pub skill: f32,      // 0.5..1, 1 = tightest racing line
}

impl AiProfile {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            aggression: 0.5 + rng.gen_range(0.0..1.0f32) * 0.5,
            skill: 0.5 + rng.gen_range(0.0..1.0f32) * 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Driver {
    /// Screen anchor the player sprite is drawn at.
    Player { anchor: [f32; 2] },
    Ai(AiProfile),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub spec: CarSpec,
    pub driver: Driver,

    pub position: f32, // distance along the loop
    pub offset: f32,   // lateral, 0 = road centre
    pub speed: f32,
    pub steering: f32,
    pub segment: usize,

    pub lap: u32,
    pub next_checkpoint: usize,
    pub recorded_checkpoint: usize, // next_checkpoint as of the previous frame
    pub rank: usize,
}

impl Car {
    fn new(spec: CarSpec, driver: Driver) -> Self {
        Self {
            spec,
            driver,
            position: 0.0,
            offset: 0.0,
            speed: 0.0,
            steering: 0.0,
            segment: 0,
            lap: 1,
            next_checkpoint: 0,
            recorded_checkpoint: 0,
            rank: 1,
        }
    }

    pub fn player(spec: CarSpec, anchor: [f32; 2]) -> Self {
        Self::new(spec, Driver::Player { anchor })
    }

    pub fn ai(spec: CarSpec, profile: AiProfile) -> Self {
        Self::new(spec, Driver::Ai(profile))
    }

    /// Roll a complete opponent: spec, profile, start segment and offset.
    pub fn random_ai<R: Rng + ?Sized>(rng: &mut R, track: &Track, color: &'static str) -> Self {
        let (spec, start_speed) = CarSpec::random_ai(rng, color);
        let profile = AiProfile::random(rng);
        let mut car = Car::ai(spec, profile);

        let segment_count = track.segments().len();
        if segment_count > 0 {
            car.segment = rng.gen_range(0..segment_count);
            car.position = track.segments()[..car.segment]
                .iter()
                .map(|s| s.length)
                .sum();
        }
        car.offset = (rng.gen_range(0.0..1.0f32) - 0.5) * (track.geometry().width / 3.0);
        car.offset = car.offset.clamp(
            -track.lateral_bound(spec.width),
            track.lateral_bound(spec.width),
        );
        car.speed = start_speed.min(spec.max_speed);
        car
    }

    pub fn ai_profile(&self) -> Option<AiProfile> {
        match self.driver {
            Driver::Ai(profile) => Some(profile),
            Driver::Player { .. } => None,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.driver, Driver::Player { .. })
    }

    /// Drifting: hard steering at speed.
    pub fn is_drifting(&self, speed_threshold: f32) -> bool {
        self.steering.abs() > self.spec.max_steering * 0.8 && self.speed > speed_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn player_starts_on_the_grid() {
        let car = Car::player(PLAYER_SPEC, [400.0, 510.0]);
        assert!(car.is_player());
        assert_eq!(car.lap, 1);
        assert_eq!(car.speed, 0.0);
        assert_eq!(car.ai_profile(), None);
    }

    #[test]
    fn random_ai_within_ranges() {
        let track = Track::standard(3);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for _ in 0..50 {
            let car = Car::random_ai(&mut rng, &track, AI_COLORS[0]);
            let profile = car.ai_profile().unwrap();

            assert!((250.0..=300.0).contains(&car.spec.max_speed));
            assert!((1.0..=2.0).contains(&car.spec.acceleration));
            assert!((0.02..=0.03).contains(&car.spec.steering_speed));
            assert_eq!(car.spec.max_steering, 0.08);
            assert!((150.0..=200.0).contains(&car.speed));
            assert!((0.5..=1.0).contains(&profile.aggression));
            assert!((0.5..=1.0).contains(&profile.skill));
            assert!(car.segment < track.segments().len());
            assert_eq!(track.segment_at(car.position).index, car.segment);
            assert!(car.offset.abs() <= track.geometry().width / 6.0);
        }
    }

    #[test]
    fn same_seed_same_opponent() {
        let track = Track::standard(3);
        let a = Car::random_ai(&mut ChaCha8Rng::seed_from_u64(3), &track, AI_COLORS[1]);
        let b = Car::random_ai(&mut ChaCha8Rng::seed_from_u64(3), &track, AI_COLORS[1]);
        assert_eq!(a, b);
    }

    #[test]
    fn drift_needs_both_steering_and_speed() {
        let mut car = Car::player(PLAYER_SPEC, [0.0, 0.0]);
        car.steering = 0.09;
        car.speed = 50.0;
        assert!(!car.is_drifting(100.0));
        car.speed = 150.0;
        assert!(car.is_drifting(100.0));
        car.steering = 0.05;
        assert!(!car.is_drifting(100.0));
    }
}
