// src/physics.rs

use crate::car::Car;
use crate::input::ControlInputs;
use crate::track::Track;

/// Speed kept per frame (rolling resistance + drag in one number).
pub const FRICTION: f32 = 0.98;
/// Lateral drift per unit of steering * speed.
pub const LATERAL_GAIN: f32 = 0.01;
/// Steering kept per frame when no steer key is held.
pub const STEER_RECENTER: f32 = 0.9;

/// Advance one car by one frame.
///
/// Order matters: friction -> speed clamp -> move -> wrap -> segment lookup
/// -> lateral integrate -> lateral clamp. Swapping the lateral step before
/// the move changes how the car answers a curve.
pub fn advance(car: &mut Car, track: &Track) {
    car.speed *= FRICTION;
    car.speed = clamp_speed(car, car.speed);

    car.position = track.wrap(car.position + car.speed);
    car.segment = track.segment_at(car.position).index;

    car.offset += car.steering * car.speed * LATERAL_GAIN;
    let bound = track.lateral_bound(car.spec.width);
    car.offset = car.offset.clamp(-bound, bound);
}

/// Apply one sampled input snapshot to the player car.
pub fn apply_controls(car: &mut Car, inputs: &ControlInputs) {
    let spec = car.spec;

    if inputs.accelerate {
        car.speed += spec.acceleration;
    }
    if inputs.brake {
        if car.speed > 0.0 {
            car.speed -= spec.braking_power;
        } else {
            car.speed -= spec.deceleration;
        }
    }

    let steer_rate = if inputs.drift && spec.drift_factor > 0.0 {
        spec.steering_speed / spec.drift_factor
    } else {
        spec.steering_speed
    };

    let steering_one_way = inputs.left != inputs.right;
    if steering_one_way {
        if inputs.left {
            car.steering -= steer_rate;
        } else {
            car.steering += steer_rate;
        }
        if inputs.drift {
            car.speed *= spec.drift_factor;
        }
    } else {
        car.steering *= STEER_RECENTER;
    }

    car.steering = clamp_steering(car, car.steering);
    car.speed = clamp_speed(car, car.speed);
}

pub fn clamp_speed(car: &Car, speed: f32) -> f32 {
    speed.clamp(-car.spec.reverse_speed, car.spec.max_speed)
}

pub fn clamp_steering(car: &Car, steering: f32) -> f32 {
    steering.clamp(-car.spec.max_steering, car.spec.max_steering)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::car::PLAYER_SPEC;

    fn player() -> Car {
        Car::player(PLAYER_SPEC, [400.0, 510.0])
    }

    #[test]
    fn friction_then_clamp() {
        let track = Track::standard(3);
        let mut car = player();

        car.speed = 100.0;
        advance(&mut car, &track);
        assert!((car.speed - 98.0).abs() < 1e-4);
        assert!((car.position - 98.0).abs() < 1e-4);

        car.speed = 400.0;
        advance(&mut car, &track);
        assert_eq!(car.speed, 300.0);

        car.speed = -200.0;
        advance(&mut car, &track);
        assert_eq!(car.speed, -100.0);
    }

    #[test]
    fn position_wraps_and_segment_follows() {
        let track = Track::standard(3);
        let mut car = player();
        car.position = 5590.0;
        car.speed = 50.0;

        advance(&mut car, &track);
        assert!((car.position - 39.0).abs() < 1e-3);
        assert_eq!(car.segment, 0);

        car.position = 10.0;
        car.speed = -50.0;
        advance(&mut car, &track);
        assert!(car.position > 5500.0 && car.position < 5600.0);
        assert_eq!(car.segment, 7);
    }

    #[test]
    fn lateral_offset_integrates_and_clamps() {
        let track = Track::standard(3);
        let mut car = player();
        car.speed = 102.040_82;
        car.steering = 0.1;

        advance(&mut car, &track);
        assert!((car.offset - 0.1).abs() < 1e-3);

        car.offset = 984.9;
        car.speed = 300.0;
        advance(&mut car, &track);
        assert_eq!(car.offset, 985.0);

        car.offset = -2000.0;
        car.steering = -0.1;
        advance(&mut car, &track);
        assert_eq!(car.offset, -985.0);
    }

    #[test]
    fn steering_clamped_exactly_at_max() {
        let mut car = player();
        let right = ControlInputs {
            right: true,
            ..Default::default()
        };
        for _ in 0..20 {
            apply_controls(&mut car, &right);
            assert!(car.steering <= 0.1);
        }
        assert_eq!(car.steering, 0.1);

        let left = ControlInputs {
            left: true,
            ..Default::default()
        };
        for _ in 0..20 {
            apply_controls(&mut car, &left);
        }
        assert_eq!(car.steering, -0.1);
    }

    #[test]
    fn steering_recenters_without_input() {
        let mut car = player();
        car.steering = 0.1;
        apply_controls(&mut car, &ControlInputs::default());
        assert!((car.steering - 0.09).abs() < 1e-6);
    }

    #[test]
    fn brake_then_reverse() {
        let mut car = player();
        car.speed = 3.0;
        let brake = ControlInputs {
            brake: true,
            ..Default::default()
        };

        apply_controls(&mut car, &brake);
        assert_eq!(car.speed, -1.0);
        apply_controls(&mut car, &brake);
        assert_eq!(car.speed, -3.0);

        for _ in 0..100 {
            apply_controls(&mut car, &brake);
        }
        assert_eq!(car.speed, -100.0);
    }

    #[test]
    fn throttle_capped_at_max_speed() {
        let mut car = player();
        let throttle = ControlInputs {
            accelerate: true,
            ..Default::default()
        };
        for _ in 0..500 {
            apply_controls(&mut car, &throttle);
        }
        assert_eq!(car.speed, 300.0);
    }

    #[test]
    fn drifting_sharpens_steering_and_bleeds_speed() {
        let mut car = player();
        car.speed = 200.0;
        let drift_right = ControlInputs {
            right: true,
            drift: true,
            ..Default::default()
        };

        apply_controls(&mut car, &drift_right);
        assert!(car.steering > PLAYER_SPEC.steering_speed);
        assert!((car.speed - 190.0).abs() < 1e-3);
    }
}
