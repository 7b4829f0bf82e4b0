// ==============================================================================
// race.rs — RACE STATE, CHECKPOINTS, LAPS, RANKING
// ------------------------------------------------------------------------------
// RaceState owns everything one race needs: track, checkpoint table, the
// player (always cars[0]) and the AI field, the race RNG and lifecycle flags.
//
// Per frame (update):
//   player physics -> AI inputs + physics -> checkpoint advance (all cars)
//   -> lap completion -> ranking
//
// Only the player's laps can end the race. AI laps are counted for ranking.
// ==============================================================================

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::ai;
use crate::car::{AI_COLORS, Car, PLAYER_SPEC};
use crate::checkpoint::Checkpoints;
use crate::config::RaceConfig;
use crate::input::ControlInputs;
use crate::physics;
use crate::track::Track;

pub const PLAYER: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceResult {
    pub position: usize,
    pub cars: usize,
}

/// What the display's text overlay shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hud {
    pub lap: u32,
    pub total_laps: u32,
    pub position: usize,
    pub speed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Idle,
    Racing,
    LapCompleted(u32),
    Finished(RaceResult),
}

pub struct RaceState {
    track: Track,
    checkpoints: Checkpoints,
    cars: Vec<Car>,
    total_laps: u32,
    rng: ChaCha8Rng,
    running: bool,
    started: bool,
    result: Option<RaceResult>,
}

impl RaceState {
    /// Build a fresh race: track, checkpoints, player on the line, AI field.
    pub fn new(config: &RaceConfig, mut rng: ChaCha8Rng) -> Self {
        let track = Track::standard(config.lanes);
        let checkpoints = Checkpoints::from_track(&track);

        let anchor = [config.screen.width / 2.0, config.screen.height * 0.85];
        let mut cars = Vec::with_capacity(1 + config.ai_cars);
        cars.push(Car::player(PLAYER_SPEC, anchor));
        for i in 0..config.ai_cars {
            let color = AI_COLORS[i % AI_COLORS.len()];
            cars.push(Car::random_ai(&mut rng, &track, color));
        }

        let mut race = Self {
            track,
            checkpoints,
            cars,
            total_laps: config.total_laps,
            rng,
            running: true,
            started: false,
            result: None,
        };
        race.update_ranks();
        race
    }

    pub fn from_config(config: &RaceConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::new(config, rng)
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn checkpoints(&self) -> &Checkpoints {
        &self.checkpoints
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn cars_mut(&mut self) -> &mut [Car] {
        &mut self.cars
    }

    pub fn player(&self) -> &Car {
        &self.cars[PLAYER]
    }

    pub fn player_mut(&mut self) -> &mut Car {
        &mut self.cars[PLAYER]
    }

    pub fn total_laps(&self) -> u32 {
        self.total_laps
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn result(&self) -> Option<RaceResult> {
        self.result
    }

    pub fn start(&mut self) {
        self.started = true;
    }

    pub fn hud(&self) -> Hud {
        let player = self.player();
        Hud {
            lap: player.lap.min(self.total_laps),
            total_laps: self.total_laps,
            position: player.rank,
            speed: player.speed.abs() as u32,
        }
    }

    /// Input-task phase: feed a sampled snapshot to the player car.
    pub fn apply_player_controls(&mut self, inputs: &ControlInputs) {
        if !(self.running && self.started) {
            return;
        }
        physics::apply_controls(&mut self.cars[PLAYER], inputs);
    }

    /// Frame-task phase: one simulation step.
    pub fn update(&mut self) -> FrameOutcome {
        if !(self.running && self.started) {
            return FrameOutcome::Idle;
        }

        let Self {
            track,
            checkpoints,
            cars,
            rng,
            ..
        } = self;

        for car in cars.iter_mut() {
            ai::drive(car, track, rng);
            physics::advance(car, track);
            advance_checkpoint(car, checkpoints);
        }

        let mut outcome = FrameOutcome::Racing;
        for (index, car) in self.cars.iter_mut().enumerate() {
            if complete_lap(car, &self.checkpoints) && index == PLAYER {
                info!(lap = car.lap, "player lap completed");
                outcome = FrameOutcome::LapCompleted(car.lap);
            }
            car.recorded_checkpoint = car.next_checkpoint;
        }

        self.update_ranks();

        if self.cars[PLAYER].lap > self.total_laps {
            let result = RaceResult {
                position: self.cars[PLAYER].rank,
                cars: self.cars.len(),
            };
            info!(position = result.position, cars = result.cars, "race finished");
            self.running = false;
            self.result = Some(result);
            return FrameOutcome::Finished(result);
        }

        debug!(
            position = self.cars[PLAYER].position,
            speed = self.cars[PLAYER].speed,
            rank = self.cars[PLAYER].rank,
            "frame"
        );
        outcome
    }

    pub fn update_ranks(&mut self) {
        let ranks = rank_positions(&self.cars);
        for (car, rank) in self.cars.iter_mut().zip(ranks) {
            car.rank = rank;
        }
    }
}

/// Move `next_checkpoint` forward to the checkpoint under the car. Never
/// moves backward, except last -> 0 when the loop closes.
pub fn advance_checkpoint(car: &mut Car, checkpoints: &Checkpoints) {
    let (Some(current), Some(last)) = (
        checkpoints.find_current(car.position),
        checkpoints.last_index(),
    ) else {
        return;
    };

    if current > car.next_checkpoint || (current == 0 && car.next_checkpoint == last) {
        car.next_checkpoint = current;
    }
}

/// Count a lap when the car crossed from the last checkpoint back to 0 since
/// the previous frame. Returns true if a lap was added.
pub fn complete_lap(car: &mut Car, checkpoints: &Checkpoints) -> bool {
    let Some(last) = checkpoints.last_index() else {
        return false;
    };
    // a single-checkpoint loop would count a lap every frame
    if last == 0 {
        return false;
    }

    if car.next_checkpoint == 0 && car.recorded_checkpoint == last {
        car.lap += 1;
        true
    } else {
        false
    }
}

/// 1-based rank for each car, in input order. Ordered by lap, then
/// checkpoint, then distance; ties keep input order.
pub fn rank_positions(cars: &[Car]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..cars.len()).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (&cars[a], &cars[b]);
        b.lap
            .cmp(&a.lap)
            .then(b.next_checkpoint.cmp(&a.next_checkpoint))
            .then(b.position.total_cmp(&a.position))
    });

    let mut ranks = vec![0; cars.len()];
    for (place, &index) in order.iter().enumerate() {
        ranks[index] = place + 1;
    }
    ranks
}
