// ==============================================================================
// ai.rs — OPPONENT DRIVING HEURISTICS
// ------------------------------------------------------------------------------
// Each AI car looks only at the curvature of the segment it is on and its own
// fixed profile:
// - skill decides how wide a line it holds through a curve
// - aggression decides how fast it steers toward that line
// - sharper curves lower the target speed
// A 5% per-frame jitter keeps the pack from driving in lockstep. The RNG is
// passed in so a seeded race replays identically.
// ==============================================================================

use rand::Rng;

use crate::car::{AiProfile, Car};
use crate::physics::{clamp_speed, clamp_steering};
use crate::track::Track;

pub const LINE_WIDTH_PER_CURVATURE: f32 = 50.0;
pub const CURVE_SEVERITY_SCALE: f32 = 5.0;
pub const CURVE_SLOWDOWN: f32 = 0.5;
pub const COAST_DECAY: f32 = 0.99;
pub const STEER_DECAY: f32 = 0.9;
pub const JITTER_PROBABILITY: f64 = 0.05;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AiInputs {
    pub steering_delta: f32,
    pub speed_delta: f32,
}

pub fn target_lateral_offset(curvature: f32, skill: f32) -> f32 {
    curvature * LINE_WIDTH_PER_CURVATURE * (1.0 - skill)
}

pub fn target_speed(curvature: f32, max_speed: f32) -> f32 {
    let severity = curvature.abs() / CURVE_SEVERITY_SCALE;
    max_speed * (1.0 - severity * CURVE_SLOWDOWN)
}

/// Steering and speed changes for this frame, jitter included.
pub fn compute_ai_inputs<R: Rng + ?Sized>(
    car: &Car,
    profile: &AiProfile,
    track: &Track,
    rng: &mut R,
) -> AiInputs {
    let spec = &car.spec;
    let curvature = track
        .segment(car.segment)
        .map(|s| s.curvature)
        .unwrap_or(0.0);

    let target_offset = target_lateral_offset(curvature, profile.skill);
    let target_speed = target_speed(curvature, spec.max_speed);

    let speed_delta = if car.speed < target_speed {
        spec.acceleration * 0.5
    } else {
        car.speed * COAST_DECAY - car.speed
    };

    let steer_step = spec.steering_speed * profile.aggression;
    let mut steering_delta = if car.offset < target_offset {
        steer_step
    } else if car.offset > target_offset {
        -steer_step
    } else {
        car.steering * STEER_DECAY - car.steering
    };

    if rng.gen_bool(JITTER_PROBABILITY) {
        steering_delta += rng.gen_range(-spec.steering_speed..=spec.steering_speed);
    }

    AiInputs {
        steering_delta,
        speed_delta,
    }
}

pub fn apply_ai_inputs(car: &mut Car, inputs: &AiInputs) {
    car.speed = clamp_speed(car, car.speed + inputs.speed_delta);
    car.steering = clamp_steering(car, car.steering + inputs.steering_delta);
}

/// Compute and apply in one go. Player cars are left alone.
pub fn drive<R: Rng + ?Sized>(car: &mut Car, track: &Track, rng: &mut R) {
    let Some(profile) = car.ai_profile() else {
        return;
    };
    let inputs = compute_ai_inputs(car, &profile, track, rng);
    apply_ai_inputs(car, &inputs);
}
