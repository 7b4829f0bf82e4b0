// ==============================================================================
// render.rs — PSEUDO-3D ROAD PROJECTION (SERVER -> DISPLAY)
// ------------------------------------------------------------------------------
// Turns the current race into a flat list of draw commands for the display
// client:
// - the road ahead of the player is cut into `draw_distance` bands
// - band b has scale (1 - b / depth) and shrinks toward the vanishing point
// - nearer bands' curvature accumulates into a sideways shift of farther ones
// - each band draws ground, rumble strip, road and (straights only) lane dashes
// - AI cars sit on the nearest band showing their current segment
// - the player sprite is drawn at its fixed screen anchor
//
// The race is only ever borrowed immutably here. The one piece of state the
// renderer owns is its drift-smoke particle pool.
// ==============================================================================

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::car::{Car, Driver};
use crate::config::RaceConfig;
use crate::race::RaceState;
use crate::track::Track;

pub const HORIZON_RATIO: f32 = 0.4;
pub const ROAD_SCREEN_FRACTION: f32 = 0.9; // road width / screen width at scale 1
pub const CURVE_GAIN: f32 = 0.02;
pub const LANE_MARKER_WIDTH: f32 = 20.0; // world units

pub const DRIFT_SPEED_THRESHOLD: f32 = 100.0;
pub const PARTICLES_PER_FRAME: usize = 2;
pub const PARTICLE_FADE: f32 = 0.05;
pub const MAX_PARTICLES: usize = 200;
pub const SMOKE_COLOR: &str = "#DDDDDD";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: &'static str,
    },
    Arc {
        x: f32,
        y: f32,
        radius: f32,
        color: &'static str,
        alpha: f32,
    },
}

impl DrawCommand {
    pub fn color(&self) -> &'static str {
        match self {
            DrawCommand::Rect { color, .. } | DrawCommand::Arc { color, .. } => *color,
        }
    }
}

/// One projected slice of road.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub scale: f32,
    pub y: f32,        // top edge on screen
    pub center_x: f32, // road centre on screen
    pub segment: usize,
    pub straight: bool,
    pub dashed: bool, // lane dash visible on this band
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    radius: f32,
    life: f32, // 1 -> 0
}

pub struct Renderer {
    width: f32,
    height: f32,
    horizon: f32,
    depth: usize,
    particles: Vec<Particle>,
    rng: ChaCha8Rng,
}

impl Renderer {
    pub fn new(config: &RaceConfig, rng: ChaCha8Rng) -> Self {
        Self {
            width: config.screen.width,
            height: config.screen.height,
            horizon: config.screen.height * HORIZON_RATIO,
            depth: config.draw_distance.max(1),
            particles: Vec::new(),
            rng,
        }
    }

    pub fn from_config(config: &RaceConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::new(config, rng)
    }

    pub fn reset(&mut self) {
        self.particles.clear();
    }

    fn band_height(&self) -> f32 {
        (self.height - self.horizon) / self.depth as f32 + 1.0
    }

    fn px_per_unit(&self, track: &Track) -> f32 {
        let road = track.geometry().width;
        if road > 0.0 {
            self.width * ROAD_SCREEN_FRACTION / road
        } else {
            0.0
        }
    }

    /// Project the road ahead of `viewer` into bands, nearest first.
    pub fn project(&self, track: &Track, viewer: &Car) -> Vec<Band> {
        let band_h = self.band_height();
        let px = self.px_per_unit(track);
        let band_length = track.geometry().band_length;

        let mut bands = Vec::with_capacity(self.depth);
        let mut dx = 0.0;
        let mut curve_x = 0.0;

        for b in 0..self.depth {
            let scale = 1.0 - b as f32 / self.depth as f32;
            let distance = track.wrap(viewer.position + b as f32 * band_length);
            let lookup = track.segment_at(distance);
            let curvature = track
                .segment(lookup.index)
                .map(|s| s.curvature)
                .unwrap_or(0.0);

            let dashed = if band_length > 0.0 {
                let world = viewer.position + b as f32 * band_length;
                (world / (2.0 * band_length)).floor().rem_euclid(2.0) == 0.0
            } else {
                false
            };

            bands.push(Band {
                scale,
                y: self.horizon + (self.height - self.horizon) * scale - band_h,
                center_x: self.width / 2.0 + curve_x - viewer.offset * px * scale,
                segment: lookup.index,
                straight: curvature == 0.0,
                dashed,
            });

            dx += curvature * CURVE_GAIN;
            curve_x += dx;
        }

        bands
    }

    /// Band an opponent sits on: the nearest projected band of its segment.
    /// Cars further ahead than the draw distance are not shown.
    pub fn band_for(
        &self,
        bands: &[Band],
        track: &Track,
        viewer: &Car,
        car: &Car,
    ) -> Option<usize> {
        let band_length = track.geometry().band_length;
        if !(band_length > 0.0) {
            return None;
        }
        let ahead = track.wrap(car.position - viewer.position);
        if ahead >= self.depth as f32 * band_length {
            return None;
        }
        bands.iter().position(|band| band.segment == car.segment)
    }

    pub fn render(&mut self, race: &RaceState) -> Vec<DrawCommand> {
        let track = race.track();
        let geometry = track.geometry();
        let colors = geometry.colors;
        let player = race.player();
        let px = self.px_per_unit(track);
        let band_h = self.band_height();

        let bands = self.project(track, player);
        let mut draws = Vec::with_capacity(bands.len() * 4 + race.cars().len() + 2);

        draws.push(DrawCommand::Rect {
            x: 0.0,
            y: 0.0,
            w: self.width,
            h: self.horizon,
            color: colors.sky,
        });

        // ---------------------------------------------
        // ROAD, far to near
        // ---------------------------------------------
        for band in bands.iter().rev() {
            let road_w = geometry.width * px * band.scale;
            let rumble_w = (geometry.width + 2.0 * geometry.rumble_width) * px * band.scale;

            draws.push(DrawCommand::Rect {
                x: 0.0,
                y: band.y,
                w: self.width,
                h: band_h,
                color: colors.grass,
            });
            draws.push(DrawCommand::Rect {
                x: band.center_x - rumble_w / 2.0,
                y: band.y,
                w: rumble_w,
                h: band_h,
                color: colors.rumble,
            });
            draws.push(DrawCommand::Rect {
                x: band.center_x - road_w / 2.0,
                y: band.y,
                w: road_w,
                h: band_h,
                color: colors.road,
            });

            if band.straight && band.dashed && geometry.lanes > 0 {
                let marker_w = (LANE_MARKER_WIDTH * px * band.scale).max(1.0);
                let left = band.center_x - road_w / 2.0;
                for lane in 1..geometry.lanes {
                    let lane_x = left + road_w * lane as f32 / geometry.lanes as f32;
                    draws.push(DrawCommand::Rect {
                        x: lane_x - marker_w / 2.0,
                        y: band.y,
                        w: marker_w,
                        h: band_h,
                        color: colors.lane,
                    });
                }
            }
        }

        // ---------------------------------------------
        // OPPONENTS, far to near
        // ---------------------------------------------
        let mut placed: Vec<(usize, &Car)> = race
            .cars()
            .iter()
            .filter(|car| !car.is_player())
            .filter_map(|car| Some((self.band_for(&bands, track, player, car)?, car)))
            .collect();
        placed.sort_by(|a, b| b.0.cmp(&a.0));

        for (index, car) in placed {
            let band = &bands[index];
            let w = car.spec.width * band.scale;
            let h = car.spec.height * band.scale;
            draws.push(DrawCommand::Rect {
                x: band.center_x + car.offset * px * band.scale - w / 2.0,
                y: band.y + band_h - h,
                w,
                h,
                color: car.spec.color,
            });
        }

        // ---------------------------------------------
        // PLAYER + drift smoke
        // ---------------------------------------------
        let anchor = match player.driver {
            Driver::Player { anchor } => anchor,
            Driver::Ai(_) => [self.width / 2.0, self.height * 0.85],
        };

        if race.is_running() && player.is_drifting(DRIFT_SPEED_THRESHOLD) {
            self.emit_smoke(anchor, player);
        }
        self.age_particles();
        for p in &self.particles {
            draws.push(DrawCommand::Arc {
                x: p.x,
                y: p.y,
                radius: p.radius,
                color: SMOKE_COLOR,
                alpha: p.life,
            });
        }

        draws.push(DrawCommand::Rect {
            x: anchor[0] - player.spec.width / 2.0,
            y: anchor[1] - player.spec.height,
            w: player.spec.width,
            h: player.spec.height,
            color: player.spec.color,
        });

        draws
    }

    fn emit_smoke(&mut self, anchor: [f32; 2], player: &Car) {
        let half = player.spec.width / 2.0;
        // smoke trails away from the direction of the slide
        let push = -player.steering.signum();

        for i in 0..PARTICLES_PER_FRAME {
            if self.particles.len() >= MAX_PARTICLES {
                break;
            }
            let side = if i % 2 == 0 { -half } else { half };
            self.particles.push(Particle {
                x: anchor[0] + side,
                y: anchor[1],
                vx: push * self.rng.gen_range(0.5..2.0) + self.rng.gen_range(-0.5..0.5),
                vy: self.rng.gen_range(0.5..2.0),
                radius: self.rng.gen_range(3.0..6.0),
                life: 1.0,
            });
        }
    }

    fn age_particles(&mut self) {
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            p.radius *= 1.02;
            p.life -= PARTICLE_FADE;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }
}
