use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use crate::config::RaceConfig;
use crate::error::RacerError;
use crate::input::KeyboardState;
use crate::race::{FrameOutcome, Hud, RaceResult, RaceState};
use crate::render::{DrawCommand, Renderer};

/// Everything the server pushes to a display client.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage<'a> {
    Welcome {
        session_id: &'a str,
        width: f32,
        height: f32,
    },
    Frame {
        tick: u64,
        started: bool,
        hud: Hud,
        draws: &'a [DrawCommand],
    },
    RaceEnd {
        position: usize,
        cars: usize,
    },
    Pong,
}

impl ServerMessage<'_> {
    pub fn to_json(&self) -> Result<String, RacerError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The single owner of the race. Both scheduled tasks and every connection
/// reach it through one mutex.
pub struct SharedRaceState {
    config: RaceConfig,
    pub race: RaceState,
    pub keyboard: KeyboardState,
    renderer: Renderer,
    pub tick: u64,
    clients: Vec<UnboundedSender<String>>,
    end_announced: bool,
}

impl SharedRaceState {
    pub fn new(config: RaceConfig) -> Self {
        let race = RaceState::from_config(&config);
        let renderer = Renderer::from_config(&config);
        Self {
            config,
            race,
            keyboard: KeyboardState::new(),
            renderer,
            tick: 0,
            clients: Vec::new(),
            end_announced: false,
        }
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn register_client(&mut self, tx: UnboundedSender<String>) {
        self.clients.push(tx);
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn set_key(&mut self, key: &str, pressed: bool) {
        self.keyboard.set_key(key, pressed);
    }

    /// Input task: snapshot held keys into the player's controls.
    pub fn sample_input(&mut self) {
        let inputs = self.keyboard.snapshot();
        self.race.apply_player_controls(&inputs);
    }

    /// Frame task: step the race, render it and push the frame out.
    pub fn frame(&mut self) -> Result<FrameOutcome, RacerError> {
        if !self.race.is_running() {
            // nothing is broadcast after the finish; still drop dead displays
            self.clients.retain(|tx| !tx.is_closed());
            return Ok(FrameOutcome::Idle);
        }

        let outcome = self.race.update();
        self.tick += 1;

        let draws = self.renderer.render(&self.race);
        let json = ServerMessage::Frame {
            tick: self.tick,
            started: self.race.is_started(),
            hud: self.race.hud(),
            draws: &draws,
        }
        .to_json()?;
        self.broadcast(json);

        if let FrameOutcome::Finished(result) = outcome {
            self.announce_end(result)?;
        }
        Ok(outcome)
    }

    fn announce_end(&mut self, result: RaceResult) -> Result<(), RacerError> {
        if self.end_announced {
            return Ok(());
        }
        let json = ServerMessage::RaceEnd {
            position: result.position,
            cars: result.cars,
        }
        .to_json()?;
        self.broadcast(json);
        self.end_announced = true;
        Ok(())
    }

    /// Start action. A finished race is rebuilt before it starts again.
    pub fn start(&mut self) {
        if !self.race.is_running() {
            self.rebuild();
        }
        if !self.race.is_started() {
            info!("race started");
        }
        self.race.start();
    }

    /// Restart action: throw the whole race away and go again.
    pub fn restart(&mut self) {
        self.rebuild();
        self.race.start();
        info!("race restarted");
    }

    fn rebuild(&mut self) {
        self.race = RaceState::from_config(&self.config);
        self.renderer.reset();
        self.keyboard.clear();
        self.tick = 0;
        self.end_announced = false;
    }

    /// Send to every display; drop the ones whose connection went away.
    pub fn broadcast(&mut self, json: String) {
        self.clients.retain(|tx| tx.send(json.clone()).is_ok());
    }
}
