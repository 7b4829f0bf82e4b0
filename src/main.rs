use std::path::PathBuf;
use std::sync::Arc;

use arcade_racer::config::RaceConfig;
use arcade_racer::error::RacerError;
use arcade_racer::net::start_websocket_server;
use arcade_racer::state::SharedRaceState;

use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), RacerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = RaceConfig::load(std::env::args_os().nth(1).map(PathBuf::from))?;
    info!(
        laps = config.total_laps,
        opponents = config.ai_cars,
        seed = ?config.seed,
        "starting arcade racer"
    );

    let listener = TcpListener::bind(&config.bind_addr).await?;
    let frame_period = Duration::from_millis(config.frame_interval_ms);
    let input_period = Duration::from_millis(config.input_interval_ms);

    let state = Arc::new(Mutex::new(SharedRaceState::new(config)));

    tokio::spawn(start_websocket_server(listener, Arc::clone(&state)));

    // Input sampling runs on its own cadence, independent of frames
    let input_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut ticker = interval(input_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            input_state.lock().await.sample_input();
        }
    });

    // Fixed frame step: update + render + broadcast
    let mut ticker = interval(frame_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let mut shared = state.lock().await;
        if let Err(err) = shared.frame() {
            warn!(%err, "frame dropped");
        }
    }
}
