pub mod ai;
pub mod car;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod input;
pub mod net;
pub mod physics;
pub mod race;
pub mod render;
pub mod state;
pub mod track;

pub use config::RaceConfig;
pub use error::RacerError;
pub use race::RaceState;
pub use state::SharedRaceState;
