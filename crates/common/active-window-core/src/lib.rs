//! Data model, configuration and icon cache for the active-window engine.
//!
//! Holds everything the engine crate shares with hosts that only consume
//! records: no OS dependencies live here.

mod cache;
mod config;
mod error;
mod window_info;

pub use cache::{FixedCapacityIconCache, IconCache};
pub use config::EngineConfig;
pub use error::{ActiveWindowError, ActiveWindowResult};
pub use window_info::WindowInfo;
