//! Adapters between the subsystems and the outside world.

pub mod stats_store;
pub mod ws_bridge;

pub use stats_store::{InMemoryTaskStats, StatsRetention};
pub use ws_bridge::{bridge, decode_frame, FrameError};
