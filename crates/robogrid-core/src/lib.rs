//! Core types and utilities for the Robogrid programming game engine.

pub mod commands;
pub mod config;
pub mod error;
pub mod level;
pub mod types;

pub use commands::{CommandId, CommandSpec};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use level::{LevelConfig, LocalizedText, VictoryConditions};
pub use types::{Coord, Facing, Pose};
