//! Error types for the game engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Compile error: {0}")]
    Compile(String),

    #[error("Execution error: {0}")]
    Runtime(String),

    #[error("Infinite loop suspected (exceeded {0} steps)")]
    InfiniteLoop(u64),

    #[error("Hit an obstacle")]
    HitObstacle,

    #[error("Reached the target but missed coins (collected: {collected}, required: {required})")]
    MissedCoins { collected: u32, required: u32 },

    #[error("Too many moves (used: {used}, max: {max})")]
    TooManyMoves { used: u32, max: u32 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
