//! Run lifecycle and interpreter driver.
//!
//! The engine owns one level and at most one active run. A run is a tokio
//! task stepping the sandbox VM in batches; asynchronous host commands
//! insert speed-derived delays and honor pause. Every observable change is
//! published through a `tokio::sync::watch` channel as a fresh `ReadModel`
//! snapshot, in program order.
//!
//! Cancellation is a generation counter: `run_code`, `reset`, and
//! `force_reset` bump it, and every suspended continuation re-checks its
//! snapshot of the counter before touching state. A stale continuation
//! abandons silently with zero partial mutation.

mod bindings;
mod driver;
mod engine;
mod read_model;

pub use engine::GameEngine;
pub use read_model::ReadModel;
pub use robogrid_core::EngineConfig;
