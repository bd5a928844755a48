//! Sandboxed bytecode VM for player programs.
//!
//! This module provides the execution environment for player code, including:
//! - The sandbox value model
//! - Host command resolution scoped to a level's enabled commands
//! - Single-step execution with suspension on host calls and timer waits
//!
//! The VM has no ambient capability: no I/O, no clock, no host references.
//! Every externally visible effect is a suspension event the driver services.

pub mod host;
pub mod value;
pub mod vm;

pub use host::CommandTable;
pub use value::Value;
pub use vm::{RuntimeError, StepEvent, Vm};
