//! Authoritative robot simulation.
//!
//! State transitions are pure functions over `RunState` and a `GridView`
//! of the level; all timing, pausing, and cancellation policy lives in the
//! driver. This keeps the game rules unit-testable without a runtime.

pub mod grid;
pub mod state;
pub mod victory;

pub use grid::GridView;
pub use state::{CollectOutcome, MoveOutcome, RunState, TurnDir};
pub use victory::{evaluate, VictoryOutcome};
