//! Engine tuning parameters.

use serde::{Deserialize, Serialize};

/// Driver and scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default delay per asynchronous command (milliseconds).
    pub default_speed_ms: u64,
    /// Interpreter steps executed per batch before yielding to the scheduler.
    pub step_batch: u64,
    /// Global step ceiling per run; exceeding it faults the run.
    pub max_steps: u64,
    /// Poll interval while the run is paused (milliseconds).
    pub pause_poll_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_speed_ms: 400,
            step_batch: 1000,
            max_steps: 100_000,
            pause_poll_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.default_speed_ms, 400);
        assert_eq!(config.step_batch, 1000);
        assert_eq!(config.max_steps, 100_000);
        assert_eq!(config.pause_poll_ms, 100);
    }
}
