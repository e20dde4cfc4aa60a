use crate::config::default_hold_duration_ms;

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Press-and-hold timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldConfig {
    /// How long the hold zone must be held before recording starts.
    #[serde(default = "default_hold_duration_ms")]
    pub duration_ms: u64,
}

impl HoldConfig {
    /// Hold duration as a `Duration`.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_hold_duration_ms(),
        }
    }
}
