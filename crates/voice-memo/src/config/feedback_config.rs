use crate::config::{default_feedback_enabled, default_feedback_volume};

use serde::{Deserialize, Serialize};

/// "Recording started" tone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Whether the tone plays at all.
    #[serde(default = "default_feedback_enabled")]
    pub enabled: bool,
    /// Tone volume, 0.0 to 1.0.
    #[serde(default = "default_feedback_volume")]
    pub volume: f32,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            enabled: default_feedback_enabled(),
            volume: default_feedback_volume(),
        }
    }
}
