use crate::config::default_block_size;

use serde::{Deserialize, Serialize};
use voice_memo_core::AccessRequest;

/// When to ask for microphone access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessSetting {
    /// Once, when the app starts.
    Startup,
    /// Each time a recording starts.
    #[default]
    PerRecording,
}

impl From<AccessSetting> for AccessRequest {
    fn from(setting: AccessSetting) -> Self {
        match setting {
            AccessSetting::Startup => AccessRequest::Startup,
            AccessSetting::PerRecording => AccessRequest::PerRecording,
        }
    }
}

/// Audio device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Selected audio device name (None = default device).
    #[serde(default)]
    pub selected_device: Option<String>,
    /// Requested samples per capture block.
    #[serde(default = "default_block_size")]
    pub block_size: u32,
    /// When microphone access is requested.
    #[serde(default)]
    pub access: AccessSetting,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            selected_device: None,
            block_size: default_block_size(),
            access: AccessSetting::default(),
        }
    }
}
