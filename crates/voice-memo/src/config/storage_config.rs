use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the last recording lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the recording slot (None = platform data dir).
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Played when no recording exists yet (None = `default.wav` in the data dir).
    #[serde(default)]
    pub default_recording: Option<PathBuf>,
}
