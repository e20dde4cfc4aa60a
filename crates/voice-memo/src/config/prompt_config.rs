use crate::app_command::Prompt;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Fixed prompt files for the two tap zones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// File played by the first prompt hotkey.
    #[serde(default)]
    pub first: Option<PathBuf>,
    /// File played by the second prompt hotkey.
    #[serde(default)]
    pub second: Option<PathBuf>,
}

impl PromptConfig {
    /// Configured file for `prompt`, if any.
    pub fn path(&self, prompt: Prompt) -> Option<&Path> {
        match prompt {
            Prompt::First => self.first.as_deref(),
            Prompt::Second => self.second.as_deref(),
        }
    }
}
