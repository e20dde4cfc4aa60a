mod audio_config;
#[allow(clippy::module_inception)]
mod config;
mod feedback_config;
mod hold_config;
mod prompt_config;
mod storage_config;

pub(crate) use {
    audio_config::AudioConfig,
    config::Config,
    feedback_config::FeedbackConfig,
    hold_config::HoldConfig,
    prompt_config::PromptConfig,
    storage_config::StorageConfig,
};

pub(crate) const DEFAULT_HOLD_DURATION_MS: u64 = 700;
pub(crate) const DEFAULT_BLOCK_SIZE: u32 = voice_memo_core::DEFAULT_BLOCK_SIZE;
pub(crate) const DEFAULT_FEEDBACK_ENABLED: bool = true;
pub(crate) const DEFAULT_FEEDBACK_VOLUME: f32 = 0.3;

pub(crate) fn default_hold_duration_ms() -> u64 {
    DEFAULT_HOLD_DURATION_MS
}

pub(crate) fn default_block_size() -> u32 {
    DEFAULT_BLOCK_SIZE
}

pub(crate) fn default_feedback_enabled() -> bool {
    DEFAULT_FEEDBACK_ENABLED
}

pub(crate) fn default_feedback_volume() -> f32 {
    DEFAULT_FEEDBACK_VOLUME
}
