use error_location::ErrorLocation;
use thiserror::Error;

/// Recording pipeline errors with source location tracking.
#[derive(Error, Debug)]
pub enum MemoError {
    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Microphone access was refused by the platform or the user.
    #[error("Microphone access denied: {reason} {location}")]
    PermissionDenied {
        /// Description reported by the audio backend.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A capture session was started while another one is still live.
    #[error("Capture session already active {location}")]
    CaptureActive {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Reading or writing the persisted recording failed.
    #[error("Storage error: {reason} {location}")]
    StorageError {
        /// Description of the storage failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Samples could not be turned into (or read back from) a WAV container.
    #[error("Encoding error: {reason} {location}")]
    EncodingError {
        /// Description of the encoding failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The hold timer could not be armed (no async runtime available).
    #[error("Hold timer unavailable: {reason} {location}")]
    TimerUnavailable {
        /// Description of the scheduling failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`MemoError`].
pub type Result<T> = std::result::Result<T, MemoError>;
