use crate::storage::RecordingHandle;

use uuid::Uuid;

/// Input to the hold state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldEvent {
    /// The hold zone was pressed.
    PressStart,
    /// The hold zone was released.
    PressEnd,
    /// The hold timer armed by `gesture` expired.
    HoldTimeout {
        /// Gesture that armed the timer.
        gesture: Uuid,
    },
}

/// What the UI should do after an event was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldOutcome {
    /// Nothing to show.
    None,
    /// Capture just started.
    RecordingStarted,
    /// Released while arming: play the last recording (or the default asset).
    PlaybackRequested(RecordingHandle),
    /// Released while recording: a new recording is current.
    RecordingSaved {
        /// The new recording.
        recording: RecordingHandle,
        /// Whether the persistence gateway accepted it.
        persisted: bool,
        /// Whether the device failed mid-capture, leaving only partial audio.
        degraded: bool,
    },
}
