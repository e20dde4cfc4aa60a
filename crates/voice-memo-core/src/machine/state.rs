/// Where the hold gesture currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// Waiting for a press.
    #[default]
    Idle,
    /// Pressed and held, hold timer running, no capture yet.
    Arming,
    /// Held past the hold duration; the microphone is capturing.
    Recording,
}
