/// One of the two fixed prompt zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Left-hand prompt zone.
    First,
    /// Right-hand prompt zone.
    Second,
}

/// Commands sent to the main application, outside the hold gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Play one of the configured prompt files.
    PlayPrompt(Prompt),
    /// Request application shutdown.
    Shutdown,
}
