/// Commands sent from the runtime thread to the main-thread event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    /// Exit the event loop.
    Shutdown,
}
