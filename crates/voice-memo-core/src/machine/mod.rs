mod event;
mod hold;
mod state;
mod timer;

pub use {
    event::{HoldEvent, HoldOutcome},
    hold::{DEFAULT_HOLD_DURATION, HoldStateMachine},
    state::RecordingState,
    timer::HoldTimer,
};
