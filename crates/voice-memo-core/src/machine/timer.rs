use crate::{CoreResult, MemoError, machine::HoldEvent};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};
use tracing::debug;
use uuid::Uuid;

/// One-shot timer that posts [`HoldEvent::HoldTimeout`] after the hold duration.
///
/// The timeout is delivered through the same channel as press events so it is
/// handled in order with them. Cancelling aborts the sleeping task; a timeout
/// already sitting in the channel is filtered out by the state machine because
/// its gesture no longer owns a live timer.
#[derive(Debug)]
pub struct HoldTimer {
    gesture: Uuid,
    task: JoinHandle<()>,
}

impl HoldTimer {
    /// Schedules a timeout for `gesture` on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// `TimerUnavailable` when called outside a tokio runtime.
    #[track_caller]
    pub fn arm(
        gesture: Uuid,
        duration: Duration,
        events_tx: mpsc::Sender<HoldEvent>,
    ) -> CoreResult<Self> {
        let runtime = Handle::try_current().map_err(|e| MemoError::TimerUnavailable {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let task = runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            if events_tx
                .send(HoldEvent::HoldTimeout { gesture })
                .await
                .is_err()
            {
                debug!(gesture = %gesture, "Event channel closed before hold timeout");
            }
        });

        Ok(Self { gesture, task })
    }

    /// Gesture this timer belongs to.
    pub fn gesture(&self) -> Uuid {
        self.gesture
    }

    /// Stops the timer. Safe to call after it already fired.
    pub fn cancel(self) {
        self.task.abort();
    }
}
