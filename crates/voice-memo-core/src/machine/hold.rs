//! Press-and-hold recording state machine.
//!
//! Idle → Arming on press, Arming → Recording when the hold timer fires,
//! back to Idle on release. Releasing while arming asks for playback of the
//! last recording; releasing while recording stops capture and saves.

use crate::{
    CoreResult,
    audio::{CaptureSession, Microphone},
    machine::{HoldEvent, HoldOutcome, HoldTimer, RecordingState},
    storage::{PersistenceGateway, RecordingHandle, RecordingLibrary},
};

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Hold duration used when none is configured.
pub const DEFAULT_HOLD_DURATION: Duration = Duration::from_millis(700);

/// Drives capture from press/release events and the hold timer.
///
/// Events must be fed one at a time, in the order they were received, from a
/// single task. The machine posts its own hold timeouts to `events_tx`, which
/// should be the sender half of the channel the caller reads events from.
pub struct HoldStateMachine<M: Microphone, P: PersistenceGateway> {
    state: RecordingState,
    hold_duration: Duration,
    timer: Option<HoldTimer>,
    gesture: Option<Uuid>,
    recording_since: Option<Instant>,
    events_tx: mpsc::Sender<HoldEvent>,
    capture: CaptureSession<M>,
    library: RecordingLibrary<P>,
}

impl<M: Microphone, P: PersistenceGateway> HoldStateMachine<M, P> {
    /// Creates an idle machine.
    pub fn new(
        capture: CaptureSession<M>,
        library: RecordingLibrary<P>,
        hold_duration: Duration,
        events_tx: mpsc::Sender<HoldEvent>,
    ) -> Self {
        info!(
            hold_duration_ms = hold_duration.as_millis(),
            "HoldStateMachine initialized"
        );

        Self {
            state: RecordingState::Idle,
            hold_duration,
            timer: None,
            gesture: None,
            recording_since: None,
            events_tx,
            capture,
            library,
        }
    }

    /// Current state.
    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Configured hold duration.
    pub fn hold_duration(&self) -> Duration {
        self.hold_duration
    }

    /// Whether a hold timer is armed and not yet consumed or cancelled.
    pub fn timer_pending(&self) -> bool {
        self.timer.is_some()
    }

    /// The recording library backing playback requests.
    pub fn library(&self) -> &RecordingLibrary<P> {
        &self.library
    }

    /// The last recording (or default asset), e.g. for showing it at startup.
    pub fn last_recording(&mut self) -> RecordingHandle {
        self.library.current()
    }

    /// Dispatches one event.
    ///
    /// # Errors
    ///
    /// See [`on_press_start`](Self::on_press_start),
    /// [`on_hold_timeout`](Self::on_hold_timeout) and
    /// [`on_press_end`](Self::on_press_end). The machine is always left in a
    /// valid state.
    pub fn handle(&mut self, event: HoldEvent) -> CoreResult<HoldOutcome> {
        match event {
            HoldEvent::PressStart => self.on_press_start(),
            HoldEvent::PressEnd => self.on_press_end(),
            HoldEvent::HoldTimeout { gesture } => self.on_hold_timeout(gesture),
        }
    }

    /// Press on the hold zone: Idle → Arming and the hold timer starts.
    ///
    /// Ignored outside Idle (e.g. key auto-repeat).
    ///
    /// # Errors
    ///
    /// `TimerUnavailable` if the timer cannot be scheduled; the state stays Idle.
    #[instrument(skip(self), fields(state = ?self.state))]
    pub fn on_press_start(&mut self) -> CoreResult<HoldOutcome> {
        if self.state != RecordingState::Idle {
            debug!("Press ignored outside Idle");
            return Ok(HoldOutcome::None);
        }

        // A leftover timer can only belong to a finished gesture.
        self.cancel_timer();

        let gesture = Uuid::new_v4();
        let timer = HoldTimer::arm(gesture, self.hold_duration, self.events_tx.clone())?;

        self.timer = Some(timer);
        self.gesture = Some(gesture);
        self.state = RecordingState::Arming;

        debug!(gesture = %gesture, "Arming");

        Ok(HoldOutcome::None)
    }

    /// Hold timer expiry: Arming → Recording and capture starts.
    ///
    /// Only the live timer of the current gesture counts. A timeout for a
    /// cancelled or older gesture, or one arriving outside Arming, is ignored,
    /// so capture can never be started twice.
    ///
    /// # Errors
    ///
    /// Capture start errors (`PermissionDenied`, `DeviceError`, ...). The
    /// machine is back in Idle when this returns an error.
    #[instrument(skip(self), fields(state = ?self.state))]
    pub fn on_hold_timeout(&mut self, gesture: Uuid) -> CoreResult<HoldOutcome> {
        let live = self.timer.as_ref().map(HoldTimer::gesture) == Some(gesture);

        if !live || self.state != RecordingState::Arming {
            debug!(gesture = %gesture, "Stale hold timeout ignored");
            return Ok(HoldOutcome::None);
        }

        // The timer has fired; drop it so a duplicate delivery is stale.
        self.timer = None;

        if let Err(e) = self.capture.start() {
            error!(gesture = %gesture, error = %e, "Failed to start recording");
            self.reset();
            return Err(e);
        }

        self.state = RecordingState::Recording;
        self.recording_since = Some(Instant::now());

        info!(gesture = %gesture, "Recording started");

        Ok(HoldOutcome::RecordingStarted)
    }

    /// Release of the hold zone.
    ///
    /// Cancels a pending timer first. From Arming the last recording is
    /// requested for playback; from Recording capture stops and the new
    /// recording is saved; from Idle nothing happens. A device failure during
    /// capture is reported as `degraded` on the saved outcome.
    ///
    /// # Errors
    ///
    /// `EncodingError` if the captured audio cannot be encoded. The machine is
    /// Idle regardless and the previous recording stays current.
    #[instrument(skip(self), fields(state = ?self.state))]
    pub fn on_press_end(&mut self) -> CoreResult<HoldOutcome> {
        self.cancel_timer();

        match self.state {
            RecordingState::Idle => {
                debug!("Release ignored in Idle");
                Ok(HoldOutcome::None)
            }
            RecordingState::Arming => {
                self.reset();
                let recording = self.library.current();
                info!("Released before hold duration, playback requested");
                Ok(HoldOutcome::PlaybackRequested(recording))
            }
            RecordingState::Recording => {
                let gesture = self.gesture;
                let held = self.recording_since.map(|t| t.elapsed());
                let degraded = self.capture.is_degraded();
                self.reset();

                let encoded = match self.capture.stop() {
                    Ok(Some(encoded)) => encoded,
                    Ok(None) => {
                        if degraded {
                            warn!("Device lost before any audio was captured");
                        }
                        return Ok(HoldOutcome::None);
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to encode recording");
                        return Err(e);
                    }
                };

                info!(
                    gesture = ?gesture,
                    duration_ms = ?held.map(|d| d.as_millis()),
                    data_len = encoded.data_len(),
                    degraded,
                    "Recording stopped"
                );

                let (recording, saved) = self.library.replace(encoded);
                if saved.is_err() {
                    warn!("Recording not persisted, available for playback until exit");
                }

                Ok(HoldOutcome::RecordingSaved {
                    recording,
                    persisted: saved.is_ok(),
                    degraded,
                })
            }
        }
    }

    /// Tears down: cancels the timer and releases the microphone without saving.
    #[instrument(skip(self))]
    pub fn close(&mut self) {
        self.cancel_timer();
        self.capture.close();
        self.reset();
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            debug!(gesture = %timer.gesture(), "Hold timer cancelled");
            timer.cancel();
        }
    }

    fn reset(&mut self) {
        self.state = RecordingState::Idle;
        self.gesture = None;
        self.recording_since = None;
    }
}

impl<M: Microphone, P: PersistenceGateway> Drop for HoldStateMachine<M, P> {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
