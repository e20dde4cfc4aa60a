use crate::{AppCommand, AppError, AppResult, Player, Prompt, config::PromptConfig};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, instrument, warn};
use voice_memo_core::{
    HoldEvent, HoldOutcome, HoldStateMachine, MemoError, Microphone, PersistenceGateway,
    RecordingHandle,
};

/// Main application state.
///
/// Runs on the async runtime thread and owns the hold state machine, so hold
/// events (hotkeys and timer expiries alike) are handled one at a time, in
/// the order they arrive on `events_rx`.
pub struct App<M: Microphone, P: PersistenceGateway> {
    pub(crate) machine: HoldStateMachine<M, P>,
    pub(crate) player: Player,
    pub(crate) prompts: PromptConfig,
    pub(crate) events_rx: mpsc::Receiver<HoldEvent>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl<M: Microphone, P: PersistenceGateway> App<M, P> {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!(
            hold_duration_ms = self.machine.hold_duration().as_millis(),
            "Voice-Memo starting"
        );

        match self.machine.last_recording() {
            RecordingHandle::Recording(recording) => info!(
                sample_rate = recording.sample_rate(),
                duration_ms = recording.duration().as_millis(),
                "Last recording available"
            ),
            RecordingHandle::DefaultAsset(path) => {
                info!(path = ?path, "No recording yet, default asset will be played")
            }
        }

        loop {
            tokio::select! {
                Some(event) = self.events_rx.recv() => {
                    self.handle_hold_event(event);
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::PlayPrompt(prompt) => {
                            if let Err(e) = self.play_prompt(prompt) {
                                error!(prompt = ?prompt, error = ?e, "Failed to play prompt");
                            }
                        }
                        AppCommand::Shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        self.machine.close();

        let _ = self.shutdown_tx.send(true);
        info!("Voice-Memo shut down successfully");

        Ok(())
    }

    /// Feed one event to the state machine and act on the outcome.
    #[instrument(skip(self))]
    fn handle_hold_event(&mut self, event: HoldEvent) {
        match self.machine.handle(event) {
            Ok(HoldOutcome::None) => {}
            Ok(HoldOutcome::RecordingStarted) => info!("Recording, release to save"),
            Ok(HoldOutcome::PlaybackRequested(handle)) => {
                if let Err(e) = self.player.play(&handle) {
                    error!(error = ?e, "Failed to play last recording");
                }
            }
            Ok(HoldOutcome::RecordingSaved {
                recording,
                persisted,
                degraded,
            }) => {
                let duration_ms = recording.recording().map(|r| r.duration().as_millis());
                if degraded {
                    warn!(
                        duration_ms = ?duration_ms,
                        "Microphone failed during recording, only partial audio was kept"
                    );
                }
                if persisted {
                    info!(duration_ms = ?duration_ms, "Recording saved");
                } else {
                    warn!(
                        duration_ms = ?duration_ms,
                        "Recording could not be saved, kept for playback until exit"
                    );
                }
            }
            Err(MemoError::PermissionDenied { reason, .. }) => {
                error!(reason = %reason, "Microphone access denied, grant it in system settings");
            }
            Err(e) => {
                error!(error = ?e, "Failed to handle hold event");
            }
        }
    }

    /// Play the file configured for `prompt`.
    #[track_caller]
    #[instrument(skip(self))]
    fn play_prompt(&self, prompt: Prompt) -> AppResult<()> {
        let path = self
            .prompts
            .path(prompt)
            .ok_or_else(|| AppError::ConfigError {
                reason: format!("No file configured for prompt {:?}", prompt),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.player.play_file(path)
    }
}
