//! Global hotkeys for the hold zone and the two prompt zones.
//!
//! The hold hotkey reports both press and release, which become
//! `PressStart`/`PressEnd` for the hold state machine. Prompt hotkeys act on
//! press only.

use crate::{AppCommand, AppError, AppResult, Prompt};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};
use voice_memo_core::HoldEvent;

/// Ids of the registered hotkeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBindings {
    /// Press-and-hold zone.
    pub hold: u32,
    /// First prompt zone.
    pub first_prompt: u32,
    /// Second prompt zone.
    pub second_prompt: u32,
}

/// Where a hotkey event is routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyAction {
    /// Feed the hold state machine.
    Hold(HoldEvent),
    /// Send an application command.
    Command(AppCommand),
}

impl HotkeyBindings {
    /// Map a hotkey id and state to an action; unknown ids and prompt
    /// releases map to nothing.
    pub fn route(&self, id: u32, state: HotKeyState) -> Option<HotkeyAction> {
        if id == self.hold {
            let event = match state {
                HotKeyState::Pressed => HoldEvent::PressStart,
                HotKeyState::Released => HoldEvent::PressEnd,
            };
            return Some(HotkeyAction::Hold(event));
        }

        if state != HotKeyState::Pressed {
            return None;
        }

        if id == self.first_prompt {
            Some(HotkeyAction::Command(AppCommand::PlayPrompt(Prompt::First)))
        } else if id == self.second_prompt {
            Some(HotkeyAction::Command(AppCommand::PlayPrompt(Prompt::Second)))
        } else {
            None
        }
    }
}

/// Forwards global hotkey events to the app's channels.
pub struct HotkeyHandler {
    bindings: HotkeyBindings,
    events_tx: mpsc::Sender<HoldEvent>,
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyHandler {
    /// Register CTRL+SHIFT+Space (hold), CTRL+SHIFT+1 and CTRL+SHIFT+2 (prompts).
    ///
    /// Must be called on a thread with a message pump (e.g. the main thread
    /// running a `tao` event loop) so that `WM_HOTKEY` messages are
    /// dispatched on Windows. The returned [`GlobalHotKeyManager`] must be
    /// kept alive on that thread for the hotkeys to remain registered.
    #[track_caller]
    #[instrument]
    pub fn register_hotkeys() -> AppResult<(GlobalHotKeyManager, HotkeyBindings)> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let modifiers = Some(Modifiers::CONTROL | Modifiers::SHIFT);
        let hold = HotKey::new(modifiers, Code::Space);
        let first_prompt = HotKey::new(modifiers, Code::Digit1);
        let second_prompt = HotKey::new(modifiers, Code::Digit2);

        for (hotkey, label) in [
            (hold, "CTRL+SHIFT+Space"),
            (first_prompt, "CTRL+SHIFT+1"),
            (second_prompt, "CTRL+SHIFT+2"),
        ] {
            manager
                .register(hotkey)
                .map_err(|e| AppError::HotkeyRegistrationFailed {
                    reason: format!("Failed to register {}: {}", label, e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
            info!(hotkey = label, "Global hotkey registered");
        }

        Ok((
            manager,
            HotkeyBindings {
                hold: hold.id(),
                first_prompt: first_prompt.id(),
                second_prompt: second_prompt.id(),
            },
        ))
    }

    /// Create a handler for previously registered hotkeys.
    ///
    /// This struct is `Send` and can live on any thread; it only listens on
    /// the global [`GlobalHotKeyEvent`] channel.
    pub fn new(
        bindings: HotkeyBindings,
        events_tx: mpsc::Sender<HoldEvent>,
        command_tx: mpsc::Sender<AppCommand>,
    ) -> Self {
        Self {
            bindings,
            events_tx,
            command_tx,
        }
    }

    /// Run the hotkey forwarding loop until a shutdown signal is received.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // GlobalHotKeyEvent::receiver() is a blocking crossbeam receiver; one
        // blocking task forwards it until event_rx is dropped.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    self.dispatch(event.id, event.state).await?;
                }
            }
        }

        drop(event_rx);

        // The blocking task may sit in recv() until the next hotkey event.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    /// Route one hotkey event to the hold channel or the command channel.
    #[instrument(skip(self))]
    pub async fn dispatch(&self, id: u32, state: HotKeyState) -> AppResult<()> {
        match self.bindings.route(id, state) {
            Some(HotkeyAction::Hold(event)) => {
                self.events_tx
                    .send(event)
                    .await
                    .map_err(|e| AppError::ChannelSendFailed {
                        message: format!("Failed to send {:?}: {}", event, e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;
                debug!(event = ?event, "Hold event forwarded");
            }
            Some(HotkeyAction::Command(command)) => {
                debug!(command = ?command, "Command forwarded");
                self.command_tx
                    .send(command)
                    .await
                    .map_err(|e| AppError::ChannelSendFailed {
                        message: format!("Failed to send command: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;
            }
            None => debug!(id, "Unbound hotkey event ignored"),
        }

        Ok(())
    }
}
