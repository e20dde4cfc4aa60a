//! Voice-Memo: hold a global hotkey to record a voice memo, tap it to play it back.

mod app;
mod app_command;
mod config;
mod error;
mod hotkey_handler;
mod player;
mod ui_command;

pub(crate) use {
    app::App,
    app_command::{AppCommand, Prompt},
    error::{AppError, Result as AppResult},
    hotkey_handler::{HotkeyBindings, HotkeyHandler},
    player::Player,
    ui_command::UiCommand,
};

use crate::config::Config;

use std::sync::Arc;

use global_hotkey::GlobalHotKeyManager;
use tao::{
    event::{Event, StartCause},
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use voice_memo_core::{
    CaptureSession, CpalMicrophone, Feedback, FileStore, HoldStateMachine, RecordingLibrary,
    SilentFeedback, ToneFeedback,
};

const DEFAULT_LOG_FILTER: &str = "voice_memo=debug,voice_memo_core=debug";

/// Application entry point.
fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let event_loop = EventLoopBuilder::<UiCommand>::with_user_event().build();
    let ui_proxy = event_loop.create_proxy();

    // Persists across event loop iterations; dropping it unregisters the hotkeys.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(UiCommand::Shutdown) => {
                *control_flow = ControlFlow::ExitWithCode(0);
                return;
            }
            Event::NewEvents(StartCause::Init) => {
                let config = match Config::load() {
                    Ok(c) => c,
                    Err(e) => {
                        error!("Failed to load config: {:?}", e);
                        std::process::exit(1);
                    }
                };

                if let Err(e) = config.validate() {
                    error!("Config validation failed: {:?}", e);
                    std::process::exit(1);
                }

                let player = match Config::cache_dir().and_then(Player::new) {
                    Ok(p) => p,
                    Err(e) => {
                        error!("Failed to create Player: {:?}", e);
                        std::process::exit(1);
                    }
                };

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                // Register hotkeys on the main thread: tao's event loop pumps
                // the Windows messages needed for WM_HOTKEY delivery.
                let (manager, bindings) = match HotkeyHandler::register_hotkeys() {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!("Failed to register hotkeys: {:?}", e);
                        std::process::exit(1);
                    }
                };
                hotkey_manager = Some(manager);

                let ui_proxy = ui_proxy.clone();

                // The audio stream and state machine live on the runtime thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    if let Err(e) = rt.block_on(run(config, player, bindings)) {
                        error!(error = ?e, "App error");
                    }

                    let _ = ui_proxy.send_event(UiCommand::Shutdown);
                });
            }
            _ => {}
        }

        // Keep hotkey_manager alive in the closure for the app's lifetime.
        let _ = &hotkey_manager;
    });
}

/// Build the recording pipeline and run it until shutdown.
async fn run(config: Config, player: Player, bindings: HotkeyBindings) -> AppResult<()> {
    let microphone = CpalMicrophone::new(
        config.audio.selected_device.as_deref(),
        Some(config.audio.block_size),
    )?;

    let feedback: Arc<dyn Feedback> = if config.feedback.enabled {
        Arc::new(ToneFeedback::new(config.feedback.volume))
    } else {
        Arc::new(SilentFeedback)
    };

    let capture = CaptureSession::open(microphone, feedback, config.audio.access.into());
    let store = FileStore::new(config.recordings_dir()?)?;
    let library = RecordingLibrary::new(store, config.default_recording_path()?);

    let (events_tx, events_rx) = mpsc::channel(32);
    let (command_tx, command_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let machine =
        HoldStateMachine::new(capture, library, config.hold.duration(), events_tx.clone());
    let hotkey_handler = HotkeyHandler::new(bindings, events_tx, command_tx.clone());

    let app = App {
        machine,
        player,
        prompts: config.prompts.clone(),
        events_rx,
        command_rx,
        shutdown_tx,
    };

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received");
                let _ = command_tx.send(AppCommand::Shutdown).await;
            }
            Err(e) => error!(error = ?e, "Failed to listen for Ctrl-C"),
        }
    });

    let (hotkeys, app) = tokio::join!(hotkey_handler.run(shutdown_rx), app.run());

    if let Err(e) = hotkeys {
        error!(error = ?e, "Hotkey handler error");
    }

    app
}
