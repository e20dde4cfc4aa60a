//! Voice-memo Core Library
//!
//! Press-and-hold voice recording: a hold state machine driving CPAL capture,
//! sample accumulation, WAV encoding and single-slot persistence.
//!
//! # Example
//!
//! ```no_run
//! use std::{sync::Arc, time::Duration};
//!
//! use voice_memo_core::{
//!     AccessRequest, CaptureSession, CoreResult, CpalMicrophone, FileStore, HoldStateMachine,
//!     RecordingLibrary, ToneFeedback,
//! };
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let microphone = CpalMicrophone::new(None, Some(4096))?;
//!     let capture = CaptureSession::open(
//!         microphone,
//!         Arc::new(ToneFeedback::new(0.3)),
//!         AccessRequest::PerRecording,
//!     );
//!     let library = RecordingLibrary::new(FileStore::new("recordings")?, "default.wav");
//!
//!     let (events_tx, mut events_rx) = tokio::sync::mpsc::channel(32);
//!     let mut machine =
//!         HoldStateMachine::new(capture, library, Duration::from_millis(700), events_tx.clone());
//!
//!     events_tx.send(voice_memo_core::HoldEvent::PressStart).await.ok();
//!     while let Some(event) = events_rx.recv().await {
//!         let outcome = machine.handle(event)?;
//!         println!("{:?}", outcome);
//!     }
//!     Ok(())
//! }
//! ```

mod audio;
mod error;
mod machine;
mod storage;

pub use {
    audio::{
        AccessRequest, AudioFrame, CaptureSession, CpalMicrophone, DEFAULT_BLOCK_SIZE,
        EncodedRecording, Feedback, FrameSink, Microphone, SampleBuffer, SilentFeedback,
        TONE_DURATION, TONE_FREQUENCY_HZ, ToneFeedback, WAV_HEADER_LEN, decode, encode,
        to_pcm16, tone_samples,
    },
    error::{MemoError, Result as CoreResult},
    machine::{
        DEFAULT_HOLD_DURATION, HoldEvent, HoldOutcome, HoldStateMachine, HoldTimer,
        RecordingState,
    },
    storage::{
        FileStore, MemoryStore, PersistenceGateway, RecordingHandle, RecordingLibrary,
        SLOT_FILE_NAME,
    },
};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests;
