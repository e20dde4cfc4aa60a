use crate::{
    CoreResult, MemoError,
    audio::{AudioFrame, EncodedRecording, Feedback, SampleBuffer, encoder},
};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// When microphone access is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessRequest {
    /// Probe the microphone once when the session is opened.
    Startup,
    /// Let every recording acquire the microphone on its own.
    #[default]
    PerRecording,
}

/// A capture device that can stream mono frames into a [`FrameSink`].
///
/// The returned stream is the microphone handle: holding it keeps the device
/// open, dropping it releases the hardware.
pub trait Microphone {
    /// Live device stream; dropping it stops delivery and releases the device.
    type Stream;

    /// Native sample rate of frames this microphone produces.
    fn sample_rate(&self) -> u32;

    /// Opens the device and starts delivering frames to `sink`.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` when access is refused, `DeviceError` for anything else.
    fn acquire(&mut self, sink: FrameSink) -> CoreResult<Self::Stream>;
}

/// Producer side of a capture session, handed to the device callback.
///
/// Frames pushed after the session has been stopped, or after the device
/// reported an error, are discarded. A late callback cannot write into a
/// buffer that has already been drained.
#[derive(Debug, Clone)]
pub struct FrameSink {
    buffer: Arc<Mutex<SampleBuffer>>,
    shutdown: Arc<AtomicBool>,
    device_lost: Arc<AtomicBool>,
    sample_rate: u32,
}

impl FrameSink {
    fn new(sample_rate: u32) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(SampleBuffer::new())),
            shutdown: Arc::new(AtomicBool::new(false)),
            device_lost: Arc::new(AtomicBool::new(false)),
            sample_rate,
        }
    }

    /// Sample rate frames must be tagged with.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Appends one frame unless the session has stopped or the device failed.
    pub fn push(&self, frame: AudioFrame) {
        if self.shutdown.load(Ordering::Acquire) || self.device_lost.load(Ordering::Acquire) {
            return;
        }

        if frame.sample_rate() != self.sample_rate {
            warn!(
                expected = self.sample_rate,
                got = frame.sample_rate(),
                "Dropping frame with mismatched sample rate"
            );
            return;
        }

        // A poisoned lock still guards valid samples.
        let mut buf = self.buffer.lock().unwrap_or_else(|e| {
            error!("Sample buffer lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        buf.append(frame);
    }

    /// Records that the device failed mid-session.
    ///
    /// Capture halts at the error and is not retried. Whatever was collected
    /// so far is still encoded when the session stops.
    pub fn fail(&self, reason: &str) {
        if !self.device_lost.swap(true, Ordering::AcqRel) {
            error!(reason, "Capture device lost, keeping partial audio");
        }
    }

    /// Whether the session has been stopped.
    pub fn is_closed(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    fn close(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    fn drain(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain()
    }

    fn is_degraded(&self) -> bool {
        self.device_lost.load(Ordering::Acquire)
    }
}

struct ActiveCapture<S> {
    stream: S,
    sink: FrameSink,
    started_at: Instant,
}

/// Owns the microphone for the length of one recording at a time.
///
/// At most one capture is live. Every exit path (stop, close, drop) releases
/// the device stream.
pub struct CaptureSession<M: Microphone> {
    microphone: M,
    feedback: Arc<dyn Feedback>,
    active: Option<ActiveCapture<M::Stream>>,
    access_denied: Option<String>,
}

impl<M: Microphone> CaptureSession<M> {
    /// Opens a session around `microphone`.
    ///
    /// With [`AccessRequest::Startup`] the device is acquired and released once
    /// right away. A denial is remembered and reported by every later
    /// [`start`](Self::start); other probe failures are only logged so the next
    /// recording can retry.
    #[instrument(skip(microphone, feedback))]
    pub fn open(microphone: M, feedback: Arc<dyn Feedback>, access: AccessRequest) -> Self {
        let mut session = Self {
            microphone,
            feedback,
            active: None,
            access_denied: None,
        };

        if access == AccessRequest::Startup {
            let probe = FrameSink::new(session.microphone.sample_rate());
            probe.close();
            match session.microphone.acquire(probe) {
                Ok(stream) => {
                    drop(stream);
                    info!("Microphone access confirmed");
                }
                Err(MemoError::PermissionDenied { reason, .. }) => {
                    warn!(reason = %reason, "Microphone access denied at startup");
                    session.access_denied = Some(reason);
                }
                Err(e) => {
                    warn!(error = %e, "Microphone probe failed, will retry on first recording");
                }
            }
        }

        info!(
            sample_rate = session.microphone.sample_rate(),
            "CaptureSession opened"
        );

        session
    }

    /// Sample rate of the underlying microphone.
    pub fn sample_rate(&self) -> u32 {
        self.microphone.sample_rate()
    }

    /// Whether a capture is currently live.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the live capture's device reported an error.
    pub fn is_degraded(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.sink.is_degraded())
    }

    /// Acquires the microphone and starts filling a fresh sample buffer.
    ///
    /// # Errors
    ///
    /// `CaptureActive` if a capture is already live, `PermissionDenied` if access
    /// is refused, `DeviceError` if the stream cannot be opened. On any error no
    /// device resource is held.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&mut self) -> CoreResult<()> {
        if self.active.is_some() {
            return Err(MemoError::CaptureActive {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Some(reason) = &self.access_denied {
            return Err(MemoError::PermissionDenied {
                reason: reason.clone(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let sink = FrameSink::new(self.microphone.sample_rate());
        let stream = self.microphone.acquire(sink.clone())?;

        self.active = Some(ActiveCapture {
            stream,
            sink,
            started_at: Instant::now(),
        });

        self.feedback.signal_recording_started();

        info!(sample_rate = self.microphone.sample_rate(), "Audio capture started");

        Ok(())
    }

    /// Stops delivery, releases the microphone and encodes what was captured.
    ///
    /// Returns `Ok(None)` when nothing was captured (or no capture was live):
    /// nothing is encoded so an earlier recording is never replaced by an empty
    /// one. If the device was lost mid-session the partial audio is still encoded.
    ///
    /// # Errors
    ///
    /// `EncodingError` if the captured samples cannot be encoded. The microphone
    /// has already been released by then.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> CoreResult<Option<EncodedRecording>> {
        let Some(ActiveCapture {
            stream,
            sink,
            started_at,
        }) = self.active.take()
        else {
            debug!("Stop requested with no active capture");
            return Ok(None);
        };

        // Close the sink before releasing the device so an in-flight callback
        // cannot append after the drain below.
        sink.close();
        drop(stream);

        let samples = sink.drain();
        let elapsed = started_at.elapsed();

        info!(
            sample_count = samples.len(),
            duration_ms = elapsed.as_millis(),
            "Audio capture stopped"
        );

        if sink.is_degraded() {
            warn!(
                sample_count = samples.len(),
                "Device was lost during capture, encoding partial audio"
            );
        }

        if samples.is_empty() {
            info!("No audio captured, keeping previous recording");
            return Ok(None);
        }

        encoder::encode(&samples, sink.sample_rate()).map(Some)
    }

    /// Releases the microphone without encoding anything.
    #[instrument(skip(self))]
    pub fn close(&mut self) {
        if let Some(active) = self.active.take() {
            active.sink.close();
            drop(active.stream);
            info!("Capture discarded on close");
        }
    }
}

impl<M: Microphone> Drop for CaptureSession<M> {
    fn drop(&mut self) {
        self.close();
    }
}
