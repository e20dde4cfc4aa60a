use crate::{CoreResult, audio::EncodedRecording, storage::PersistenceGateway};

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, info, instrument, warn};

/// Something the UI can play back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingHandle {
    /// A recording made by this app (fresh or loaded from the store).
    Recording(Arc<EncodedRecording>),
    /// The bundled fallback asset, used until a recording exists.
    DefaultAsset(PathBuf),
}

impl RecordingHandle {
    /// The encoded recording, if this is not the fallback asset.
    pub fn recording(&self) -> Option<&EncodedRecording> {
        match self {
            RecordingHandle::Recording(recording) => Some(recording),
            RecordingHandle::DefaultAsset(_) => None,
        }
    }
}

/// The current recording, held in memory in front of a persistence gateway.
///
/// Only capture completion writes a new recording; readers get `Arc` clones, so
/// a handle taken before a replacement keeps pointing at the old bytes while
/// later lookups see the new ones.
pub struct RecordingLibrary<P: PersistenceGateway> {
    gateway: P,
    current: Option<Arc<EncodedRecording>>,
    default_asset: PathBuf,
}

impl<P: PersistenceGateway> RecordingLibrary<P> {
    /// Creates a library over `gateway` that falls back to `default_asset`.
    pub fn new<A: Into<PathBuf>>(gateway: P, default_asset: A) -> Self {
        Self {
            gateway,
            current: None,
            default_asset: default_asset.into(),
        }
    }

    /// Path of the fallback asset.
    pub fn default_asset(&self) -> &Path {
        &self.default_asset
    }

    /// Access to the underlying gateway.
    pub fn gateway(&self) -> &P {
        &self.gateway
    }

    /// The most recent recording, loading it from the store on first use.
    ///
    /// An empty store, an unreadable store and a corrupt stored file all
    /// resolve to the default asset; only the latter two are logged as warnings.
    #[instrument(skip(self))]
    pub fn current(&mut self) -> RecordingHandle {
        if let Some(recording) = &self.current {
            return RecordingHandle::Recording(Arc::clone(recording));
        }

        match self.gateway.load() {
            Ok(Some(bytes)) => match EncodedRecording::from_bytes(bytes) {
                Ok(recording) => {
                    let recording = Arc::new(recording);
                    info!(
                        sample_rate = recording.sample_rate(),
                        sample_count = recording.sample_count(),
                        "Loaded stored recording"
                    );
                    self.current = Some(Arc::clone(&recording));
                    RecordingHandle::Recording(recording)
                }
                Err(e) => {
                    warn!(error = %e, "Stored recording is unreadable, using default asset");
                    self.fallback()
                }
            },
            Ok(None) => {
                debug!("No stored recording, using default asset");
                self.fallback()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load stored recording, using default asset");
                self.fallback()
            }
        }
    }

    /// Makes `recording` current and persists it.
    ///
    /// The in-memory replacement always happens, so the new recording can be
    /// played back even when the save fails; the save result is returned
    /// alongside the handle.
    #[instrument(skip(self, recording), fields(byte_len = recording.bytes().len()))]
    pub fn replace(&mut self, recording: EncodedRecording) -> (RecordingHandle, CoreResult<()>) {
        let recording = Arc::new(recording);
        self.current = Some(Arc::clone(&recording));

        let saved = self.gateway.save(recording.bytes());
        if let Err(e) = &saved {
            warn!(error = %e, "Recording kept in memory only");
        }

        (RecordingHandle::Recording(recording), saved)
    }

    fn fallback(&self) -> RecordingHandle {
        RecordingHandle::DefaultAsset(self.default_asset.clone())
    }
}
