//! Hands recordings and prompt files to the system's default audio player.

use crate::{AppError, AppResult};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};
use voice_memo_core::RecordingHandle;

const PLAYBACK_FILE_NAME: &str = "playback.wav";

/// Plays audio by opening WAV files with the default application.
pub struct Player {
    cache_dir: PathBuf,
}

impl Player {
    /// Create a player that stages in-memory recordings in `cache_dir`.
    #[track_caller]
    #[instrument(skip(cache_dir), fields(cache_dir = ?cache_dir.as_ref()))]
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> AppResult<Self> {
        let cache_dir = cache_dir.as_ref();

        if !cache_dir.exists() {
            fs::create_dir_all(cache_dir)?;
            debug!(cache_dir = ?cache_dir, "Created cache directory");
        }

        info!("Player initialized");

        Ok(Self {
            cache_dir: cache_dir.to_path_buf(),
        })
    }

    /// Resolve a handle to a playable file.
    ///
    /// Recordings are written to a scratch file so that one that failed to
    /// persist can still be played. The default asset must exist.
    #[track_caller]
    #[instrument(skip(self, handle))]
    pub fn stage(&self, handle: &RecordingHandle) -> AppResult<PathBuf> {
        match handle {
            RecordingHandle::Recording(recording) => {
                let path = self.cache_dir.join(PLAYBACK_FILE_NAME);
                fs::write(&path, recording.bytes()).map_err(|e| AppError::PlaybackFailed {
                    reason: format!("Failed to stage recording at {:?}: {}", path, e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
                debug!(path = ?path, byte_len = recording.bytes().len(), "Recording staged");
                Ok(path)
            }
            RecordingHandle::DefaultAsset(path) => {
                Self::require_file(path)?;
                Ok(path.clone())
            }
        }
    }

    /// Play the last recording or the default asset.
    #[track_caller]
    #[instrument(skip(self, handle))]
    pub fn play(&self, handle: &RecordingHandle) -> AppResult<()> {
        let path = self.stage(handle)?;
        Self::open(&path)
    }

    /// Play a prompt file.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn play_file(&self, path: &Path) -> AppResult<()> {
        Self::require_file(path)?;
        Self::open(path)
    }

    #[track_caller]
    fn require_file(path: &Path) -> AppResult<()> {
        if !path.is_file() {
            return Err(AppError::PlaybackFailed {
                reason: format!("Audio file not found: {:?}", path),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    #[track_caller]
    fn open(path: &Path) -> AppResult<()> {
        open::that(path).map_err(|e| AppError::PlaybackFailed {
            reason: format!("Failed to open {:?}: {}", path, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(path = ?path, "Playback started");

        Ok(())
    }
}
