//! Single-file persistence for the last recording.
//!
//! Writes go through a temp file that is synced and renamed over the slot, so a
//! crash mid-write never leaves a truncated recording behind.

use crate::{CoreResult, MemoError, storage::PersistenceGateway};

use std::{
    fs,
    io::{ErrorKind, Write},
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// File name of the recording slot inside the store directory.
pub const SLOT_FILE_NAME: &str = "last-recording.wav";

/// Stores the recording as one well-known file in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `directory`, creating it if needed.
    ///
    /// # Errors
    ///
    /// `StorageError` if the directory cannot be created.
    #[track_caller]
    #[instrument(skip(directory), fields(directory = ?directory.as_ref()))]
    pub fn new<P: AsRef<Path>>(directory: P) -> CoreResult<Self> {
        let directory = directory.as_ref();

        if !directory.exists() {
            fs::create_dir_all(directory).map_err(|e| MemoError::StorageError {
                reason: format!("Failed to create store directory {:?}: {}", directory, e),
                location: ErrorLocation::from(Location::caller()),
            })?;
            debug!(directory = ?directory, "Created store directory");
        }

        Ok(Self {
            path: directory.join(SLOT_FILE_NAME),
        })
    }

    /// Location of the slot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceGateway for FileStore {
    #[track_caller]
    #[instrument(skip(self, bytes), fields(byte_len = bytes.len()))]
    fn save(&mut self, bytes: &[u8]) -> CoreResult<()> {
        let temp_path = self.path.with_extension("wav.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| MemoError::StorageError {
            reason: format!("Failed to create temp recording file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let committed = temp_file
            .write_all(bytes)
            .map_err(|e| MemoError::StorageError {
                reason: format!("Failed to write temp recording file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
            .and_then(|()| {
                temp_file.sync_all().map_err(|e| MemoError::StorageError {
                    reason: format!("Failed to sync temp recording file: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })
            })
            .and_then(|()| {
                drop(temp_file);
                fs::rename(&temp_path, &self.path).map_err(|e| MemoError::StorageError {
                    reason: format!("Failed to rename temp recording to final: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })
            });

        if let Err(e) = committed {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                warn!(path = ?temp_path, error = %cleanup, "Failed to remove temp recording file");
            }
            return Err(e);
        }

        info!(path = ?self.path, "Recording saved (atomic write)");

        Ok(())
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn load(&self) -> CoreResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                debug!(path = ?self.path, byte_len = bytes.len(), "Recording loaded");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MemoError::StorageError {
                reason: format!("Failed to read recording {:?}: {}", self.path, e),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
