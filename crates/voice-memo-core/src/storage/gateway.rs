use crate::CoreResult;

/// Single-slot blob store for the most recent recording.
pub trait PersistenceGateway {
    /// Stores `bytes` in the slot, replacing any previous value.
    ///
    /// # Errors
    ///
    /// `StorageError` if the write fails; the previous value is left in place.
    fn save(&mut self, bytes: &[u8]) -> CoreResult<()>;

    /// Returns the stored bytes, or `None` when nothing has been saved yet.
    ///
    /// An empty store is not an error.
    ///
    /// # Errors
    ///
    /// `StorageError` if the slot exists but cannot be read.
    fn load(&self) -> CoreResult<Option<Vec<u8>>>;
}
