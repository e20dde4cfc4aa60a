use crate::{CoreResult, storage::PersistenceGateway};

/// In-process store, for tests and for running without a data directory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slot: Option<Vec<u8>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceGateway for MemoryStore {
    fn save(&mut self, bytes: &[u8]) -> CoreResult<()> {
        self.slot = Some(bytes.to_vec());
        Ok(())
    }

    fn load(&self) -> CoreResult<Option<Vec<u8>>> {
        Ok(self.slot.clone())
    }
}
