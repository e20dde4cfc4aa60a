mod file_store;
mod gateway;
mod library;
mod memory_store;

pub use {
    file_store::{FileStore, SLOT_FILE_NAME},
    gateway::PersistenceGateway,
    library::{RecordingHandle, RecordingLibrary},
    memory_store::MemoryStore,
};
