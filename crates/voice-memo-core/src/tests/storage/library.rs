use crate::{
    FileStore, MemoryStore, PersistenceGateway, RecordingHandle, RecordingLibrary, encode,
};

use std::path::Path;

use tempfile::TempDir;

const DEFAULT_ASSET: &str = "assets/default.wav";

/// WHAT: An empty store resolves to the default asset
/// WHY: Tapping before ever recording must still play something
#[test]
fn given_empty_store_when_requesting_current_then_default_asset() {
    // Given: A library over an empty store
    let mut library = RecordingLibrary::new(MemoryStore::new(), DEFAULT_ASSET);

    // When: Requesting the current recording
    let current = library.current();

    // Then: Default asset
    assert_eq!(current, RecordingHandle::DefaultAsset(DEFAULT_ASSET.into()));
    assert_eq!(library.default_asset(), Path::new(DEFAULT_ASSET));
}

/// WHAT: Replace makes the new recording current and saves it
/// WHY: Playback right after recording must return what was just said
#[test]
fn given_replacement_when_requesting_current_then_new_recording_and_persisted() {
    // Given: A library with one replacement
    let mut library = RecordingLibrary::new(MemoryStore::new(), DEFAULT_ASSET);
    let recording = encode(&[0.5; 32], 8_000).unwrap();
    let bytes = recording.bytes().to_vec();

    // When: Replacing
    let (handle, saved) = library.replace(recording);

    // Then: Current and stored
    assert!(saved.is_ok());
    assert_eq!(library.current(), handle);
    assert_eq!(library.gateway().load().unwrap(), Some(bytes));
}

/// WHAT: A handle taken before a replacement still holds the old bytes
/// WHY: Playback in flight must not see a half-swapped recording
#[test]
fn given_handle_to_old_recording_when_replaced_then_old_handle_unchanged() {
    // Given: A current recording and a handle to it
    let mut library = RecordingLibrary::new(MemoryStore::new(), DEFAULT_ASSET);
    let (old, _) = library.replace(encode(&[0.1; 10], 8_000).unwrap());

    // When: Replacing with a longer recording
    let (new, _) = library.replace(encode(&[0.9; 20], 8_000).unwrap());

    // Then: Old handle still sees 10 samples, lookups see 20
    assert_eq!(old.recording().map(|r| r.sample_count()), Some(10));
    assert_eq!(new.recording().map(|r| r.sample_count()), Some(20));
    assert_eq!(library.current(), new);
}

/// WHAT: A fresh library loads the recording a previous run saved
/// WHY: The memo survives restarts
#[test]
fn given_persisted_file_when_new_library_opens_then_recording_loaded() {
    // Given: A recording saved through one library
    let dir = TempDir::new().unwrap();
    let mut first = RecordingLibrary::new(FileStore::new(dir.path()).unwrap(), DEFAULT_ASSET);
    let _ = first.replace(encode(&[0.25; 441], 44_100).unwrap());

    // When: A second library opens the same directory
    let mut second = RecordingLibrary::new(FileStore::new(dir.path()).unwrap(), DEFAULT_ASSET);
    let current = second.current();

    // Then: Loaded with the original rate and length
    let recording = current.recording().unwrap();
    assert_eq!(recording.sample_rate(), 44_100);
    assert_eq!(recording.sample_count(), 441);
}

/// WHAT: A corrupt stored file falls back to the default asset
/// WHY: A damaged file must not break playback
#[test]
fn given_corrupt_stored_file_when_requesting_current_then_default_asset() {
    // Given: Garbage in the slot
    let mut store = MemoryStore::new();
    store.save(b"not audio at all").unwrap();
    let mut library = RecordingLibrary::new(store, DEFAULT_ASSET);

    // When/Then: Default asset
    assert!(matches!(library.current(), RecordingHandle::DefaultAsset(_)));
}
