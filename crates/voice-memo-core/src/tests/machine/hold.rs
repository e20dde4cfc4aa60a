use crate::{
    AccessRequest, CaptureSession, DEFAULT_HOLD_DURATION, Feedback, HoldEvent, HoldOutcome,
    HoldStateMachine, MemoError, MemoryStore, PersistenceGateway, RecordingHandle,
    RecordingLibrary, RecordingState,
    tests::support::{
        CountingFeedback, FailingStore, FakeMicrophone, MicBehaviour, MicProbe, session,
    },
};

use std::{path::PathBuf, sync::Arc, time::Duration};

use tokio::{sync::mpsc, time::Instant};

const DEFAULT_ASSET: &str = "assets/default.wav";

fn machine<P: PersistenceGateway>(
    capture: CaptureSession<FakeMicrophone>,
    store: P,
) -> (
    HoldStateMachine<FakeMicrophone, P>,
    mpsc::Receiver<HoldEvent>,
) {
    let (events_tx, events_rx) = mpsc::channel(16);
    let library = RecordingLibrary::new(store, DEFAULT_ASSET);
    let machine = HoldStateMachine::new(capture, library, DEFAULT_HOLD_DURATION, events_tx);
    (machine, events_rx)
}

fn granted() -> (
    HoldStateMachine<FakeMicrophone, MemoryStore>,
    mpsc::Receiver<HoldEvent>,
    Arc<MicProbe>,
) {
    let (capture, probe, _) = session(MicBehaviour::Grant);
    let (machine, rx) = machine(capture, MemoryStore::new());
    (machine, rx, probe)
}

/// Presses and waits for the hold timer to post its timeout.
async fn press_and_hold<P: PersistenceGateway>(
    machine: &mut HoldStateMachine<FakeMicrophone, P>,
    rx: &mut mpsc::Receiver<HoldEvent>,
) -> HoldEvent {
    assert_eq!(machine.handle(HoldEvent::PressStart).unwrap(), HoldOutcome::None);
    assert_eq!(machine.state(), RecordingState::Arming);
    rx.recv().await.unwrap()
}

/// WHAT: A tap shorter than the hold duration requests playback, never records
/// WHY: Short presses mean "play my memo", not "record"
#[tokio::test(start_paused = true)]
async fn given_tap_shorter_than_hold_when_released_then_playback_without_capture() {
    // Given: An idle machine with an empty store
    let (mut machine, mut rx, probe) = granted();

    // When: Pressing and releasing immediately
    machine.handle(HoldEvent::PressStart).unwrap();
    let outcome = machine.handle(HoldEvent::PressEnd).unwrap();

    // Then: Default asset is requested and the microphone was never touched
    assert_eq!(
        outcome,
        HoldOutcome::PlaybackRequested(RecordingHandle::DefaultAsset(PathBuf::from(
            DEFAULT_ASSET
        )))
    );
    assert_eq!(machine.state(), RecordingState::Idle);
    assert!(!machine.timer_pending());
    assert_eq!(probe.attempts(), 0);

    // And: The cancelled timer never fires
    tokio::time::sleep(DEFAULT_HOLD_DURATION * 2).await;
    assert!(rx.try_recv().is_err());
}

/// WHAT: Holding past the duration starts capture exactly once
/// WHY: Duplicate timeouts or auto-repeat presses must not open a second stream
#[tokio::test(start_paused = true)]
async fn given_hold_past_duration_when_events_repeat_then_capture_started_once() {
    // Given: A held press whose timer has fired
    let (capture, probe, feedback) = session(MicBehaviour::Grant);
    let (mut machine, mut rx) = machine(capture, MemoryStore::new());
    let timeout = press_and_hold(&mut machine, &mut rx).await;

    // When: Handling the timeout twice and a repeated press
    let first = machine.handle(timeout).unwrap();
    let second = machine.handle(timeout).unwrap();
    let repeat = machine.handle(HoldEvent::PressStart).unwrap();

    // Then: Only the first one starts capture
    assert_eq!(first, HoldOutcome::RecordingStarted);
    assert_eq!(second, HoldOutcome::None);
    assert_eq!(repeat, HoldOutcome::None);
    assert_eq!(machine.state(), RecordingState::Recording);
    assert_eq!(probe.acquired(), 1);
    assert_eq!(feedback.signals(), 1);
}

/// WHAT: A 2000ms hold records roughly the 1300ms after the hold duration
/// WHY: Recording begins when the timer fires, not at the initial press
#[tokio::test(start_paused = true)]
async fn given_2000ms_hold_when_released_then_about_1300ms_recorded_and_persisted() {
    // Given: A device delivering 400-sample blocks at 8kHz (one every 50ms)
    let (mic, probe) = FakeMicrophone::paced(400);
    let feedback: Arc<dyn Feedback> = Arc::new(CountingFeedback::default());
    let capture = CaptureSession::open(mic, feedback, AccessRequest::PerRecording);
    let (mut machine, mut rx) = machine(capture, MemoryStore::new());
    let pressed_at = Instant::now();

    // When: Holding for 2000ms then releasing
    let timeout = press_and_hold(&mut machine, &mut rx).await;
    assert_eq!(machine.handle(timeout).unwrap(), HoldOutcome::RecordingStarted);
    tokio::time::sleep_until(pressed_at + Duration::from_millis(2000)).await;
    let outcome = machine.handle(HoldEvent::PressEnd).unwrap();

    // Then: ~1300ms of audio (within one block) is current and persisted
    let HoldOutcome::RecordingSaved {
        recording,
        persisted,
        degraded,
    } = outcome
    else {
        panic!("expected RecordingSaved, got {:?}", outcome);
    };
    assert!(persisted);
    assert!(!degraded);

    let encoded = recording.recording().unwrap();
    let expected = 1300 * 8;
    assert!(
        (expected - 400..=expected).contains(&encoded.sample_count()),
        "sample_count = {}",
        encoded.sample_count()
    );
    assert_eq!(encoded.data_len(), encoded.sample_count() * 2);
    assert_eq!(probe.released(), 1);
    assert_eq!(machine.state(), RecordingState::Idle);

    let stored = machine.library().gateway().load().unwrap().unwrap();
    assert_eq!(stored.as_slice(), encoded.bytes());
}

/// WHAT: A timeout already queued when the release arrives is ignored
/// WHY: Release and expiry can race; release wins and nothing records
#[tokio::test(start_paused = true)]
async fn given_timeout_queued_behind_release_when_handled_then_ignored() {
    // Given: A press whose timer fired while the loop was busy
    let (mut machine, mut rx, probe) = granted();
    machine.handle(HoldEvent::PressStart).unwrap();
    tokio::time::sleep(DEFAULT_HOLD_DURATION + Duration::from_millis(100)).await;

    // When: The release is handled before the queued timeout
    let released = machine.handle(HoldEvent::PressEnd).unwrap();
    let queued = rx.try_recv().unwrap();
    let late = machine.handle(queued).unwrap();

    // Then: Playback requested, timeout ignored, microphone untouched
    assert!(matches!(released, HoldOutcome::PlaybackRequested(_)));
    assert_eq!(late, HoldOutcome::None);
    assert_eq!(machine.state(), RecordingState::Idle);
    assert_eq!(probe.attempts(), 0);
}

/// WHAT: A previous gesture's timeout cannot start the next gesture's capture early
/// WHY: Only the live timer of the current press may trigger recording
#[tokio::test(start_paused = true)]
async fn given_stale_timeout_from_previous_gesture_when_rearmed_then_only_new_timer_counts() {
    // Given: Gesture one timed out in the channel, then was released
    let (mut machine, mut rx, probe) = granted();
    machine.handle(HoldEvent::PressStart).unwrap();
    tokio::time::sleep(DEFAULT_HOLD_DURATION + Duration::from_millis(100)).await;
    machine.handle(HoldEvent::PressEnd).unwrap();
    let stale = rx.try_recv().unwrap();

    // When: Gesture two arms and the stale timeout is handled
    machine.handle(HoldEvent::PressStart).unwrap();
    let ignored = machine.handle(stale).unwrap();

    // Then: Still arming with nothing acquired
    assert_eq!(ignored, HoldOutcome::None);
    assert_eq!(machine.state(), RecordingState::Arming);
    assert_eq!(probe.attempts(), 0);

    // And: Gesture two's own timeout starts capture
    let fresh = rx.recv().await.unwrap();
    assert_ne!(fresh, stale);
    assert_eq!(machine.handle(fresh).unwrap(), HoldOutcome::RecordingStarted);
    assert_eq!(probe.acquired(), 1);
}

/// WHAT: Permission denial returns the machine to Idle with no recording
/// WHY: The user must be told, and the next press must work normally
#[tokio::test(start_paused = true)]
async fn given_denied_microphone_when_hold_expires_then_error_and_idle() {
    // Given: A machine over a refusing device
    let (capture, _, feedback) = session(MicBehaviour::Deny);
    let (mut machine, mut rx) = machine(capture, MemoryStore::new());
    let timeout = press_and_hold(&mut machine, &mut rx).await;

    // When: The hold expires
    let result = machine.handle(timeout);

    // Then: PermissionDenied, Idle, no tone, no recording
    assert!(matches!(result, Err(MemoError::PermissionDenied { .. })));
    assert_eq!(machine.state(), RecordingState::Idle);
    assert_eq!(feedback.signals(), 0);
    assert!(matches!(
        machine.last_recording(),
        RecordingHandle::DefaultAsset(_)
    ));

    // And: A release afterwards is a no-op and a new press arms again
    assert_eq!(machine.handle(HoldEvent::PressEnd).unwrap(), HoldOutcome::None);
    machine.handle(HoldEvent::PressStart).unwrap();
    assert_eq!(machine.state(), RecordingState::Arming);
}

/// WHAT: A failed save still makes the new recording current
/// WHY: The user can play back what they just said even if the disk is full
#[tokio::test(start_paused = true)]
async fn given_failing_store_when_recording_ends_then_not_persisted_but_current() {
    // Given: A recording in progress over a store that rejects writes
    let (capture, probe, _) = session(MicBehaviour::Grant);
    let (mut machine, mut rx) = machine(capture, FailingStore);
    let timeout = press_and_hold(&mut machine, &mut rx).await;
    machine.handle(timeout).unwrap();
    probe.push(&[0.5; 800]);

    // When: Releasing
    let outcome = machine.handle(HoldEvent::PressEnd).unwrap();

    // Then: Not persisted, yet it is what playback returns
    let HoldOutcome::RecordingSaved {
        recording,
        persisted,
        degraded,
    } = outcome
    else {
        panic!("expected RecordingSaved, got {:?}", outcome);
    };
    assert!(!persisted);
    assert!(!degraded);
    assert_eq!(machine.last_recording(), recording);
    assert_eq!(recording.recording().map(|r| r.sample_count()), Some(800));
}

/// WHAT: A device failure mid-recording is reported on the saved outcome
/// WHY: The UI must be able to tell a partial memo from a complete one
#[tokio::test(start_paused = true)]
async fn given_device_lost_while_recording_when_released_then_partial_recording_degraded() {
    // Given: A recording whose device fails after the first frame
    let (mut machine, mut rx, probe) = granted();
    let timeout = press_and_hold(&mut machine, &mut rx).await;
    machine.handle(timeout).unwrap();
    probe.push(&[0.5; 160]);
    probe.fail("device unplugged");
    probe.push(&[0.5; 160]);

    // When: Releasing
    let outcome = machine.handle(HoldEvent::PressEnd).unwrap();

    // Then: The partial audio is saved and flagged as degraded
    let HoldOutcome::RecordingSaved {
        recording,
        persisted,
        degraded,
    } = outcome
    else {
        panic!("expected RecordingSaved, got {:?}", outcome);
    };
    assert!(persisted);
    assert!(degraded);
    assert_eq!(recording.recording().map(|r| r.sample_count()), Some(160));
    assert_eq!(probe.released(), 1);
    assert_eq!(machine.state(), RecordingState::Idle);
}

/// WHAT: A recording with no audio leaves the previous one current
/// WHY: An empty artifact must never overwrite a valid memo
#[tokio::test(start_paused = true)]
async fn given_previous_recording_when_next_capture_is_empty_then_previous_kept() {
    // Given: One completed recording
    let (mut machine, mut rx, probe) = granted();
    let timeout = press_and_hold(&mut machine, &mut rx).await;
    machine.handle(timeout).unwrap();
    probe.push(&[0.25; 160]);
    machine.handle(HoldEvent::PressEnd).unwrap();
    let first = machine.last_recording();

    // When: A second hold captures nothing
    let timeout = press_and_hold(&mut machine, &mut rx).await;
    machine.handle(timeout).unwrap();
    let outcome = machine.handle(HoldEvent::PressEnd).unwrap();

    // Then: No save, first recording still current
    assert_eq!(outcome, HoldOutcome::None);
    assert_eq!(machine.last_recording(), first);
    assert_eq!(probe.released(), 2);
}

/// WHAT: Release in Idle does nothing
/// WHY: A stray key-up (e.g. after an error) must not trigger playback
#[test]
fn given_idle_machine_when_released_then_no_op() {
    // Given: An idle machine
    let (mut machine, _rx, probe) = granted();

    // When: Releasing
    let outcome = machine.handle(HoldEvent::PressEnd).unwrap();

    // Then: Nothing happens
    assert_eq!(outcome, HoldOutcome::None);
    assert_eq!(machine.state(), RecordingState::Idle);
    assert_eq!(probe.attempts(), 0);
}

/// WHAT: Pressing outside a tokio runtime reports TimerUnavailable
/// WHY: The hold timer needs a scheduler; failing to arm must leave Idle
#[test]
fn given_no_runtime_when_pressed_then_timer_unavailable_and_idle() {
    // Given: A machine used outside any runtime
    let (mut machine, _rx, _) = granted();

    // When: Pressing
    let result = machine.handle(HoldEvent::PressStart);

    // Then: TimerUnavailable, still Idle
    assert!(matches!(result, Err(MemoError::TimerUnavailable { .. })));
    assert_eq!(machine.state(), RecordingState::Idle);
    assert!(!machine.timer_pending());
}

/// WHAT: Close mid-recording releases the microphone without saving
/// WHY: Shutdown must free hardware on every path
#[tokio::test(start_paused = true)]
async fn given_recording_when_closed_then_microphone_released_and_nothing_saved() {
    // Given: A recording in progress with audio
    let (mut machine, mut rx, probe) = granted();
    let timeout = press_and_hold(&mut machine, &mut rx).await;
    machine.handle(timeout).unwrap();
    probe.push(&[0.5; 80]);

    // When: Closing
    machine.close();

    // Then: Released, Idle, store untouched
    assert_eq!(probe.released(), 1);
    assert_eq!(machine.state(), RecordingState::Idle);
    assert!(machine.library().gateway().load().unwrap().is_none());
}
