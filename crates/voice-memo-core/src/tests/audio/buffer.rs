use crate::{AudioFrame, SampleBuffer, audio::buffer::INITIAL_CAPACITY};

const RATE: u32 = 48_000;

/// WHAT: Draining returns every appended frame concatenated in order
/// WHY: Captured audio must come out exactly as the device delivered it
#[test]
fn given_several_frames_when_draining_then_concatenation_in_arrival_order() {
    // Given: A buffer fed three distinct frames
    let mut buffer = SampleBuffer::new();
    let frames = [vec![0.1f32, 0.2, 0.3], vec![-0.5f32], vec![0.9f32, -0.9]];
    for f in &frames {
        buffer.append(AudioFrame::new(f.clone(), RATE));
    }

    // When: Draining the buffer
    let drained = buffer.drain();

    // Then: Output is F1 || F2 || F3
    let expected: Vec<f32> = frames.concat();
    assert_eq!(drained, expected);
}

/// WHAT: total_samples is the sum of appended frame lengths
/// WHY: Sample count drives the WAV data chunk size
#[test]
fn given_frames_of_varying_length_when_appending_then_total_is_running_sum() {
    // Given: An empty buffer
    let mut buffer = SampleBuffer::new();
    assert_eq!(buffer.total_samples(), 0);
    assert!(buffer.is_empty());

    // When: Appending 4096, 17 and 0 samples
    buffer.append(AudioFrame::new(vec![0.0; 4096], RATE));
    buffer.append(AudioFrame::new(vec![0.0; 17], RATE));
    buffer.append(AudioFrame::new(Vec::new(), RATE));

    // Then: Count and frame tally reflect every append
    assert_eq!(buffer.total_samples(), 4113);
    assert_eq!(buffer.frame_count(), 3);
}

/// WHAT: Drain leaves the buffer empty
/// WHY: A buffer is consumed exactly once per session
#[test]
fn given_filled_buffer_when_drained_then_buffer_is_reset() {
    // Given: A buffer holding samples
    let mut buffer = SampleBuffer::new();
    buffer.append(AudioFrame::new(vec![0.5; 10], RATE));

    // When: Draining twice
    let first = buffer.drain();
    let second = buffer.drain();

    // Then: First drain has the data, second is empty
    assert_eq!(first.len(), 10);
    assert!(second.is_empty());
    assert_eq!(buffer.total_samples(), 0);
    assert_eq!(buffer.frame_count(), 0);
}

/// WHAT: Buffer grows past its initial reservation without dropping samples
/// WHY: Long recordings must not lose their beginning
#[test]
fn given_more_than_initial_capacity_when_appending_then_nothing_dropped() {
    // Given: Enough 4096-sample frames to exceed the initial capacity
    let mut buffer = SampleBuffer::new();
    let frames = INITIAL_CAPACITY / 4096 + 3;

    // When: Appending frames tagged with their index
    for i in 0..frames {
        buffer.append(AudioFrame::new(vec![i as f32; 4096], RATE));
    }

    // Then: All samples remain and the first frame is still first
    let drained = buffer.drain();
    assert_eq!(drained.len(), frames * 4096);
    assert_eq!(drained[0], 0.0);
    assert_eq!(drained[drained.len() - 1], (frames - 1) as f32);
}
