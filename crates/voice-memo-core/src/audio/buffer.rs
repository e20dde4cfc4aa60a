use crate::audio::AudioFrame;

/// Initial capacity: ten seconds at 48kHz mono.
///
/// Only a starting reservation; the buffer grows without limit and never
/// discards samples.
pub(crate) const INITIAL_CAPACITY: usize = 48_000 * 10;

/// Append-only accumulator for the frames of one capture session.
///
/// Logically a single growing sample array: frames are concatenated in the
/// order they are appended and nothing is dropped or reordered.
#[derive(Debug, Default)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    frames: usize,
}

impl SampleBuffer {
    /// Creates an empty buffer with room for a short recording.
    pub fn new() -> Self {
        Self {
            samples: Vec::with_capacity(INITIAL_CAPACITY),
            frames: 0,
        }
    }

    /// Appends a frame's samples after everything already collected.
    pub fn append(&mut self, frame: AudioFrame) {
        self.samples.extend_from_slice(frame.samples());
        self.frames += 1;
    }

    /// Running sample count across every appended frame.
    pub fn total_samples(&self) -> usize {
        self.samples.len()
    }

    /// Number of frames appended since the last drain.
    pub fn frame_count(&self) -> usize {
        self.frames
    }

    /// Whether no samples have been collected.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Takes the full ordered sample sequence and leaves the buffer empty.
    pub fn drain(&mut self) -> Vec<f32> {
        self.frames = 0;
        std::mem::take(&mut self.samples)
    }
}
