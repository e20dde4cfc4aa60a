/// Samples per frame requested from the capture device.
pub const DEFAULT_BLOCK_SIZE: u32 = 4096;

/// One block of mono samples delivered by the capture device.
///
/// Samples are nominally in `[-1.0, 1.0]`; the encoder clamps anything outside.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioFrame {
    /// Wraps a block of mono samples captured at `sample_rate`.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Builds a mono frame from an interleaved device block by averaging channels.
    ///
    /// A trailing partial group of samples (fewer than `channels`) is dropped.
    pub fn from_interleaved(data: &[f32], channels: usize, sample_rate: u32) -> Self {
        Self::downmix(data, channels, sample_rate, |s| s)
    }

    /// Converts and downmixes a raw device block in one pass.
    ///
    /// Same channel handling as [`from_interleaved`](Self::from_interleaved);
    /// only the mono output is allocated.
    pub fn downmix<T: Copy>(
        data: &[T],
        channels: usize,
        sample_rate: u32,
        convert: impl Fn(T) -> f32,
    ) -> Self {
        let samples = if channels <= 1 {
            data.iter().map(|&s| convert(s)).collect()
        } else {
            data.chunks_exact(channels)
                .map(|group| group.iter().map(|&s| convert(s)).sum::<f32>() / channels as f32)
                .collect()
        };

        Self::new(samples, sample_rate)
    }

    /// Sample rate of the session that produced this frame.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of mono samples in the frame.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the frame carries no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Read-only view of the samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}
