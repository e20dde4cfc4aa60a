//! WAV encoding of captured samples.
//!
//! Output is always a canonical 44-byte RIFF/WAVE header (PCM, mono, 16-bit,
//! little-endian) followed by the sample data.

use crate::{CoreResult, MemoError};

use std::{io::Cursor, panic::Location, sync::Arc};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::{debug, instrument};

/// Size of the RIFF/WAVE header written before the sample data.
pub const WAV_HEADER_LEN: usize = 44;

/// Channel count of every encoded recording.
pub const CHANNELS: u16 = 1;

/// Bit depth of every encoded recording.
pub const BITS_PER_SAMPLE: u16 = 16;

/// A complete, independently playable WAV container.
///
/// Immutable once built. The bytes live behind an `Arc` so a reader holding a
/// clone keeps valid data even after a newer recording replaces this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRecording {
    bytes: Arc<[u8]>,
    sample_rate: u32,
    sample_count: usize,
}

impl EncodedRecording {
    /// The full container: header plus PCM data.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Sample rate declared in the header.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Always mono.
    pub fn channels(&self) -> u16 {
        CHANNELS
    }

    /// Number of 16-bit samples in the data chunk.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Size of the data chunk in bytes.
    pub fn data_len(&self) -> usize {
        self.bytes.len().saturating_sub(WAV_HEADER_LEN)
    }

    /// Playback length derived from the sample count and rate.
    pub fn duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.sample_count as f64 / self.sample_rate as f64)
    }

    /// Rebuilds a recording from previously persisted container bytes.
    ///
    /// # Errors
    ///
    /// Returns `EncodingError` if the bytes are not a mono 16-bit PCM WAV.
    #[track_caller]
    pub fn from_bytes(bytes: Vec<u8>) -> CoreResult<Self> {
        let (samples, sample_rate) = decode(&bytes)?;

        Ok(Self {
            bytes: Arc::from(bytes),
            sample_rate,
            sample_count: samples.len(),
        })
    }
}

/// Converts one float sample to signed 16-bit PCM.
///
/// Clamps to `[-1.0, 1.0]`, then scales negatives by 32768 and non-negatives by
/// 32767 so that both ends of the range map onto valid `i16` values.
pub fn to_pcm16(sample: f32) -> i16 {
    let s = if sample.is_nan() {
        0.0
    } else {
        sample.clamp(-1.0, 1.0)
    };

    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encodes mono float samples into a WAV container at `sample_rate`.
///
/// # Errors
///
/// Returns `EncodingError` for an empty sample sequence, a zero sample rate,
/// or a data chunk too large for a RIFF header.
#[track_caller]
#[instrument(skip(samples), fields(sample_count = samples.len()))]
pub fn encode(samples: &[f32], sample_rate: u32) -> CoreResult<EncodedRecording> {
    if samples.is_empty() {
        return Err(MemoError::EncodingError {
            reason: "no samples to encode".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    if sample_rate == 0 {
        return Err(MemoError::EncodingError {
            reason: "sample rate must be positive".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    // RIFF sizes are u32 and the chunk size adds 36 bytes on top of the data.
    let data_len = samples.len() as u64 * u64::from(BITS_PER_SAMPLE / 8);
    if data_len + 36 > u64::from(u32::MAX) {
        return Err(MemoError::EncodingError {
            reason: format!("{} samples exceed the WAV size limit", samples.len()),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let spec = WavSpec {
        channels: CHANNELS,
        sample_rate,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(WAV_HEADER_LEN + data_len as usize));
    {
        let mut writer =
            WavWriter::new(&mut cursor, spec).map_err(|e| MemoError::EncodingError {
                reason: format!("Failed to write WAV header: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        for &sample in samples {
            writer
                .write_sample(to_pcm16(sample))
                .map_err(|e| MemoError::EncodingError {
                    reason: format!("Failed to write PCM data: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
        }

        writer.finalize().map_err(|e| MemoError::EncodingError {
            reason: format!("Failed to finalize WAV: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;
    }

    let bytes = cursor.into_inner();

    debug!(sample_rate, byte_len = bytes.len(), "Encoded recording");

    Ok(EncodedRecording {
        bytes: Arc::from(bytes),
        sample_rate,
        sample_count: samples.len(),
    })
}

/// Reads a mono 16-bit PCM WAV back into samples and its sample rate.
///
/// # Errors
///
/// Returns `EncodingError` if the container is malformed or has a different
/// channel count or bit depth.
#[track_caller]
pub fn decode(bytes: &[u8]) -> CoreResult<(Vec<i16>, u32)> {
    let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| MemoError::EncodingError {
        reason: format!("Failed to read WAV header: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let spec = reader.spec();
    if spec.channels != CHANNELS
        || spec.bits_per_sample != BITS_PER_SAMPLE
        || spec.sample_format != SampleFormat::Int
    {
        return Err(MemoError::EncodingError {
            reason: format!(
                "Unsupported WAV layout: {} channels, {} bits, {:?}",
                spec.channels, spec.bits_per_sample, spec.sample_format
            ),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let samples = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| MemoError::EncodingError {
            reason: format!("Failed to read PCM data: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok((samples, spec.sample_rate))
}
