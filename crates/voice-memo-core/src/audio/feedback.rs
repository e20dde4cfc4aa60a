//! "Recording started" acknowledgement.
//!
//! Feedback is fire-and-forget: it never blocks the caller and never fails the
//! recording pipeline. A machine without an output device simply stays silent.

use crate::{CoreResult, MemoError};

use std::{f32::consts::PI, panic::Location, thread, time::Duration};

use cpal::{
    FromSample, SampleFormat, SizedSample, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, warn};

/// Acknowledgement tone frequency.
pub const TONE_FREQUENCY_HZ: f32 = 880.0;

/// Acknowledgement tone length.
pub const TONE_DURATION: Duration = Duration::from_millis(200);

/// Extra time the output stream is kept open after the tone so the device
/// drains its last buffer.
const TONE_TAIL: Duration = Duration::from_millis(50);

/// Length of the linear fade at both ends of the tone, avoiding clicks.
const FADE: Duration = Duration::from_millis(5);

/// Receives the signal that a recording has just started.
pub trait Feedback: Send + Sync {
    /// Requests a short tone/haptic pulse. Must return immediately.
    fn signal_recording_started(&self);
}

/// Feedback that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentFeedback;

impl Feedback for SilentFeedback {
    fn signal_recording_started(&self) {
        debug!("Recording started (silent feedback)");
    }
}

/// Plays a short sine tone on the default output device.
#[derive(Debug, Clone, Copy)]
pub struct ToneFeedback {
    volume: f32,
}

impl ToneFeedback {
    /// Creates tone feedback at `volume` (clamped to `0.0..=1.0`).
    pub fn new(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
        }
    }

    /// Loudness applied to the tone.
    pub fn volume(&self) -> f32 {
        self.volume
    }
}

impl Feedback for ToneFeedback {
    fn signal_recording_started(&self) {
        if self.volume <= 0.0 {
            return;
        }

        let volume = self.volume;
        let spawned = thread::Builder::new()
            .name("voice-memo-tone".to_string())
            .spawn(move || {
                if let Err(e) = play_tone(volume) {
                    warn!(error = %e, "Acknowledgement tone unavailable");
                }
            });

        if let Err(e) = spawned {
            warn!(error = %e, "Failed to spawn tone thread");
        }
    }
}

/// Synthesizes the acknowledgement tone as mono samples at `sample_rate`.
pub fn tone_samples(sample_rate: u32, frequency: f32, duration: Duration, volume: f32) -> Vec<f32> {
    let len = (duration.as_secs_f64() * f64::from(sample_rate)).round() as usize;
    let fade = ((FADE.as_secs_f64() * f64::from(sample_rate)) as usize).min(len / 2);
    let volume = volume.clamp(0.0, 1.0);

    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let envelope = if fade == 0 {
                1.0
            } else if i < fade {
                i as f32 / fade as f32
            } else if i >= len - fade {
                (len - i) as f32 / fade as f32
            } else {
                1.0
            };
            (2.0 * PI * frequency * t).sin() * volume * envelope
        })
        .collect()
}

#[track_caller]
fn play_tone(volume: f32) -> CoreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| device_error("No output device".to_string()))?;

    let supported = device
        .default_output_config()
        .map_err(|e| device_error(format!("Failed to get output config: {}", e)))?;

    let sample_format = supported.sample_format();
    let config: StreamConfig = supported.into();
    let tone = tone_samples(config.sample_rate, TONE_FREQUENCY_HZ, TONE_DURATION, volume);

    let stream = match sample_format {
        SampleFormat::F32 => build_tone_stream::<f32>(&device, &config, tone)?,
        SampleFormat::I16 => build_tone_stream::<i16>(&device, &config, tone)?,
        SampleFormat::U16 => build_tone_stream::<u16>(&device, &config, tone)?,
        other => {
            return Err(device_error(format!(
                "Unsupported output sample format: {:?}",
                other
            )));
        }
    };

    stream
        .play()
        .map_err(|e| device_error(format!("Failed to start tone stream: {}", e)))?;

    thread::sleep(TONE_DURATION + TONE_TAIL);
    debug!("Acknowledgement tone played");

    Ok(())
}

#[track_caller]
fn build_tone_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    tone: Vec<f32>,
) -> CoreResult<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = usize::from(config.channels.max(1));
    let mut position = 0usize;

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let value = tone.get(position).copied().unwrap_or(0.0);
                    position += 1;
                    for out in frame.iter_mut() {
                        *out = T::from_sample(value);
                    }
                }
            },
            |err| warn!("Tone stream error: {}", err),
            None,
        )
        .map_err(|e| device_error(format!("Failed to build tone stream: {}", e)))
}

#[track_caller]
fn device_error(reason: String) -> MemoError {
    MemoError::DeviceError {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}
