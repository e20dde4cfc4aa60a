use crate::{
    CoreResult, MemoError,
    audio::{AudioFrame, FrameSink, Microphone},
};

use std::panic::Location;

use cpal::{
    BufferSize, BuildStreamError, Device, FromSample, Sample, SampleFormat, SizedSample, Stream,
    StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{info, instrument, warn};

/// Backend error fragments that mean the OS refused microphone access.
///
/// CPAL has no dedicated permission error, so this match on the message text
/// is best-effort: an unrelated error worded like a refusal is reported as
/// `PermissionDenied`.
const PERMISSION_MARKERS: [&str; 4] =
    ["permission", "access denied", "not authorized", "unauthorized"];

/// Default (or named) system input device driven through CPAL.
pub struct CpalMicrophone {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    block_size: Option<u32>,
}

impl CpalMicrophone {
    /// Resolves the input device.
    ///
    /// `device_name` selects an input by name, falling back to the system
    /// default when no device matches. `block_size` requests a fixed number of
    /// frames per callback; devices that reject it run at their default size.
    ///
    /// # Errors
    ///
    /// Returns error if no input device exists or its config cannot be read.
    #[track_caller]
    #[instrument]
    pub fn new(device_name: Option<&str>, block_size: Option<u32>) -> CoreResult<Self> {
        let host = cpal::default_host();

        let named = device_name.and_then(|wanted| {
            let found = host
                .input_devices()
                .ok()?
                .find(|d| device_label(d).as_deref() == Some(wanted));
            if found.is_none() {
                warn!(device = wanted, "Configured microphone not found, using default");
            }
            found
        });

        let device = match named {
            Some(device) => device,
            None => host
                .default_input_device()
                .ok_or(MemoError::NoMicrophoneFound {
                    location: ErrorLocation::from(Location::caller()),
                })?,
        };

        let config = device
            .default_input_config()
            .map_err(|e| MemoError::DeviceError {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            device = ?device_label(&device),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            sample_format = ?config.sample_format(),
            "CpalMicrophone initialized"
        );

        Ok(Self {
            device,
            sample_format: config.sample_format(),
            config: config.into(),
            block_size,
        })
    }

    /// Channel count delivered by the device before downmixing.
    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    #[track_caller]
    fn build_stream(&self, config: &StreamConfig, sink: FrameSink) -> CoreResult<Stream> {
        match self.sample_format {
            SampleFormat::F32 => self.build_stream_typed::<f32>(config, sink),
            SampleFormat::I16 => self.build_stream_typed::<i16>(config, sink),
            SampleFormat::U16 => self.build_stream_typed::<u16>(config, sink),
            other => Err(MemoError::DeviceError {
                reason: format!("Unsupported input sample format: {:?}", other),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    #[track_caller]
    fn build_stream_typed<T>(&self, config: &StreamConfig, sink: FrameSink) -> CoreResult<Stream>
    where
        T: SizedSample + Send + 'static,
        f32: FromSample<T>,
    {
        let channels = usize::from(config.channels.max(1));
        let sample_rate = sink.sample_rate();
        let error_sink = sink.clone();

        self.device
            .build_input_stream(
                config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    if sink.is_closed() {
                        return;
                    }
                    sink.push(AudioFrame::downmix(data, channels, sample_rate, |s| {
                        f32::from_sample(s)
                    }));
                },
                move |err| {
                    error_sink.fail(&err.to_string());
                },
                None,
            )
            .map_err(|e| map_build_error(e, Location::caller()))
    }
}

impl Microphone for CpalMicrophone {
    type Stream = Stream;

    fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    #[track_caller]
    #[instrument(skip(self, sink))]
    fn acquire(&mut self, sink: FrameSink) -> CoreResult<Stream> {
        let stream = match self.block_size {
            Some(frames) => {
                let fixed = StreamConfig {
                    buffer_size: BufferSize::Fixed(frames),
                    ..self.config.clone()
                };
                match self.build_stream(&fixed, sink.clone()) {
                    Ok(stream) => stream,
                    Err(e @ MemoError::PermissionDenied { .. }) => return Err(e),
                    Err(e) => {
                        warn!(
                            block_size = frames,
                            error = %e,
                            "Fixed block size rejected, using device default"
                        );
                        self.build_stream(&self.config, sink)?
                    }
                }
            }
            None => self.build_stream(&self.config, sink)?,
        };

        stream.play().map_err(|e| MemoError::DeviceError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(stream)
    }
}

#[allow(deprecated)]
fn device_label(device: &Device) -> Option<String> {
    device.name().ok()
}

/// Whether a backend error message reads like the OS refusing access.
pub(crate) fn is_permission_refusal(reason: &str) -> bool {
    let lowered = reason.to_lowercase();
    PERMISSION_MARKERS.iter().any(|m| lowered.contains(m))
}

fn map_build_error(e: BuildStreamError, caller: &'static Location<'static>) -> MemoError {
    let reason = e.to_string();

    if is_permission_refusal(&reason) {
        MemoError::PermissionDenied {
            reason,
            location: ErrorLocation::from(caller),
        }
    } else {
        MemoError::DeviceError {
            reason: format!("Failed to build stream: {}", reason),
            location: ErrorLocation::from(caller),
        }
    }
}
