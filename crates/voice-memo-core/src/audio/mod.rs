pub(crate) mod buffer;
mod capture;
pub(crate) mod encoder;
mod feedback;
mod frame;
pub(crate) mod microphone;

pub use {
    buffer::SampleBuffer,
    capture::{AccessRequest, CaptureSession, FrameSink, Microphone},
    encoder::{EncodedRecording, WAV_HEADER_LEN, decode, encode, to_pcm16},
    feedback::{
        Feedback, SilentFeedback, TONE_DURATION, TONE_FREQUENCY_HZ, ToneFeedback, tone_samples,
    },
    frame::{AudioFrame, DEFAULT_BLOCK_SIZE},
    microphone::CpalMicrophone,
};
