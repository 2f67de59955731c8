//! Audio capture and speech-to-text collaborator boundary.
//!
//! # Responsibility
//! - Describe the audio format the recognizer accepts.
//! - Define the traits external capture/transcription components implement.
//!
//! # Invariants
//! - Recognizers only ever see mono, 16 kHz, 16-bit PCM.
//! - Format violations are hard failures (`FormatError`), unlike dialog
//!   mutations.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub const REQUIRED_CHANNELS: u16 = 1;
pub const REQUIRED_SAMPLE_RATE_HZ: u32 = 16_000;
pub const REQUIRED_SAMPLE_WIDTH_BITS: u16 = 16;

/// PCM stream parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub channels: u16,
    pub sample_rate_hz: u32,
    pub sample_width_bits: u16,
}

impl PcmFormat {
    /// The only format accepted by `SpeechRecognizer`.
    pub const SPEECH: Self = Self {
        channels: REQUIRED_CHANNELS,
        sample_rate_hz: REQUIRED_SAMPLE_RATE_HZ,
        sample_width_bits: REQUIRED_SAMPLE_WIDTH_BITS,
    };

    /// Checks that this format is mono / 16 kHz / 16-bit.
    pub fn validate(&self) -> Result<(), FormatError> {
        if *self == Self::SPEECH {
            return Ok(());
        }
        Err(FormatError::UnsupportedFormat(*self))
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self::SPEECH
    }
}

/// Malformed audio at the collaborator boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    UnsupportedFormat(PcmFormat),
    /// 16-bit samples need an even number of bytes.
    TruncatedSample { byte_len: usize },
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormat(format) => write!(
                f,
                "audio must be mono PCM 16-bit 16kHz, got channels={} rate={}Hz width={}bit",
                format.channels, format.sample_rate_hz, format.sample_width_bits
            ),
            Self::TruncatedSample { byte_len } => {
                write!(f, "pcm buffer length {byte_len} is not a whole number of samples")
            }
        }
    }
}

impl Error for FormatError {}

/// Validated mono 16-bit PCM samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmBuffer {
    format: PcmFormat,
    samples: Vec<i16>,
}

impl PcmBuffer {
    /// Decodes little-endian 16-bit samples after validating `format`.
    pub fn from_le_bytes(format: PcmFormat, bytes: &[u8]) -> Result<Self, FormatError> {
        format.validate()?;
        if bytes.len() % 2 != 0 {
            return Err(FormatError::TruncatedSample {
                byte_len: bytes.len(),
            });
        }
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(Self { format, samples })
    }

    /// Wraps already-decoded samples after validating `format`.
    pub fn from_samples(format: PcmFormat, samples: Vec<i16>) -> Result<Self, FormatError> {
        format.validate()?;
        Ok(Self { format, samples })
    }

    pub fn format(&self) -> PcmFormat {
        self.format
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Duration in milliseconds at the buffer's sample rate.
    pub fn duration_ms(&self) -> u64 {
        let frames = self.samples.len() as u64 / u64::from(self.format.channels.max(1));
        frames * 1000 / u64::from(self.format.sample_rate_hz)
    }
}

/// Failure reported by a speech recognizer.
#[derive(Debug)]
pub enum SpeechError {
    Format(FormatError),
    Backend(String),
}

impl Display for SpeechError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Format(err) => write!(f, "{err}"),
            Self::Backend(message) => write!(f, "speech backend failed: {message}"),
        }
    }
}

impl Error for SpeechError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Format(err) => Some(err),
            Self::Backend(_) => None,
        }
    }
}

impl From<FormatError> for SpeechError {
    fn from(value: FormatError) -> Self {
        Self::Format(value)
    }
}

/// External recorder producing an audio clip at a destination.
pub trait AudioCapture {
    type Error: Error;

    fn start_recording(&mut self, destination: &Path) -> Result<(), Self::Error>;
    fn stop_recording(&mut self) -> Result<(), Self::Error>;
}

/// External speech-to-text engine.
pub trait SpeechRecognizer {
    fn transcribe(&self, audio: &PcmBuffer) -> Result<String, SpeechError>;
}

/// Re-checks the buffer format, transcribes it and trims the text.
pub fn transcribe_checked<R>(recognizer: &R, audio: &PcmBuffer) -> Result<String, SpeechError>
where
    R: SpeechRecognizer + ?Sized,
{
    audio.format().validate()?;
    let text = recognizer.transcribe(audio)?;
    Ok(text.trim().to_string())
}
