//! Audio input handling: container decoding, mono downmix, resampling.

pub mod decoder;

pub use decoder::{decode_audio_bytes, DecodeError};

/// Target sample rate for all downstream analysis (Hz).
///
/// The classifier artifact was trained on features computed at this rate, so
/// every decoded upload is resampled here before extraction.
pub const TARGET_SAMPLE_RATE: u32 = 22_050;

/// Decoded mono waveform at a known sample rate.
#[derive(Debug, Clone)]
pub struct AudioSignal {
    /// Mono samples (f32, nominal range [-1.0, 1.0])
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioSignal {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Duration in seconds (0.0 for an empty signal)
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
