//! Feature extraction: waveform to the fixed 23-slot vector the classifier
//! artifact was trained against.
//!
//! Slot order is a contract shared with the artifact and must never change:
//!
//! | Slots | Feature |
//! |-------|---------|
//! | 0–2   | pitch mean / std / range (YIN, 50–300 Hz) |
//! | 3–5   | intensity mean / std / range (frame RMS) |
//! | 6     | speech rate (active segments per second) |
//! | 7     | spectral centroid mean |
//! | 8     | spectral rolloff mean |
//! | 9     | zero-crossing rate mean |
//! | 10–22 | 13 MFCCs, each averaged over time |

pub mod energy;
pub mod pitch;
pub mod spectral;

use crate::audio::AudioSignal;

/// Number of scalars in a feature vector
pub const FEATURE_DIM: usize = 23;

/// Analysis frame length in samples
pub const FRAME_LENGTH: usize = 2048;

/// Analysis hop length in samples
pub const HOP_LENGTH: usize = 512;

/// Segmentation threshold for speech-rate: dB below peak frame RMS
const SILENCE_THRESHOLD_DB: f32 = 30.0;

const N_MFCC: usize = 13;

/// Fixed-order feature vector. The dimension is enforced by the type.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([f32; FEATURE_DIM]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.0.to_vec()
    }

    /// Speech-rate slot, exposed for boundary diagnostics
    pub fn speech_rate(&self) -> f32 {
        self.0[6]
    }
}

/// Extract the 23-slot feature vector from a decoded signal.
///
/// Total and deterministic: degenerate input (empty or silent) produces
/// degenerate-but-finite statistics, never a panic. Any non-finite value is
/// clamped to 0.0 before the vector is returned.
pub fn extract(signal: &AudioSignal) -> FeatureVector {
    let samples = &signal.samples;
    let sample_rate = signal.sample_rate;

    let pitch_track = pitch::yin_track(samples, sample_rate, FRAME_LENGTH, HOP_LENGTH);
    let (pitch_mean, pitch_std, pitch_range) = stats(&pitch_track);

    let rms = energy::frame_rms(samples, FRAME_LENGTH, HOP_LENGTH);
    let (intensity_mean, intensity_std, intensity_range) = stats(&rms);

    // Speech rate is 0 by definition for zero-duration input
    let duration = signal.duration_seconds();
    let speech_rate = if duration > 0.0 {
        let segments = energy::count_active_segments(&rms, SILENCE_THRESHOLD_DB);
        (segments as f64 / duration) as f32
    } else {
        0.0
    };

    let magnitudes = spectral::stft_magnitudes(samples, FRAME_LENGTH, HOP_LENGTH);
    let centroid = spectral::spectral_centroid_mean(&magnitudes, sample_rate, FRAME_LENGTH);
    let rolloff = spectral::spectral_rolloff_mean(&magnitudes, sample_rate, FRAME_LENGTH);
    let zcr = energy::mean_zero_crossing_rate(samples, FRAME_LENGTH, HOP_LENGTH);
    let mfcc = spectral::mfcc_means(&magnitudes, sample_rate, FRAME_LENGTH, N_MFCC);

    let mut values = [0.0f32; FEATURE_DIM];
    values[0] = pitch_mean;
    values[1] = pitch_std;
    values[2] = pitch_range;
    values[3] = intensity_mean;
    values[4] = intensity_std;
    values[5] = intensity_range;
    values[6] = speech_rate;
    values[7] = centroid;
    values[8] = rolloff;
    values[9] = zcr;
    values[10..10 + N_MFCC].copy_from_slice(&mfcc);

    for value in &mut values {
        if !value.is_finite() {
            *value = 0.0;
        }
    }

    FeatureVector(values)
}

/// Mean, population standard deviation, and range of a value series.
/// An empty series yields all zeros.
fn stats(values: &[f32]) -> (f32, f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0);
    }

    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n;

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }

    (mean as f32, variance.sqrt() as f32, max - min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::TARGET_SAMPLE_RATE;

    fn signal_from(samples: Vec<f32>) -> AudioSignal {
        AudioSignal::new(samples, TARGET_SAMPLE_RATE)
    }

    #[test]
    fn stats_of_constant_series() {
        let (mean, std, range) = stats(&[2.0, 2.0, 2.0]);
        assert_eq!(mean, 2.0);
        assert_eq!(std, 0.0);
        assert_eq!(range, 0.0);
    }

    #[test]
    fn stats_of_empty_series_is_zero() {
        assert_eq!(stats(&[]), (0.0, 0.0, 0.0));
    }

    #[test]
    fn stats_of_spread_series() {
        let (mean, std, range) = stats(&[1.0, 3.0]);
        assert_eq!(mean, 2.0);
        assert_eq!(std, 1.0);
        assert_eq!(range, 2.0);
    }

    #[test]
    fn empty_signal_extracts_all_zero() {
        let vector = extract(&signal_from(Vec::new()));
        assert_eq!(vector.as_slice().len(), FEATURE_DIM);
        assert!(vector.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn silent_signal_has_zero_speech_rate_and_finite_slots() {
        let vector = extract(&signal_from(vec![0.0; TARGET_SAMPLE_RATE as usize]));
        assert_eq!(vector.speech_rate(), 0.0);
        assert!(vector.as_slice().iter().all(|v| v.is_finite()));
    }
}
