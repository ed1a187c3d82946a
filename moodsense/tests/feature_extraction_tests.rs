//! Feature extraction integration tests
//!
//! Exercises the full waveform-to-vector path on synthetic signals.

use moodsense::audio::{AudioSignal, TARGET_SAMPLE_RATE};
use moodsense::features::{self, FEATURE_DIM};

fn sine_signal(frequency: f32, duration_secs: f32, amplitude: f32) -> AudioSignal {
    let num_samples = (duration_secs * TARGET_SAMPLE_RATE as f32) as usize;
    let samples = (0..num_samples)
        .map(|i| {
            let t = i as f32 / TARGET_SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * amplitude
        })
        .collect();
    AudioSignal::new(samples, TARGET_SAMPLE_RATE)
}

#[test]
fn sine_tone_produces_full_finite_vector() {
    let vector = features::extract(&sine_signal(220.0, 2.0, 0.5));
    let values = vector.as_slice();

    assert_eq!(values.len(), FEATURE_DIM);
    for (slot, &value) in values.iter().enumerate() {
        assert!(value.is_finite(), "Slot {} not finite: {}", slot, value);
    }
}

#[test]
fn sine_tone_pitch_mean_matches_frequency() {
    let vector = features::extract(&sine_signal(220.0, 2.0, 0.5));
    let pitch_mean = vector.as_slice()[0];

    assert!(
        (pitch_mean - 220.0).abs() < 5.0,
        "Expected pitch mean near 220 Hz, got {}",
        pitch_mean
    );
}

#[test]
fn steady_tone_has_low_pitch_spread() {
    let vector = features::extract(&sine_signal(220.0, 2.0, 0.5));
    let pitch_std = vector.as_slice()[1];
    let pitch_range = vector.as_slice()[2];

    assert!(pitch_std < 5.0, "Pitch std too high for steady tone: {}", pitch_std);
    assert!(pitch_range < 20.0, "Pitch range too wide for steady tone: {}", pitch_range);
}

#[test]
fn extraction_is_deterministic() {
    let signal = sine_signal(220.0, 1.0, 0.5);

    let first = features::extract(&signal);
    let second = features::extract(&signal);
    assert_eq!(first, second);
}

#[test]
fn zero_duration_input_yields_zero_speech_rate() {
    let vector = features::extract(&AudioSignal::new(Vec::new(), TARGET_SAMPLE_RATE));

    assert_eq!(vector.speech_rate(), 0.0);
    assert_eq!(vector.as_slice().len(), FEATURE_DIM);
    assert!(vector.as_slice().iter().all(|v| v.is_finite()));
}

#[test]
fn silent_input_yields_zero_speech_rate() {
    let silence = AudioSignal::new(
        vec![0.0; 2 * TARGET_SAMPLE_RATE as usize],
        TARGET_SAMPLE_RATE,
    );
    let vector = features::extract(&silence);

    assert_eq!(vector.speech_rate(), 0.0);
    assert!(vector.as_slice().iter().all(|v| v.is_finite()));
}

#[test]
fn speech_rate_counts_bursts_per_second() {
    // Three half-second bursts separated by half-second silences: 3 segments
    // over 3 seconds of audio
    let burst = sine_signal(220.0, 0.5, 0.5).samples;
    let gap = vec![0.0f32; (0.5 * TARGET_SAMPLE_RATE as f32) as usize];

    let mut samples = Vec::new();
    for _ in 0..3 {
        samples.extend_from_slice(&burst);
        samples.extend_from_slice(&gap);
    }
    let vector = features::extract(&AudioSignal::new(samples, TARGET_SAMPLE_RATE));

    assert!(
        (vector.speech_rate() - 1.0).abs() < 1e-6,
        "Expected speech rate 1.0, got {}",
        vector.speech_rate()
    );
}

#[test]
fn brighter_signal_has_higher_centroid_and_zcr() {
    let dark = features::extract(&sine_signal(200.0, 1.0, 0.5));
    let bright = features::extract(&sine_signal(4000.0, 1.0, 0.5));

    assert!(
        bright.as_slice()[7] > dark.as_slice()[7],
        "Expected higher centroid for bright signal: {} vs {}",
        bright.as_slice()[7],
        dark.as_slice()[7]
    );
    assert!(
        bright.as_slice()[9] > dark.as_slice()[9],
        "Expected higher ZCR for bright signal: {} vs {}",
        bright.as_slice()[9],
        dark.as_slice()[9]
    );
}

#[test]
fn louder_signal_has_higher_intensity() {
    let quiet = features::extract(&sine_signal(220.0, 1.0, 0.05));
    let loud = features::extract(&sine_signal(220.0, 1.0, 0.5));

    assert!(
        loud.as_slice()[3] > quiet.as_slice()[3],
        "Expected higher intensity mean: {} vs {}",
        loud.as_slice()[3],
        quiet.as_slice()[3]
    );
}
