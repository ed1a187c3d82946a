//! Frequency-domain features: spectral centroid, rolloff, and MFCCs.
//!
//! One Hann-windowed STFT (realfft) is computed per signal and shared by all
//! three feature families.

use realfft::RealFftPlanner;

use super::energy::frame_ranges;

/// Fraction of cumulative spectral energy that defines the rolloff frequency
const ROLLOFF_PERCENT: f32 = 0.85;

/// Mel bands in the MFCC filterbank
const N_MELS: usize = 128;

/// STFT magnitude spectra, one row per frame with `frame_len / 2 + 1` bins.
pub fn stft_magnitudes(samples: &[f32], frame_len: usize, hop: usize) -> Vec<Vec<f32>> {
    let ranges = frame_ranges(samples.len(), frame_len, hop);
    if ranges.is_empty() {
        return Vec::new();
    }

    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(frame_len);

    let window: Vec<f32> = (0..frame_len)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / frame_len as f32;
            0.5 * (1.0 - phase.cos())
        })
        .collect();

    let mut scratch = fft.make_scratch_vec();
    let mut frame_buf = vec![0.0f32; frame_len];
    let mut spectrum = fft.make_output_vec();
    let mut magnitudes = Vec::with_capacity(ranges.len());

    for (start, end) in ranges {
        // Windowed frame, zero-padded when the signal is shorter than one frame
        frame_buf.fill(0.0);
        for (i, &sample) in samples[start..end].iter().enumerate() {
            frame_buf[i] = sample * window[i];
        }

        if fft
            .process_with_scratch(&mut frame_buf, &mut spectrum, &mut scratch)
            .is_err()
        {
            continue;
        }

        magnitudes.push(spectrum.iter().map(|c| c.norm()).collect());
    }

    magnitudes
}

/// Mean spectral centroid (Hz) across frames.
pub fn spectral_centroid_mean(magnitudes: &[Vec<f32>], sample_rate: u32, frame_len: usize) -> f32 {
    if magnitudes.is_empty() {
        return 0.0;
    }
    let bin_hz = sample_rate as f32 / frame_len as f32;

    let mut total = 0.0f64;
    for frame in magnitudes {
        let sum: f32 = frame.iter().sum();
        if sum <= 1e-10 {
            continue;
        }
        let weighted: f32 = frame
            .iter()
            .enumerate()
            .map(|(k, &mag)| k as f32 * bin_hz * mag)
            .sum();
        total += (weighted / sum) as f64;
    }
    (total / magnitudes.len() as f64) as f32
}

/// Mean rolloff frequency (Hz) across frames: the lowest frequency below
/// which [`ROLLOFF_PERCENT`] of the spectral magnitude is concentrated.
pub fn spectral_rolloff_mean(magnitudes: &[Vec<f32>], sample_rate: u32, frame_len: usize) -> f32 {
    if magnitudes.is_empty() {
        return 0.0;
    }
    let bin_hz = sample_rate as f32 / frame_len as f32;

    let mut total = 0.0f64;
    for frame in magnitudes {
        let sum: f32 = frame.iter().sum();
        if sum <= 1e-10 {
            continue;
        }
        let threshold = ROLLOFF_PERCENT * sum;
        let mut cumulative = 0.0f32;
        for (k, &mag) in frame.iter().enumerate() {
            cumulative += mag;
            if cumulative >= threshold {
                total += (k as f32 * bin_hz) as f64;
                break;
            }
        }
    }
    (total / magnitudes.len() as f64) as f32
}

/// Time-averaged MFCCs: mel filterbank over the power spectrum, log
/// compression, DCT-II with orthonormal scaling, first `n_mfcc` coefficients.
pub fn mfcc_means(
    magnitudes: &[Vec<f32>],
    sample_rate: u32,
    frame_len: usize,
    n_mfcc: usize,
) -> Vec<f32> {
    if magnitudes.is_empty() {
        return vec![0.0; n_mfcc];
    }

    let filterbank = mel_filterbank(N_MELS, frame_len, sample_rate as f32);
    let mut sums = vec![0.0f64; n_mfcc];

    for frame in magnitudes {
        let mut log_mel = vec![0.0f32; N_MELS];
        for (band, filter) in filterbank.iter().enumerate() {
            let mut band_energy = 0.0f32;
            for (&coeff, &mag) in filter.iter().zip(frame.iter()) {
                band_energy += coeff * mag * mag;
            }
            log_mel[band] = band_energy.max(1e-10).ln();
        }

        for (k, sum) in sums.iter_mut().enumerate() {
            *sum += dct_coefficient(&log_mel, k) as f64;
        }
    }

    sums.iter()
        .map(|&sum| (sum / magnitudes.len() as f64) as f32)
        .collect()
}

/// One coefficient of an orthonormal DCT-II.
fn dct_coefficient(values: &[f32], k: usize) -> f32 {
    let n = values.len() as f32;
    let scale = if k == 0 {
        (1.0 / n).sqrt()
    } else {
        (2.0 / n).sqrt()
    };
    let sum: f32 = values
        .iter()
        .enumerate()
        .map(|(i, &v)| v * (std::f32::consts::PI * k as f32 * (2.0 * i as f32 + 1.0) / (2.0 * n)).cos())
        .sum();
    scale * sum
}

/// Triangular mel filterbank: `n_bands` filters of `frame_len / 2 + 1`
/// coefficients each.
fn mel_filterbank(n_bands: usize, frame_len: usize, sample_rate: f32) -> Vec<Vec<f32>> {
    let n_bins = frame_len / 2 + 1;
    let f_max = sample_rate / 2.0;

    let mel_min = hz_to_mel(0.0);
    let mel_max = hz_to_mel(f_max);

    let n_points = n_bands + 2;
    let bin_points: Vec<f32> = (0..n_points)
        .map(|i| {
            let mel = mel_min + (mel_max - mel_min) * i as f32 / (n_points - 1) as f32;
            mel_to_hz(mel) * frame_len as f32 / sample_rate
        })
        .collect();

    let mut filterbank = Vec::with_capacity(n_bands);
    for band in 0..n_bands {
        let mut filter = vec![0.0f32; n_bins];
        let left = bin_points[band];
        let center = bin_points[band + 1];
        let right = bin_points[band + 2];

        for (bin, coeff) in filter.iter_mut().enumerate() {
            let bin_f = bin as f32;
            if bin_f >= left && bin_f <= center && (center - left) > 0.0 {
                *coeff = (bin_f - left) / (center - left);
            } else if bin_f > center && bin_f <= right && (right - center) > 0.0 {
                *coeff = (right - bin_f) / (right - center);
            }
        }
        filterbank.push(filter);
    }

    filterbank
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0f32.powf(mel / 2595.0) - 1.0)
}
