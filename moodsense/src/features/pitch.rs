//! Fundamental-frequency estimation (YIN).
//!
//! Per-frame YIN with the cumulative mean normalized difference function,
//! an absolute threshold of 0.1, and parabolic interpolation of the selected
//! lag, bounded to the 50–300 Hz range of voiced speech.

/// Lower bound of the pitch search range (Hz)
pub const PITCH_FMIN: f32 = 50.0;
/// Upper bound of the pitch search range (Hz)
pub const PITCH_FMAX: f32 = 300.0;

const YIN_THRESHOLD: f32 = 0.1;

/// Per-frame pitch estimates in Hz.
///
/// Frames whose energy is effectively zero contribute no estimate, so a
/// silent signal yields an empty track. Estimates are clamped to
/// [`PITCH_FMIN`], [`PITCH_FMAX`].
pub fn yin_track(samples: &[f32], sample_rate: u32, frame_len: usize, hop: usize) -> Vec<f32> {
    if samples.len() < frame_len || sample_rate == 0 {
        return Vec::new();
    }

    let window = frame_len / 2;
    let tau_min = (sample_rate as f32 / PITCH_FMAX).floor().max(1.0) as usize;
    // The search range cannot reach past the frame
    let tau_max = ((sample_rate as f32 / PITCH_FMIN).ceil() as usize).min(frame_len - window);
    if tau_min > tau_max {
        return Vec::new();
    }

    let n_frames = (samples.len() - frame_len) / hop + 1;
    let mut track = Vec::with_capacity(n_frames);
    let mut diff = vec![0.0f32; tau_max + 1];

    for frame_idx in 0..n_frames {
        let frame = &samples[frame_idx * hop..frame_idx * hop + frame_len];

        let energy: f32 = frame[..window].iter().map(|&s| s * s).sum();
        if energy <= f32::EPSILON {
            continue;
        }

        difference_function(frame, window, &mut diff);
        let cmnd = cumulative_mean_normalized(&diff);

        if let Some(tau) = select_lag(&cmnd, tau_min, tau_max) {
            let refined = parabolic_interpolation(&cmnd, tau);
            let f0 = (sample_rate as f32 / refined).clamp(PITCH_FMIN, PITCH_FMAX);
            track.push(f0);
        }
    }

    track
}

/// d(tau) = sum over the window of (x[j] - x[j+tau])^2
fn difference_function(frame: &[f32], window: usize, diff: &mut [f32]) {
    diff[0] = 0.0;
    for tau in 1..diff.len() {
        let mut sum = 0.0f32;
        for j in 0..window {
            let delta = frame[j] - frame[j + tau];
            sum += delta * delta;
        }
        diff[tau] = sum;
    }
}

/// d'(tau) = d(tau) * tau / sum_{1..=tau} d(j), with d'(0) = 1
fn cumulative_mean_normalized(diff: &[f32]) -> Vec<f32> {
    let mut cmnd = vec![1.0f32; diff.len()];
    let mut running_sum = 0.0f32;
    for tau in 1..diff.len() {
        running_sum += diff[tau];
        cmnd[tau] = if running_sum > 0.0 {
            diff[tau] * tau as f32 / running_sum
        } else {
            1.0
        };
    }
    cmnd
}

/// First lag under the threshold, descended to its local minimum; falls back
/// to the global minimum of the search range when no lag dips below.
fn select_lag(cmnd: &[f32], tau_min: usize, tau_max: usize) -> Option<usize> {
    let tau_max = tau_max.min(cmnd.len() - 1);
    if tau_min > tau_max {
        return None;
    }

    let mut tau = tau_min;
    while tau <= tau_max {
        if cmnd[tau] < YIN_THRESHOLD {
            while tau + 1 <= tau_max && cmnd[tau + 1] < cmnd[tau] {
                tau += 1;
            }
            return Some(tau);
        }
        tau += 1;
    }

    (tau_min..=tau_max).min_by(|&a, &b| {
        cmnd[a]
            .partial_cmp(&cmnd[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

/// Refine the lag by fitting a parabola through its neighbors.
fn parabolic_interpolation(cmnd: &[f32], tau: usize) -> f32 {
    if tau == 0 || tau + 1 >= cmnd.len() {
        return tau as f32;
    }
    let a = cmnd[tau - 1];
    let b = cmnd[tau];
    let c = cmnd[tau + 1];
    let denom = a - 2.0 * b + c;
    if denom.abs() <= f32::EPSILON {
        return tau as f32;
    }
    let delta = ((a - c) / (2.0 * denom)).clamp(-1.0, 1.0);
    tau as f32 + delta
}
