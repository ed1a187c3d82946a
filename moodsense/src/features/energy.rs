//! Time-domain features: frame RMS energy, silence segmentation, zero crossings.

/// Frame-wise RMS energy.
///
/// Frames of `frame_len` samples advance by `hop`; a signal shorter than one
/// frame yields a single partial frame. An empty signal yields no frames.
pub fn frame_rms(samples: &[f32], frame_len: usize, hop: usize) -> Vec<f32> {
    frame_ranges(samples.len(), frame_len, hop)
        .into_iter()
        .map(|(start, end)| {
            let frame = &samples[start..end];
            let sum_squares: f64 = frame.iter().map(|&s| (s as f64).powi(2)).sum();
            (sum_squares / frame.len() as f64).sqrt() as f32
        })
        .collect()
}

/// Count contiguous runs of frames louder than `threshold_db` below the peak
/// frame RMS.
///
/// An all-silent signal (peak RMS 0) has no active segments.
pub fn count_active_segments(rms: &[f32], threshold_db: f32) -> usize {
    let peak = rms.iter().cloned().fold(0.0f32, f32::max);
    if peak <= 0.0 {
        return 0;
    }

    let threshold = peak * db_to_linear(-threshold_db.abs());

    let mut segments = 0;
    let mut in_segment = false;
    for &value in rms {
        if value >= threshold {
            if !in_segment {
                segments += 1;
                in_segment = true;
            }
        } else {
            in_segment = false;
        }
    }
    segments
}

/// Mean zero-crossing rate across frames (fraction of sample pairs that
/// change sign within each frame).
pub fn mean_zero_crossing_rate(samples: &[f32], frame_len: usize, hop: usize) -> f32 {
    let ranges = frame_ranges(samples.len(), frame_len, hop);
    if ranges.is_empty() {
        return 0.0;
    }

    let mut total = 0.0f64;
    for (start, end) in &ranges {
        let frame = &samples[*start..*end];
        if frame.len() < 2 {
            continue;
        }
        let crossings = frame
            .windows(2)
            .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
            .count();
        total += crossings as f64 / frame.len() as f64;
    }
    (total / ranges.len() as f64) as f32
}

/// Start/end sample indices for each analysis frame.
pub(crate) fn frame_ranges(len: usize, frame_len: usize, hop: usize) -> Vec<(usize, usize)> {
    if len == 0 || frame_len == 0 || hop == 0 {
        return Vec::new();
    }
    if len <= frame_len {
        return vec![(0, len)];
    }
    let n_frames = (len - frame_len) / hop + 1;
    (0..n_frames)
        .map(|i| (i * hop, i * hop + frame_len))
        .collect()
}

fn db_to_linear(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}
