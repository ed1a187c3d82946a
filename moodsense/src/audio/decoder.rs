//! Upload decoding: container bytes to mono PCM at the analysis rate.
//!
//! Uses symphonia for format-agnostic decoding (WAV, MP3, FLAC, AAC, OGG,
//! etc.), averages channels to mono, and resamples to
//! [`TARGET_SAMPLE_RATE`](super::TARGET_SAMPLE_RATE) with rubato.

use std::io::Cursor;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use thiserror::Error;

use super::{AudioSignal, TARGET_SAMPLE_RATE};

/// Decode failures. All of these are caller-input problems: the uploaded
/// bytes could not be turned into a usable waveform.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Empty upload
    #[error("empty audio payload")]
    EmptyPayload,

    /// Bytes not recognized as a supported audio container
    #[error("unsupported or corrupt audio container: {0}")]
    Probe(String),

    /// Container recognized but no audio track inside
    #[error("no audio track found in upload")]
    NoAudioTrack,

    /// Track does not declare a sample rate
    #[error("sample rate unknown")]
    UnknownSampleRate,

    /// Packet-level decode failure partway through the stream
    #[error("audio decode failed: {0}")]
    Decode(String),

    /// Resampling to the analysis rate failed
    #[error("resampling failed: {0}")]
    Resample(String),
}

/// Decode an uploaded byte buffer to a mono waveform at the analysis rate.
///
/// `extension_hint` is the file extension from the upload's filename, if the
/// client provided one; it speeds up the format probe but is not required.
pub fn decode_audio_bytes(
    bytes: &[u8],
    extension_hint: Option<&str>,
) -> Result<AudioSignal, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }

    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension_hint {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::Probe(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::UnknownSampleRate)?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::Decode(e.to_string()))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(DecodeError::Decode(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| DecodeError::Decode(e.to_string()))?;

        append_mono(&decoded, &mut samples);
    }

    tracing::debug!(
        input_bytes = bytes.len(),
        native_rate = sample_rate,
        frames = samples.len(),
        "Decoded upload to mono PCM"
    );

    let samples = if sample_rate != TARGET_SAMPLE_RATE {
        resample_mono(samples, sample_rate, TARGET_SAMPLE_RATE)?
    } else {
        samples
    };

    Ok(AudioSignal::new(samples, TARGET_SAMPLE_RATE))
}

/// Append a decoded buffer to `out`, averaging all channels to mono.
fn append_mono(decoded: &AudioBufferRef, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::U8(buf) => mix_to_mono(buf.as_ref(), out),
        AudioBufferRef::U16(buf) => mix_to_mono(buf.as_ref(), out),
        AudioBufferRef::U24(buf) => mix_to_mono(buf.as_ref(), out),
        AudioBufferRef::U32(buf) => mix_to_mono(buf.as_ref(), out),
        AudioBufferRef::S8(buf) => mix_to_mono(buf.as_ref(), out),
        AudioBufferRef::S16(buf) => mix_to_mono(buf.as_ref(), out),
        AudioBufferRef::S24(buf) => mix_to_mono(buf.as_ref(), out),
        AudioBufferRef::S32(buf) => mix_to_mono(buf.as_ref(), out),
        AudioBufferRef::F32(buf) => mix_to_mono(buf.as_ref(), out),
        AudioBufferRef::F64(buf) => mix_to_mono(buf.as_ref(), out),
    }
}

fn mix_to_mono<S>(buf: &AudioBuffer<S>, out: &mut Vec<f32>)
where
    S: Sample,
    f32: FromSample<S>,
{
    let num_channels = buf.spec().channels.count();
    let num_frames = buf.frames();
    out.reserve(num_frames);

    for frame_idx in 0..num_frames {
        let mut sum = 0.0f32;
        for ch in 0..num_channels {
            sum += f32::from_sample(buf.chan(ch)[frame_idx]);
        }
        out.push(sum / num_channels as f32);
    }
}

/// Resample a mono signal using sinc interpolation.
///
/// 256-tap filter, 0.95 cutoff, BlackmanHarris2 window; chunk size equal to
/// the input length for single-pass processing.
fn resample_mono(samples: Vec<f32>, source_rate: u32, target_rate: u32) -> Result<Vec<f32>, DecodeError> {
    if samples.is_empty() {
        return Ok(samples);
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let resample_ratio = target_rate as f64 / source_rate as f64;
    let num_frames = samples.len();

    let mut resampler = SincFixedIn::<f32>::new(resample_ratio, 8.0, params, num_frames, 1)
        .map_err(|e| DecodeError::Resample(e.to_string()))?;

    let output = resampler
        .process(&[samples], None)
        .map_err(|e| DecodeError::Resample(e.to_string()))?;

    let mono = output.into_iter().next().unwrap_or_default();

    tracing::debug!(
        source_rate,
        target_rate,
        output_frames = mono.len(),
        "Resampled mono signal"
    );

    Ok(mono)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Render a sine wave to an in-memory WAV container.
    fn wav_bytes(frequency: f32, duration_secs: f32, sample_rate: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            let num_samples = (duration_secs * sample_rate as f32) as usize;
            for i in 0..num_samples {
                let t = i as f32 / sample_rate as f32;
                let sample = (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.5;
                writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn decode_wav_at_target_rate() {
        let bytes = wav_bytes(440.0, 1.0, TARGET_SAMPLE_RATE);
        let signal = decode_audio_bytes(&bytes, Some("wav")).unwrap();

        assert_eq!(signal.sample_rate, TARGET_SAMPLE_RATE);
        assert_eq!(signal.samples.len(), TARGET_SAMPLE_RATE as usize);
        assert!(signal.samples.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn decode_resamples_to_target_rate() {
        let bytes = wav_bytes(440.0, 1.0, 44_100);
        let signal = decode_audio_bytes(&bytes, Some("wav")).unwrap();

        assert_eq!(signal.sample_rate, TARGET_SAMPLE_RATE);

        // Allow ±2% on the frame count for resampler transients
        let expected = TARGET_SAMPLE_RATE as usize;
        let tolerance = expected / 50;
        assert!(
            signal.samples.len() >= expected - tolerance
                && signal.samples.len() <= expected + tolerance,
            "Expected ~{} samples, got {}",
            expected,
            signal.samples.len()
        );
    }

    #[test]
    fn decode_stereo_downmixes_to_mono() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: TARGET_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for _ in 0..TARGET_SAMPLE_RATE {
                writer.write_sample(i16::MAX / 2).unwrap(); // left
                writer.write_sample(-i16::MAX / 2).unwrap(); // right
            }
            writer.finalize().unwrap();
        }
        let signal = decode_audio_bytes(&cursor.into_inner(), Some("wav")).unwrap();

        // Opposed channels cancel when averaged
        assert!(signal.samples.iter().all(|s| s.abs() < 1e-3));
    }

    #[test]
    fn decode_rejects_empty_payload() {
        let err = decode_audio_bytes(&[], None).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyPayload));
    }

    #[test]
    fn decode_rejects_garbage_bytes() {
        let garbage = vec![0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x42, 0x13, 0x37];
        let err = decode_audio_bytes(&garbage, None).unwrap_err();
        assert!(matches!(err, DecodeError::Probe(_)));
    }

    #[test]
    fn resample_empty_input_is_empty() {
        let out = resample_mono(Vec::new(), 44_100, TARGET_SAMPLE_RATE).unwrap();
        assert!(out.is_empty());
    }
}
