//! Waveform reading for feature extraction.
//!
//! Corpus audio arrives as WAV (natively or after format conversion). This
//! module reads a WAV file into the mono f32 waveform the MFCC pipeline
//! consumes.

use std::path::Path;

use crate::error::PrepError;

/// Read a WAV file into mono f32 samples plus its sample rate.
///
/// Accepts 16-bit integer or 32-bit float PCM at any sample rate.
/// Multi-channel audio is downmixed to mono by averaging channels.
/// Integer samples are normalized to the range [-1.0, 1.0].
///
/// # Errors
///
/// Returns an error if the file cannot be opened, is not a WAV container,
/// or uses a sample format other than the two accepted above.
pub fn read_samples(wav_path: &Path) -> Result<(Vec<f32>, u32), PrepError> {
    let mut reader = hound::WavReader::open(wav_path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|sample| sample.map(|s| s as f32 / i16::MAX as f32))
            .collect::<Result<_, _>>()?,
        (hound::SampleFormat::Float, 32) => {
            reader.samples::<f32>().collect::<Result<_, _>>()?
        }
        (format, bits) => {
            return Err(PrepError::SampleFormat {
                path: wav_path.to_path_buf(),
                detail: format!("{:?} at {} bits per sample", format, bits),
            })
        }
    };

    let channels = spec.channels as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    log::debug!(
        "read {} samples at {} Hz from {}",
        samples.len(),
        spec.sample_rate,
        wav_path.display()
    );

    Ok((samples, spec.sample_rate))
}
