//! Audio format conversion.
//!
//! The batcher needs each chapter's audio in one target format; when that
//! format is absent it asks a [`FormatConverter`] to produce it. The default
//! converter decodes through symphonia and writes 16-bit PCM WAV, but the
//! trait keeps the capability swappable (and mockable in tests).

use std::fs::{self, File};
use std::path::Path;

use symphonia::core::{
    audio::SampleBuffer,
    codecs::{DecoderOptions, CODEC_TYPE_NULL},
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};

use crate::error::PrepError;

/// Converts every audio file of one format in a directory to another format.
pub trait FormatConverter {
    /// Convert all `*.origin_ext` files in `dir`, writing sibling files with
    /// the same base name and the `target_ext` extension. Originals are
    /// preserved. Returns the number of files written.
    ///
    /// A corrupt or unsupported source file is a hard error; there is no
    /// partial-conversion recovery.
    fn convert_dir(&self, dir: &Path, origin_ext: &str, target_ext: &str)
        -> Result<usize, PrepError>;
}

/// Default converter: symphonia decode (FLAC and WAV enabled), hound encode.
///
/// Output preserves the source sample rate and channel count, quantized to
/// 16-bit integer PCM in a WAV container regardless of the target extension
/// name.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaConverter;

impl FormatConverter for SymphoniaConverter {
    fn convert_dir(
        &self,
        dir: &Path,
        origin_ext: &str,
        target_ext: &str,
    ) -> Result<usize, PrepError> {
        let mut written = 0;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(origin_ext) {
                continue;
            }
            let target = path.with_extension(target_ext);
            convert_file(&path, &target)?;
            written += 1;
        }
        log::info!(
            "converted {} {} file(s) to {} in {}",
            written,
            origin_ext,
            target_ext,
            dir.display()
        );
        Ok(written)
    }
}

fn convert_file(source: &Path, target: &Path) -> Result<(), PrepError> {
    let conversion_error = |reason: String| PrepError::Conversion {
        path: source.to_path_buf(),
        reason,
    };

    let (samples, sample_rate, channels) =
        decode_interleaved(source).map_err(|e| conversion_error(e.to_string()))?;

    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(target, spec)?;
    for sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Decode a whole file to interleaved f32 samples plus its stream spec.
fn decode_interleaved(path: &Path) -> Result<(Vec<f32>, u32, u16), Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or("no supported audio track")?;
    let track_id = track.id;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut interleaved: Vec<f32> = Vec::new();
    let mut sample_rate: Option<u32> = track.codec_params.sample_rate;
    let mut channels: Option<u16> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(_)) => break, // end of file
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        sample_rate.get_or_insert(decoded.spec().rate);
        channels.get_or_insert(decoded.spec().channels.count() as u16);

        let mut sbuf = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        sbuf.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(sbuf.samples());
    }

    if interleaved.is_empty() {
        return Err("decoded audio was empty".into());
    }

    Ok((
        interleaved,
        sample_rate.ok_or("could not determine sample rate")?,
        channels.ok_or("could not determine channel count")?,
    ))
}
