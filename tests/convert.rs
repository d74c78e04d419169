use std::error::Error;
use std::fs;
use std::path::Path;

use audioprep_rs::audio::read_samples;
use audioprep_rs::convert::{FormatConverter, SymphoniaConverter};
use audioprep_rs::PrepError;

fn write_wav(path: &Path, len: usize) -> Result<(), Box<dyn Error>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for i in 0..len {
        let t = i as f32 / 16_000.0;
        let sample = (2.0 * std::f32::consts::PI * 440.0 * t).sin();
        writer.write_sample((sample * 0.5 * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

#[test]
fn convert_dir_writes_sibling_files_and_keeps_originals() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempfile::tempdir()?;
    write_wav(&temp_dir.path().join("utt1.wav"), 8_000)?;
    write_wav(&temp_dir.path().join("utt2.wav"), 4_000)?;

    let written = SymphoniaConverter.convert_dir(temp_dir.path(), "wav", "cnv")?;
    assert_eq!(written, 2);

    for name in ["utt1", "utt2"] {
        assert!(temp_dir.path().join(format!("{name}.wav")).exists());
        assert!(temp_dir.path().join(format!("{name}.cnv")).exists());
    }

    // Converted output is a WAV container with the source rate and length.
    let (original, _) = read_samples(&temp_dir.path().join("utt1.wav"))?;
    let (converted, rate) = read_samples(&temp_dir.path().join("utt1.cnv"))?;
    assert_eq!(rate, 16_000);
    assert_eq!(converted.len(), original.len());
    for (a, b) in original.iter().zip(&converted) {
        assert!((a - b).abs() < 1e-3);
    }
    Ok(())
}

#[test]
fn convert_dir_ignores_other_extensions() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempfile::tempdir()?;
    write_wav(&temp_dir.path().join("utt1.wav"), 1_000)?;
    fs::write(temp_dir.path().join("notes.txt"), "utt1 cat\n")?;

    let written = SymphoniaConverter.convert_dir(temp_dir.path(), "flac", "wav")?;
    assert_eq!(written, 0, "no flac files present");
    Ok(())
}

#[test]
fn corrupt_source_is_a_conversion_error() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempfile::tempdir()?;
    fs::write(temp_dir.path().join("broken.flac"), b"not audio at all")?;

    let err = SymphoniaConverter
        .convert_dir(temp_dir.path(), "flac", "wav")
        .unwrap_err();
    assert!(matches!(err, PrepError::Conversion { .. }));
    Ok(())
}
