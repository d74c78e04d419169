use std::error::Error;
use std::io::Write;

use audioprep_rs::{decode_phoneme_indexes, PhonemeDict, PrepError};

#[test]
fn bundled_dictionary_loads_with_trailing_markers() -> Result<(), Box<dyn Error>> {
    let dict = PhonemeDict::load(None, None)?;

    assert!(!dict.is_empty());
    let cat = dict.expand("cat").expect("bundled dictionary knows 'cat'");
    assert_eq!(cat, ["K", "AE", "T", "sil"]);
    assert_eq!(cat.last().map(String::as_str), Some("sil"));

    assert!(dict.expand("zyxwv").is_none());
    Ok(())
}

#[test]
fn custom_dictionary_file_overrides_bundle() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempfile::tempdir()?;
    let dict_path = temp_dir.path().join("tiny.dict");
    let mut file = std::fs::File::create(&dict_path)?;
    writeln!(file, "# comment line")?;
    writeln!(file, "hi HH AY sil")?;

    let dict = PhonemeDict::load(Some(&dict_path), None)?;
    assert_eq!(dict.len(), 1);
    assert_eq!(dict.expand("hi").unwrap(), ["HH", "AY", "sil"]);
    assert!(dict.expand("cat").is_none(), "bundle is not merged in");
    Ok(())
}

#[test]
fn custom_phoneme_table_validates_dictionary() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempfile::tempdir()?;
    let dict_path = temp_dir.path().join("tiny.dict");
    let phonemes_path = temp_dir.path().join("phonemes.txt");
    std::fs::write(&dict_path, "cat K AE T sil\n")?;
    std::fs::write(&phonemes_path, "sil\nK\nAE\nT\n")?;

    let dict = PhonemeDict::load(Some(&dict_path), Some(&phonemes_path))?;
    assert_eq!(dict.expand("cat").unwrap(), ["K", "AE", "T", "sil"]);
    Ok(())
}

#[test]
fn dictionary_phoneme_missing_from_table_is_an_error() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempfile::tempdir()?;
    let dict_path = temp_dir.path().join("tiny.dict");
    let phonemes_path = temp_dir.path().join("phonemes.txt");
    // "T" is absent from the table.
    std::fs::write(&dict_path, "cat K AE T sil\n")?;
    std::fs::write(&phonemes_path, "sil\nK\nAE\n")?;

    let err = PhonemeDict::load(Some(&dict_path), Some(&phonemes_path)).unwrap_err();
    match err {
        PrepError::UnknownPhoneme { word, symbol } => {
            assert_eq!(word, "cat");
            assert_eq!(symbol, "T");
        }
        other => panic!("expected unknown-phoneme error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn dictionary_rejects_entry_without_phonemes() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempfile::tempdir()?;
    let dict_path = temp_dir.path().join("broken.dict");
    std::fs::write(&dict_path, "wordwithoutphonemes\n")?;

    let err = PhonemeDict::load(Some(&dict_path), None).unwrap_err();
    assert!(matches!(err, PrepError::Dict { line: 1, .. }));
    Ok(())
}

#[test]
fn decode_indexes_against_bundled_table() -> Result<(), Box<dyn Error>> {
    // Line 0 of the bundled table is the silence marker.
    let symbols = decode_phoneme_indexes(&[0], None)?;
    assert_eq!(symbols, ["sil"]);
    Ok(())
}

#[test]
fn decode_indexes_against_custom_table() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempfile::tempdir()?;
    let phonemes_path = temp_dir.path().join("phonemes.txt");
    std::fs::write(&phonemes_path, "sil\nK\nAE\nT\n")?;

    let symbols = decode_phoneme_indexes(&[1, 2, 3], Some(&phonemes_path))?;
    assert_eq!(symbols, ["K", "AE", "T"]);

    let err = decode_phoneme_indexes(&[9], Some(&phonemes_path)).unwrap_err();
    assert!(matches!(err, PrepError::BadPhonemeIndex { index: 9, len: 4 }));
    Ok(())
}
