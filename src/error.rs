use std::path::PathBuf;

/// Errors surfaced by corpus preparation.
///
/// Out-of-vocabulary words are not represented here: utterances containing
/// them are silently filtered from batch results, which is a policy rather
/// than a failure.
#[derive(thiserror::Error, Debug)]
pub enum PrepError {
    #[error("malformed corpus layout at {path}: {reason}")]
    Structure { path: PathBuf, reason: String },
    #[error("no transcript file in chapter {chapter}")]
    MissingTranscript { chapter: PathBuf },
    #[error("multiple transcript files in chapter {chapter}")]
    AmbiguousTranscript { chapter: PathBuf },
    #[error("audio conversion failed for {path}: {reason}")]
    Conversion { path: PathBuf, reason: String },
    #[error("empty waveform")]
    EmptyWaveform,
    #[error("unsupported sample format in {path}: {detail}")]
    SampleFormat { path: PathBuf, detail: String },
    #[error("malformed dictionary line {line}: {text:?}")]
    Dict { line: usize, text: String },
    #[error("dictionary entry for {word:?} uses phoneme {symbol:?} not in the phoneme table")]
    UnknownPhoneme { word: String, symbol: String },
    #[error("phoneme index {index} out of range (table has {len} symbols)")]
    BadPhonemeIndex { index: usize, len: usize },
    #[error("WAV error")]
    Wav(#[from] hound::Error),
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
