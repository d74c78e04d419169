pub mod audio;
pub mod batch;
pub mod convert;
pub mod corpus;
pub mod dict;
pub mod error;
pub mod features;
pub mod transcript;

use std::collections::HashMap;

use ndarray::Array2;

pub use batch::CorpusBatcher;
pub use dict::{decode_phoneme_indexes, PhonemeDict};
pub use error::PrepError;
pub use features::MfccParams;

/// One utterance ready for training: its phoneme transcription and its
/// scaled MFCC feature matrix (frames x cepstral coefficients, values
/// in [-1, 1]).
#[derive(Debug, Clone)]
pub struct PreparedUtterance {
    pub phonemes: Vec<String>,
    pub features: Array2<f32>,
}

/// One author's worth of prepared utterances, keyed by utterance id.
pub type Batch = HashMap<String, PreparedUtterance>;
