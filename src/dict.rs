//! Pronunciation dictionary and phoneme index table.
//!
//! A dictionary maps words to phoneme expansions; by convention every entry
//! carries a trailing silence marker, which the transcript decoder relies on
//! when it drops the final symbol of an utterance. A small dictionary and its
//! phoneme table are bundled into the binary; callers working with a larger
//! lexicon point at their own files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::error::PrepError;

const BUNDLED_DICT: &str = include_str!("../resources/dict.txt");
const BUNDLED_PHONEMES: &str = include_str!("../resources/phonemes.txt");

static DEFAULT_DICT: Lazy<HashMap<String, Vec<String>>> = Lazy::new(|| {
    // The bundled file is checked at build time via include_str!, so a parse
    // failure here is a packaging bug.
    parse_dict(BUNDLED_DICT).expect("bundled dictionary is well-formed")
});

static DEFAULT_PHONEMES: Lazy<Vec<String>> = Lazy::new(|| parse_phonemes(BUNDLED_PHONEMES));

/// Immutable word-to-phonemes mapping, loaded once at startup.
#[derive(Debug, Clone)]
pub struct PhonemeDict {
    entries: HashMap<String, Vec<String>>,
}

impl PhonemeDict {
    /// Load a dictionary and the phoneme table it is written against.
    ///
    /// Either path falls back to the bundled resource when omitted. Every
    /// phoneme in the dictionary must appear in the table; a symbol the
    /// table does not know is a setup error, caught here rather than deep
    /// inside a batch call.
    pub fn load(
        dict_path: Option<&Path>,
        phonemes_path: Option<&Path>,
    ) -> Result<Self, PrepError> {
        let entries = match dict_path {
            Some(path) => parse_dict(&fs::read_to_string(path)?)?,
            None => DEFAULT_DICT.clone(),
        };

        let table: Vec<String>;
        let symbols: &[String] = match phonemes_path {
            Some(path) => {
                table = parse_phonemes(&fs::read_to_string(path)?);
                &table
            }
            None => &DEFAULT_PHONEMES,
        };
        for (word, phonemes) in &entries {
            for symbol in phonemes {
                if !symbols.contains(symbol) {
                    return Err(PrepError::UnknownPhoneme {
                        word: word.clone(),
                        symbol: symbol.clone(),
                    });
                }
            }
        }

        log::info!(
            "loaded pronunciation dictionary with {} entries over {} phonemes",
            entries.len(),
            symbols.len()
        );
        Ok(Self { entries })
    }

    /// Build a dictionary directly from word/expansion pairs.
    pub fn from_entries<I, W, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (W, Vec<P>)>,
        W: Into<String>,
        P: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(w, ps)| (w.into(), ps.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }

    /// Phoneme expansion for a word, or `None` if the word is out of
    /// vocabulary. Lookup is exact-match.
    pub fn expand(&self, word: &str) -> Option<&[String]> {
        self.entries.get(word).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Translate phoneme indices back into symbols.
///
/// The phoneme table has one symbol per line; the line number is the index.
/// Falls back to the bundled table when no path is given. This is a
/// standalone utility, independent of any batcher instance.
pub fn decode_phoneme_indexes(
    indexes: &[usize],
    phonemes_path: Option<&Path>,
) -> Result<Vec<String>, PrepError> {
    let table: Vec<String>;
    let symbols: &[String] = match phonemes_path {
        Some(path) => {
            table = parse_phonemes(&fs::read_to_string(path)?);
            &table
        }
        None => &DEFAULT_PHONEMES,
    };

    indexes
        .iter()
        .map(|&index| {
            symbols
                .get(index)
                .cloned()
                .ok_or(PrepError::BadPhonemeIndex {
                    index,
                    len: symbols.len(),
                })
        })
        .collect()
}

fn parse_dict(content: &str) -> Result<HashMap<String, Vec<String>>, PrepError> {
    let mut entries = HashMap::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let word = tokens.next().unwrap_or_default();
        let phonemes: Vec<String> = tokens.map(str::to_string).collect();
        if phonemes.is_empty() {
            return Err(PrepError::Dict {
                line: line_no + 1,
                text: line.to_string(),
            });
        }
        entries.insert(word.to_string(), phonemes);
    }
    Ok(entries)
}

fn parse_phonemes(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
