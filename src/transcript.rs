//! Transcript parsing and phoneme decoding.

use std::collections::HashMap;

use crate::dict::PhonemeDict;

/// Parse raw transcript lines into utterance-id/text pairs.
///
/// Each line is `<utteranceID> <text>`, split at the first space. Lines
/// without a space carry no text and are skipped.
pub fn parse_lines<'a, I>(lines: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let line = line.trim_end_matches(['\r', '\n']);
            line.split_once(' ')
                .map(|(id, text)| (id.to_string(), text.to_string()))
        })
        .collect()
}

/// Map transcripts to phoneme sequences via the dictionary.
///
/// Words are looked up in written order and their expansions concatenated,
/// after which the final symbol is dropped: every dictionary entry ends in a
/// trailing silence marker, so the concatenation always ends in one. This
/// leans on the dictionary convention and would break silently with a
/// dictionary that omits the marker.
///
/// An utterance containing any out-of-vocabulary word is excluded from the
/// result entirely. That is a filtering policy, not an error: corpora
/// routinely contain words the lexicon does not cover.
pub fn decode(
    transcripts: &HashMap<String, String>,
    dict: &PhonemeDict,
) -> HashMap<String, Vec<String>> {
    let mut decoded = HashMap::new();

    for (id, text) in transcripts {
        if let Some(phonemes) = expand_utterance(text, dict) {
            decoded.insert(id.clone(), phonemes);
        } else {
            log::debug!("dropping utterance {id}: out-of-vocabulary word");
        }
    }

    decoded
}

fn expand_utterance(text: &str, dict: &PhonemeDict) -> Option<Vec<String>> {
    let mut phrase = Vec::new();
    for word in text.split_whitespace() {
        phrase.extend_from_slice(dict.expand(word)?);
    }
    phrase.pop();
    if phrase.is_empty() {
        None
    } else {
        Some(phrase)
    }
}
