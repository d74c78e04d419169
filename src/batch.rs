//! Per-author batch assembly.
//!
//! [`CorpusBatcher`] walks the corpus one author at a time: it gathers every
//! chapter's transcripts and audio, extracts and scales MFCC features,
//! decodes transcripts to phonemes, and joins the two by utterance id. The
//! cursor wraps after the last author, so batches cycle forever; callers
//! track epochs through [`CorpusBatcher::author_count`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::audio;
use crate::convert::{FormatConverter, SymphoniaConverter};
use crate::corpus::CorpusIndex;
use crate::dict::PhonemeDict;
use crate::error::PrepError;
use crate::features::{self, MfccParams};
use crate::transcript;
use crate::{Batch, PreparedUtterance};

pub const DEFAULT_ORIGIN_FORMAT: &str = "flac";
pub const DEFAULT_TARGET_FORMAT: &str = "wav";

/// Stateful batch producer over an indexed corpus.
///
/// The cursor is exclusive mutable state of one batcher instance; nothing
/// here is synchronized. Callers that want concurrent preparation run one
/// batcher per worker.
#[derive(Debug)]
pub struct CorpusBatcher<C: FormatConverter = SymphoniaConverter> {
    index: CorpusIndex,
    cursor: isize,
    params: MfccParams,
    dict: PhonemeDict,
    converter: C,
    origin_format: String,
    target_format: Option<String>,
}

impl CorpusBatcher<SymphoniaConverter> {
    /// Index the corpus at `root` with the bundled dictionary, default MFCC
    /// parameters, and the symphonia-backed converter.
    pub fn new(root: &Path) -> Result<Self, PrepError> {
        Self::with_converter(root, SymphoniaConverter)
    }
}

impl<C: FormatConverter> CorpusBatcher<C> {
    /// Index the corpus at `root` using a caller-supplied converter.
    pub fn with_converter(root: &Path, converter: C) -> Result<Self, PrepError> {
        Ok(Self {
            index: CorpusIndex::scan(root)?,
            cursor: -1,
            params: MfccParams::default(),
            dict: PhonemeDict::load(None, None)?,
            converter,
            origin_format: DEFAULT_ORIGIN_FORMAT.to_string(),
            target_format: None,
        })
    }

    /// Replace the default MFCC parameters.
    pub fn set_mfcc_params(&mut self, params: MfccParams) {
        self.params = params;
    }

    /// Replace the bundled dictionary.
    pub fn set_dict(&mut self, dict: PhonemeDict) {
        self.dict = dict;
    }

    /// Set the (origin, target) format pair used when a chapter is missing
    /// audio in the requested format. When unset, conversion writes the
    /// requested format directly.
    pub fn set_conversion_formats(&mut self, origin: &str, target: &str) {
        self.origin_format = origin.to_string();
        self.target_format = Some(target.to_string());
    }

    /// Total number of authors; one full cycle of batches covers each author
    /// exactly once.
    pub fn author_count(&self) -> usize {
        self.index.author_count()
    }

    /// Produce the next author's batch, requesting WAV audio. The
    /// configured conversion pair does not change this default; use
    /// [`CorpusBatcher::next_batch_as`] to read another format.
    pub fn next_batch(&mut self) -> Result<Batch, PrepError> {
        self.next_batch_as(DEFAULT_TARGET_FORMAT)
    }

    /// Produce the next author's batch, reading audio files with the given
    /// extension. Chapters lacking that format are converted from the
    /// configured origin format first.
    pub fn next_batch_as(&mut self, format: &str) -> Result<Batch, PrepError> {
        self.cursor += 1;
        let author_index = self.cursor as usize;

        let result = self.assemble(author_index, format);

        // Wrap after the last author so the next call restarts the cycle.
        if self.cursor >= self.index.author_count() as isize - 1 {
            self.cursor = -1;
        }

        result
    }

    /// Infinite, cyclic stream of batches.
    pub fn batches(&mut self) -> Batches<'_, C> {
        Batches { batcher: self }
    }

    fn assemble(&self, author_index: usize, format: &str) -> Result<Batch, PrepError> {
        let author = &self.index.authors()[author_index];
        log::debug!("assembling batch for author {author}");

        let mut transcripts: HashMap<String, String> = HashMap::new();
        let mut waveforms: HashMap<String, (Vec<f32>, u32)> = HashMap::new();

        for chapter in self.index.chapters(author_index) {
            let chapter_path = self.index.chapter_path(author_index, chapter);

            let transcript_file = find_transcript(&chapter_path)?;
            let content = fs::read_to_string(&transcript_file)?;
            transcripts.extend(transcript::parse_lines(content.lines()));

            let mut audio_files = files_with_extension(&chapter_path, format)?;
            if audio_files.is_empty() {
                let target = self.target_format.as_deref().unwrap_or(format);
                self.converter
                    .convert_dir(&chapter_path, &self.origin_format, target)?;
                audio_files = files_with_extension(&chapter_path, format)?;
            }

            for file in audio_files {
                let key = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                waveforms.insert(key, audio::read_samples(&file)?);
            }
        }

        let phoneme_map = transcript::decode(&transcripts, &self.dict);

        // Join on utterance id: only utterances with both a phoneme sequence
        // and a feature matrix make it into the batch.
        let mut batch = Batch::new();
        for (key, (samples, sample_rate)) in &waveforms {
            let Some(phonemes) = phoneme_map.get(key) else {
                continue;
            };
            let mut matrix = features::mfcc(samples, *sample_rate, &self.params)?;
            features::minmax_scale(&mut matrix);
            batch.insert(
                key.clone(),
                PreparedUtterance {
                    phonemes: phonemes.clone(),
                    features: matrix,
                },
            );
        }

        log::info!(
            "author {author}: {} utterances prepared ({} transcribed, {} audio files)",
            batch.len(),
            phoneme_map.len(),
            waveforms.len()
        );

        Ok(batch)
    }
}

/// Infinite iterator over batches; see [`CorpusBatcher::batches`].
pub struct Batches<'a, C: FormatConverter> {
    batcher: &'a mut CorpusBatcher<C>,
}

impl<C: FormatConverter> Iterator for Batches<'_, C> {
    type Item = Result<Batch, PrepError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.batcher.next_batch())
    }
}

/// The single transcript file of a chapter; zero or several is a layout
/// error for the current batch call.
fn find_transcript(chapter: &Path) -> Result<PathBuf, PrepError> {
    let mut found = files_with_extension(chapter, "txt")?;
    match found.len() {
        1 => Ok(found.remove(0)),
        0 => Err(PrepError::MissingTranscript {
            chapter: chapter.to_path_buf(),
        }),
        _ => Err(PrepError::AmbiguousTranscript {
            chapter: chapter.to_path_buf(),
        }),
    }
}

fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, PrepError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(ext) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
