//! Corpus directory indexing.
//!
//! A corpus is laid out two levels deep: author directories at the root, each
//! holding chapter directories with transcript and audio files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PrepError;

/// Immutable index of authors and their chapters, built once when the
/// corpus root is scanned.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    root: PathBuf,
    authors: Vec<String>,
    chapters: Vec<Vec<String>>,
}

impl CorpusIndex {
    /// Scan a corpus root.
    ///
    /// Immediate subdirectories of `root` are authors; each author's
    /// immediate subdirectories are chapters. Authors and chapters are
    /// sorted by name so iteration order does not depend on the
    /// filesystem. A root that is missing or holds no author directories
    /// is a setup error, not a runtime condition.
    pub fn scan(root: &Path) -> Result<Self, PrepError> {
        if !root.is_dir() {
            return Err(PrepError::Structure {
                path: root.to_path_buf(),
                reason: "corpus root is not a directory".to_string(),
            });
        }

        let authors = subdirectories(root)?;
        if authors.is_empty() {
            return Err(PrepError::Structure {
                path: root.to_path_buf(),
                reason: "corpus root contains no author directories".to_string(),
            });
        }

        let mut chapters = Vec::with_capacity(authors.len());
        for author in &authors {
            chapters.push(subdirectories(&root.join(author))?);
        }

        log::info!(
            "indexed corpus at {}: {} authors, {} chapters",
            root.display(),
            authors.len(),
            chapters.iter().map(Vec::len).sum::<usize>()
        );

        Ok(Self {
            root: root.to_path_buf(),
            authors,
            chapters,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn author_count(&self) -> usize {
        self.authors.len()
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Chapter names for the author at `index`.
    pub fn chapters(&self, index: usize) -> &[String] {
        &self.chapters[index]
    }

    /// Absolute path of one chapter directory.
    pub fn chapter_path(&self, author_index: usize, chapter: &str) -> PathBuf {
        self.root.join(&self.authors[author_index]).join(chapter)
    }
}

fn subdirectories(path: &Path) -> Result<Vec<String>, PrepError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
