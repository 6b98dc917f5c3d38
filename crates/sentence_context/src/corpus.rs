//! src/corpus.rs
//!
//! Resolves a corpus path into an ordered file list and reads one document
//! per file, on demand.
//!
//! The first complete pass over the files also estimates how many sentences
//! can serve as anchors; the estimate is logged once and frozen afterwards.

use crate::document::{Document, DocumentReader};
use crate::transforms::Transform;
use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Lifecycle of [`CorpusStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsState {
    /// Counts are being accumulated by the current pass.
    Counting,
    /// A full pass completed; counts no longer change.
    Finalized,
}

/// Point-in-time copy of the corpus counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub state: StatsState,
    pub files: usize,
    pub sentences: usize,
    /// Sum over documents of `len - 2 * distinct_sections`. A diagnostic
    /// estimate, not the exact number of eligible anchors.
    pub usable_sentences: i64,
}

/// Accumulates corpus counts during the first full pass.
#[derive(Debug, Clone)]
pub struct CorpusStats {
    state: StatsState,
    files: usize,
    sentences: usize,
    usable_sentences: i64,
}

impl Default for CorpusStats {
    fn default() -> Self {
        Self {
            state: StatsState::Counting,
            files: 0,
            sentences: 0,
            usable_sentences: 0,
        }
    }
}

impl CorpusStats {
    pub fn state(&self) -> StatsState {
        self.state
    }

    pub fn is_finalized(&self) -> bool {
        self.state == StatsState::Finalized
    }

    /// Adds one document. Ignored once finalized.
    pub fn record(&mut self, document: &Document) {
        if self.is_finalized() {
            return;
        }
        self.files += 1;
        self.sentences += document.len();
        self.usable_sentences += document.usable_estimate();
    }

    /// Freezes the counts and logs them. Only the first call has an effect.
    pub fn finalize(&mut self) {
        if self.is_finalized() {
            return;
        }
        self.state = StatsState::Finalized;
        info!("loaded {} files.", self.files);
        info!(
            "There are {} sentences available for training.",
            self.usable_sentences
        );
    }

    /// Drops partial counts left by an abandoned pass.
    fn restart(&mut self) {
        if !self.is_finalized() {
            *self = Self::default();
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            state: self.state,
            files: self.files,
            sentences: self.sentences,
            usable_sentences: self.usable_sentences,
        }
    }
}

/// Lists the files a source path stands for: the path itself, or the entries
/// of a directory in lexical order. Directory entries that are not regular
/// files are left out; no extension filtering is applied.
pub fn resolve_source(source: &Path) -> Result<Vec<PathBuf>> {
    if source.is_file() {
        return Ok(vec![source.to_path_buf()]);
    }
    if !source.is_dir() {
        bail!(
            "Corpus source is neither a file nor a directory: {}",
            source.display()
        );
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(source)
        .with_context(|| format!("Failed to list corpus directory: {}", source.display()))?
    {
        let path = entry
            .map_err(|e| anyhow!("Failed to read directory entry: {}", e))?
            .path();
        if path.is_file() {
            files.push(path);
        } else {
            debug!(path = %path.display(), "skipping non-file corpus entry");
        }
    }
    files.sort();
    Ok(files)
}

/// Drives a [`DocumentReader`] over every file of a corpus source.
///
/// # Example
/// ```ignore
/// let mut corpus = CorpusEnumerator::new("corpus/", Lowercase.then(WhitespaceTokenize))?;
/// for document in corpus.documents() {
///     let document = document?;
/// }
/// println!("{:?}", corpus.stats().snapshot());
/// ```
pub struct CorpusEnumerator<P> {
    source: PathBuf,
    files: Vec<PathBuf>,
    reader: DocumentReader<P>,
    limit: Option<usize>,
    stats: CorpusStats,
}

impl<P> CorpusEnumerator<P>
where
    P: Transform<String, Vec<String>>,
{
    /// Resolves `source` right away; fails if it is neither a file nor a
    /// directory.
    pub fn new(source: impl Into<PathBuf>, preprocess: P) -> Result<Self> {
        let source = source.into();
        let files = resolve_source(&source)?;
        Ok(Self {
            source,
            files,
            reader: DocumentReader::new(preprocess),
            limit: None,
            stats: CorpusStats::default(),
        })
    }

    /// Caps the number of files read per pass (`None` reads them all).
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Files one pass will read, after applying the limit.
    pub fn files(&self) -> &[PathBuf] {
        let n = self.limit.map_or(self.files.len(), |l| l.min(self.files.len()));
        &self.files[..n]
    }

    pub fn stats(&self) -> &CorpusStats {
        &self.stats
    }

    /// Starts a new pass over the corpus. Each call re-reads the files.
    pub fn documents(&mut self) -> Documents<'_, P> {
        self.stats.restart();
        let n = self.files().len();
        Documents {
            files: self.files[..n].iter(),
            reader: &self.reader,
            stats: &mut self.stats,
            failed: false,
        }
    }
}

/// One pass over a corpus; yields a [`Document`] per file.
pub struct Documents<'a, P> {
    files: std::slice::Iter<'a, PathBuf>,
    reader: &'a DocumentReader<P>,
    stats: &'a mut CorpusStats,
    failed: bool,
}

impl<P> Iterator for Documents<'_, P>
where
    P: Transform<String, Vec<String>>,
{
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.files.next() {
            Some(path) => {
                let document = self.reader.read_path(path);
                match &document {
                    Ok(document) => self.stats.record(document),
                    Err(_) => self.failed = true,
                }
                Some(document)
            }
            None => {
                self.stats.finalize();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{PositionTriple, Sentence};
    use crate::transforms::WhitespaceTokenize;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_doc(dir: &Path, name: &str, rows: &[&str]) -> Result<PathBuf> {
        let path = dir.join(name);
        let mut file = fs::File::create(&path)?;
        for row in rows {
            writeln!(file, "{}", row)?;
        }
        Ok(path)
    }

    fn body(id: &str, text: &str) -> String {
        format!("{}\tpaper\t\t\t\t\t\t\t\t\t\t{}", id, text)
    }

    #[test]
    fn test_stats_state_transitions() -> Result<()> {
        let doc = Document::from_parts(
            vec![PositionTriple::new(1, 1, 0); 3],
            vec![Sentence::Present(vec!["x".into()]); 3],
        )?;
        let mut stats = CorpusStats::default();
        stats.record(&doc);
        assert_eq!(stats.snapshot().usable_sentences, 1);

        stats.finalize();
        stats.record(&doc);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.state, StatsState::Finalized);
        assert_eq!(snapshot.files, 1);
        assert_eq!(snapshot.sentences, 3);
        Ok(())
    }

    #[test]
    fn test_directory_is_listed_in_lexical_order() -> Result<()> {
        let dir = TempDir::new()?;
        for name in ["b.tsv", "a.tsv", "c.data"] {
            write_doc(dir.path(), name, &[])?;
        }
        fs::create_dir(dir.path().join("nested"))?;

        let files = resolve_source(dir.path())?;
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.tsv", "b.tsv", "c.data"]);
        Ok(())
    }

    #[test]
    fn test_missing_source_is_rejected() {
        assert!(CorpusEnumerator::new("/nonexistent/corpus", WhitespaceTokenize).is_err());
    }

    #[test]
    fn test_stats_freeze_after_first_full_pass() -> Result<()> {
        let dir = TempDir::new()?;
        let header = body("0-1-0-0-0", "Intro");
        let rows: Vec<String> = std::iter::once(header)
            .chain((1..=4).map(|i| body(&format!("0-1-1-{}-0", i), "some text")))
            .collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        write_doc(dir.path(), "a.tsv", &rows)?;
        write_doc(dir.path(), "b.tsv", &rows)?;

        let mut corpus = CorpusEnumerator::new(dir.path(), WhitespaceTokenize)?;

        // An abandoned pass leaves the stats counting
        let first = corpus.documents().next().unwrap()?;
        assert_eq!(first.len(), 4);
        assert!(!corpus.stats().is_finalized());

        let docs: Vec<Document> = corpus.documents().collect::<Result<_>>()?;
        assert_eq!(docs.len(), 2);
        let snapshot = corpus.stats().snapshot();
        assert_eq!(snapshot.state, StatsState::Finalized);
        assert_eq!(snapshot.files, 2);
        assert_eq!(snapshot.usable_sentences, 4);

        // Later passes do not recount
        let _: Vec<Document> = corpus.documents().collect::<Result<_>>()?;
        assert_eq!(corpus.stats().snapshot(), snapshot);
        Ok(())
    }

    #[test]
    fn test_limit_caps_files_per_pass() -> Result<()> {
        let dir = TempDir::new()?;
        for name in ["1.tsv", "2.tsv", "3.tsv"] {
            write_doc(dir.path(), name, &[])?;
        }
        let mut corpus = CorpusEnumerator::new(dir.path(), WhitespaceTokenize)?.with_limit(Some(2));
        assert_eq!(corpus.files().len(), 2);
        assert_eq!(corpus.documents().count(), 2);
        Ok(())
    }

    #[test]
    fn test_read_error_stops_the_pass() -> Result<()> {
        let dir = TempDir::new()?;
        write_doc(dir.path(), "a.tsv", &[&body("0-1-1-1", "bad id")])?;
        write_doc(dir.path(), "b.tsv", &[&body("0-1-1-1-0", "fine")])?;

        let mut corpus = CorpusEnumerator::new(dir.path(), WhitespaceTokenize)?;
        let results: Vec<Result<Document>> = corpus.documents().collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
        assert!(!corpus.stats().is_finalized());
        Ok(())
    }
}
