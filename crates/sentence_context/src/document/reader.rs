use super::{Document, PositionTriple, SectionType, Sentence, SentenceId};
use crate::dataset::DataSource;
use crate::readers::{TsvRecord, TsvSource};
use crate::transforms::Transform;
use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Numbered headings such as `2.1 Methods` or `[3] Results`.
static NUMBERED_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9.,{}\[]+\]* ").expect("static heading pattern is valid")
});

/// How a single row is treated while rebuilding a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Paper title row; skipped.
    MainTitle,
    /// References or acknowledgements; nothing after it is read.
    AppendixStart,
    /// Footnotes and captions; skipped.
    NonContent,
    /// Opens a new section.
    Header,
    /// A body sentence.
    Content,
}

impl RecordKind {
    pub fn classify(id: &SentenceId, section_type: &SectionType) -> Self {
        if id.is_main_title() {
            Self::MainTitle
        } else if section_type.starts_appendix() {
            Self::AppendixStart
        } else if section_type.is_non_content() {
            Self::NonContent
        } else if id.is_header() {
            Self::Header
        } else {
            Self::Content
        }
    }
}

/// Strips a leading section number from a heading: `"2.1 Methods"` becomes
/// `"Methods"`, an unnumbered heading is kept as is.
pub fn section_title(content: &str) -> &str {
    if NUMBERED_TITLE.is_match(content) {
        match content.find(' ') {
            Some(pos) => &content[pos + 1..],
            None => content,
        }
    } else {
        content
    }
}

/// Rebuilds [`Document`]s from tagged rows.
///
/// The reader walks the rows once, keeping section/paragraph/sentence
/// counters, and hands every non-empty body sentence to its preprocessor
/// `P` (any `Transform<String, Vec<String>>`, e.g.
/// `Lowercase.then(WhitespaceTokenize)`).
///
/// # Example
/// ```ignore
/// let reader = DocumentReader::new(Lowercase.then(WhitespaceTokenize));
/// let document = reader.read_path("corpus/paper_0001.tsv")?;
/// println!("{} sentences in {} sections", document.len(), document.section_count());
/// ```
pub struct DocumentReader<P> {
    preprocess: P,
}

impl<P> DocumentReader<P>
where
    P: Transform<String, Vec<String>>,
{
    pub fn new(preprocess: P) -> Self {
        Self { preprocess }
    }

    /// Reads one TSV document from disk.
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<Document> {
        let path = path.as_ref();
        self.read(&TsvSource::new(path))
            .with_context(|| format!("Failed to read document {}", path.display()))
    }

    /// Reads one document from any row source.
    ///
    /// # Errors
    /// - A sentence id without exactly five components.
    /// - A non-numeric paragraph component in a body row.
    /// - Row-level I/O errors and preprocessing failures.
    pub fn read(&self, source: &dyn DataSource<TsvRecord>) -> Result<Document> {
        let mut document = Document::new();
        let mut section = 0usize;
        let mut paragraph = 0usize;
        let mut sentence = 0usize;

        for record in source.stream()? {
            let record = record?;
            let id = SentenceId::parse(&record.sentence_id)?;
            let section_type = SectionType::from_tag(record.section_type.as_deref());

            match RecordKind::classify(&id, &section_type) {
                RecordKind::MainTitle | RecordKind::NonContent => continue,
                RecordKind::AppendixStart => break,
                RecordKind::Header => {
                    let title = record.content.as_deref().map(section_title).unwrap_or_default();
                    document.push_section_title(title.to_string());
                    section += 1;
                    paragraph = 0;
                    sentence = 0;
                }
                RecordKind::Content => {
                    paragraph = id.paragraph()?;
                    let position = PositionTriple::new(section, paragraph, sentence);
                    let value = match record.content {
                        Some(text) => Sentence::Present(
                            self.preprocess
                                .apply(text)
                                .with_context(|| format!("Failed to preprocess sentence {}", id))?,
                        ),
                        None => Sentence::Absent,
                    };
                    document.push(position, value);
                    sentence += 1;
                }
            }
        }
        Ok(document)
    }
}
