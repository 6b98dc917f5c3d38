//! Hierarchical view of one corpus document.
//!
//! A document is rebuilt from a flat stream of tagged rows into an ordered
//! list of `(PositionTriple, Sentence)` pairs. Section indices never
//! decrease along the list and grow by one at every header row.

pub mod reader;

pub use reader::{DocumentReader, RecordKind};

use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use std::fmt;

/// Number of dash-separated components in a sentence id.
pub const SENTENCE_ID_PARTS: usize = 5;

/// A parsed `"{main}-{section}-{paragraph}-{local1}-{local2}"` identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceId {
    parts: [String; SENTENCE_ID_PARTS],
}

impl SentenceId {
    /// Splits `raw` on `-`. Anything other than exactly five components is
    /// malformed input and returns an error.
    pub fn parse(raw: &str) -> Result<Self> {
        let pieces: Vec<&str> = raw.split('-').collect();
        if pieces.len() != SENTENCE_ID_PARTS {
            bail!(
                "Malformed sentence id '{}': expected {} dash-separated components, got {}",
                raw,
                SENTENCE_ID_PARTS,
                pieces.len()
            );
        }
        Ok(Self {
            parts: std::array::from_fn(|i| pieces[i].to_string()),
        })
    }

    pub fn parts(&self) -> &[String; SENTENCE_ID_PARTS] {
        &self.parts
    }

    /// Main-title rows carry `"0"` in the second component.
    pub fn is_main_title(&self) -> bool {
        self.parts[1] == "0"
    }

    /// Header rows have their last three components concatenating to `"000"`.
    pub fn is_header(&self) -> bool {
        self.parts[2..].concat() == "000"
    }

    /// Paragraph ordinal. The corpus tooling numbers paragraphs in the fourth
    /// component.
    pub fn paragraph(&self) -> Result<usize> {
        self.parts[3]
            .parse()
            .with_context(|| format!("Non-numeric paragraph component in sentence id '{}'", self))
    }
}

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join("-"))
    }
}

/// The `sectionType` tag of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionType {
    ReferenceHeader,
    AcknowledgementHeader,
    Footnote,
    Caption,
    Other(String),
    Untagged,
}

impl SectionType {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            None => Self::Untagged,
            Some("ReferenceHeader") => Self::ReferenceHeader,
            Some("AcknowledgementHeader") => Self::AcknowledgementHeader,
            Some("Footnote") => Self::Footnote,
            Some("Caption") => Self::Caption,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// References and acknowledgements close the body of a paper.
    pub fn starts_appendix(&self) -> bool {
        matches!(self, Self::ReferenceHeader | Self::AcknowledgementHeader)
    }

    pub fn is_non_content(&self) -> bool {
        matches!(self, Self::Footnote | Self::Caption)
    }
}

/// `(section, paragraph, sentence)` position of a sentence in its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PositionTriple {
    pub section: usize,
    pub paragraph: usize,
    pub sentence: usize,
}

impl PositionTriple {
    pub fn new(section: usize, paragraph: usize, sentence: usize) -> Self {
        Self {
            section,
            paragraph,
            sentence,
        }
    }
}

/// A preprocessed sentence, or the marker for a row whose content was empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sentence {
    Present(Vec<String>),
    Absent,
}

impl Sentence {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn tokens(&self) -> Option<&[String]> {
        match self {
            Self::Present(tokens) => Some(tokens),
            Self::Absent => None,
        }
    }
}

impl From<Vec<String>> for Sentence {
    fn from(tokens: Vec<String>) -> Self {
        Self::Present(tokens)
    }
}

/// One reconstructed document: parallel lists of positions and sentences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    triples: Vec<PositionTriple>,
    sentences: Vec<Sentence>,
    section_titles: Vec<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from ready-made parallel lists.
    pub fn from_parts(triples: Vec<PositionTriple>, sentences: Vec<Sentence>) -> Result<Self> {
        if triples.len() != sentences.len() {
            bail!(
                "Position list ({}) and sentence list ({}) differ in length",
                triples.len(),
                sentences.len()
            );
        }
        if let Some(w) = triples.windows(2).find(|w| w[1].section < w[0].section) {
            bail!(
                "Section index decreases from {} to {}",
                w[0].section,
                w[1].section
            );
        }
        Ok(Self {
            triples,
            sentences,
            section_titles: Vec::new(),
        })
    }

    pub(crate) fn push(&mut self, triple: PositionTriple, sentence: Sentence) {
        self.triples.push(triple);
        self.sentences.push(sentence);
    }

    pub(crate) fn push_section_title(&mut self, title: String) {
        self.section_titles.push(title);
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn triples(&self) -> &[PositionTriple] {
        &self.triples
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn section_titles(&self) -> &[String] {
        &self.section_titles
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PositionTriple, &Sentence)> {
        self.triples.iter().zip(self.sentences.iter())
    }

    /// Number of distinct section indices among the sentences.
    pub fn section_count(&self) -> usize {
        self.triples
            .iter()
            .map(|t| t.section)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Rough count of positions usable as anchors: every section loses its
    /// first and last sentence. Can be negative for one-sentence sections.
    pub fn usable_estimate(&self) -> i64 {
        self.len() as i64 - 2 * self.section_count() as i64
    }

    pub fn into_parts(self) -> (Vec<PositionTriple>, Vec<Sentence>) {
        (self.triples, self.sentences)
    }
}
