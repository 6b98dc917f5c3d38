//! src/windowed.rs
//!
//! Windowed contrastive sampling over reconstructed documents.
//!
//! For every position `t` of a document the sampler decides whether `t` can
//! anchor a training example:
//! 1. `t` is not the first sentence of its section,
//! 2. `t` is not the last sentence of the document,
//! 3. `t` is not the last sentence of its section,
//! 4. none of `t - 1`, `t`, `t + 1` is `Absent`.
//!
//! An eligible anchor gets its predecessor and successor as positives and
//! `n_negative` sentences drawn without replacement from outside the window
//! `[t - 1, t + 1]` as negatives. Examples accumulate across documents and
//! a [`MiniBatch`] is produced as soon as `batch_size` of them are ready. A
//! trailing partial batch is dropped.
//!
//! # Example
//! ```ignore
//! let config = SamplerConfig::builder().batch_size(32).n_negative(4).build()?;
//! let mut sampler = WindowedContrastiveSampler::new(config, Arc::new(vocab))?;
//! for batch in sampler.batches(corpus.documents()) {
//!     let (inputs, labels) = batch?.into_parts();
//!     // feed the model
//! }
//! tracing::info!(?sampler.stats(), "epoch done");
//! ```

use crate::collator::{Collator, StackCollator};
use crate::config::SamplerConfig;
use crate::document::{Document, PositionTriple, Sentence};
use crate::example::TrainingExample;
use crate::minibatch::MiniBatch;
use crate::sampler::{ExclusionWindow, NegativeSampler};
use crate::transforms::EncodeIds;
use crate::vocab::Vocabulary;
use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of testing one position as an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    /// First sentence of a section (or of the document).
    SectionStart,
    /// Last sentence of the document.
    DocumentEnd,
    /// Last sentence of a section.
    SectionEnd,
    /// The anchor or one of its neighbours has no content.
    Absent,
}

impl Eligibility {
    /// Tests position `t` of parallel `triples`/`sentences` lists.
    pub fn at(triples: &[PositionTriple], sentences: &[Sentence], t: usize) -> Self {
        if t == 0 || triples[t].section != triples[t - 1].section {
            Self::SectionStart
        } else if t + 1 == triples.len() {
            Self::DocumentEnd
        } else if triples[t + 1].section != triples[t].section {
            Self::SectionEnd
        } else if sentences[t - 1..=t + 1].iter().any(Sentence::is_absent) {
            Self::Absent
        } else {
            Self::Eligible
        }
    }

    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Running counts of tested positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SamplingStats {
    /// Positions that produced an example.
    pub valid: usize,
    /// Positions rejected by the boundary or absence rules.
    pub invalid: usize,
    /// Documents too short for a single example (their positions are not counted).
    pub skipped_documents: usize,
}

impl SamplingStats {
    fn record(&mut self, eligibility: Eligibility) {
        if eligibility.is_eligible() {
            self.valid += 1;
        } else {
            self.invalid += 1;
        }
    }
}

/// Builds contrastive [`MiniBatch`]es from a stream of documents.
///
/// The sampler owns its RNG. It is seeded once at construction and keeps
/// advancing across calls to [`batches`](Self::batches), so successive epochs
/// see fresh negatives while a rebuilt sampler with the same seed replays the
/// exact same batches.
pub struct WindowedContrastiveSampler<C = StackCollator> {
    config: SamplerConfig,
    encoder: EncodeIds,
    negatives: NegativeSampler,
    collator: C,
    rng: StdRng,
    stats: SamplingStats,
}

impl WindowedContrastiveSampler<StackCollator> {
    /// Creates a sampler whose RNG is seeded from `config.seed`.
    pub fn new(config: SamplerConfig, vocab: Arc<Vocabulary>) -> Result<Self> {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::with_rng(config, vocab, rng)
    }

    /// Creates a sampler drawing negatives from a caller-supplied RNG.
    pub fn with_rng(config: SamplerConfig, vocab: Arc<Vocabulary>, rng: StdRng) -> Result<Self> {
        Self::with_collator(config, vocab, rng, StackCollator)
    }
}

impl<C: Collator> WindowedContrastiveSampler<C> {
    pub fn with_collator(
        config: SamplerConfig,
        vocab: Arc<Vocabulary>,
        rng: StdRng,
        collator: C,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            encoder: EncodeIds::new(vocab, config.seq_length),
            negatives: NegativeSampler::new(config.n_negative)?,
            config,
            collator,
            rng,
            stats: SamplingStats::default(),
        })
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn stats(&self) -> SamplingStats {
        self.stats
    }

    /// Tests position `t` of `document` and, when it is eligible, builds its
    /// example. Updates the running counts either way.
    fn example_at(&mut self, document: &Document, t: usize) -> Result<Option<TrainingExample>> {
        let sentences = document.sentences();
        let eligibility = Eligibility::at(document.triples(), sentences, t);
        self.stats.record(eligibility);
        if !eligibility.is_eligible() {
            return Ok(None);
        }

        let window = ExclusionWindow::around(t, 1);
        let negative_positions = self
            .negatives
            .draw_outside(sentences, window, &mut self.rng)
            .with_context(|| format!("Negative sampling failed for anchor position {}", t))?;

        Ok(Some(TrainingExample {
            anchor: self.encode(&sentences[t])?,
            positives: vec![self.encode(&sentences[t - 1])?, self.encode(&sentences[t + 1])?],
            negatives: negative_positions
                .iter()
                .map(|&i| self.encode(&sentences[i]))
                .collect::<Result<_>>()?,
            position: t,
            negative_positions,
        }))
    }

    fn encode(&self, sentence: &Sentence) -> Result<Vec<i64>> {
        sentence
            .tokens()
            .map(|tokens| self.encoder.encode(tokens))
            .ok_or_else(|| anyhow!("Cannot encode an absent sentence"))
    }

    /// All examples of one document in position order. Documents shorter
    /// than `1 + n_positive + n_negative` yield nothing and are not counted.
    pub fn document_examples(&mut self, document: &Document) -> Result<Vec<TrainingExample>> {
        if document.len() < self.config.min_document_len() {
            self.stats.skipped_documents += 1;
            return Ok(Vec::new());
        }
        let mut examples = Vec::new();
        for t in 0..document.len() {
            if let Some(example) = self.example_at(document, t)? {
                examples.push(example);
            }
        }
        Ok(examples)
    }

    /// Lazily turns `documents` into batches.
    ///
    /// The returned iterator reads one document at a time and stops at the
    /// first error (a failed read, or a document too small for the negative
    /// count).
    pub fn batches<I>(&mut self, documents: I) -> Batches<'_, I::IntoIter, C>
    where
        I: IntoIterator<Item = Result<Document>>,
    {
        Batches {
            sampler: self,
            documents: documents.into_iter(),
            current: None,
            document_index: 0,
            pending: Vec::new(),
            done: false,
        }
    }
}

/// Iterator returned by [`WindowedContrastiveSampler::batches`].
pub struct Batches<'a, I, C> {
    sampler: &'a mut WindowedContrastiveSampler<C>,
    documents: I,
    /// Document being scanned and the next position to test.
    current: Option<(Document, usize)>,
    document_index: usize,
    pending: Vec<TrainingExample>,
    done: bool,
}

impl<I, C> Batches<'_, I, C>
where
    I: Iterator<Item = Result<Document>>,
    C: Collator,
{
    /// Advances by one position (or one document). Returns `Ok(false)` once
    /// the input is exhausted.
    fn step(&mut self) -> Result<bool> {
        let Some((document, t)) = self.current.as_mut() else {
            let Some(document) = self.documents.next() else {
                return Ok(false);
            };
            let document = document?;
            self.document_index += 1;
            if document.len() < self.sampler.config.min_document_len() {
                debug!(
                    document = self.document_index,
                    sentences = document.len(),
                    "skipping document too short for one example"
                );
                self.sampler.stats.skipped_documents += 1;
            } else {
                self.current = Some((document, 0));
            }
            return Ok(true);
        };

        let position = *t;
        *t += 1;
        let example = self
            .sampler
            .example_at(document, position)
            .with_context(|| format!("Failed to sample document #{}", self.document_index))?;
        if *t >= document.len() {
            self.current = None;
        }
        if let Some(example) = example {
            self.pending.push(example);
        }
        Ok(true)
    }
}

impl<I, C> Iterator for Batches<'_, I, C>
where
    I: Iterator<Item = Result<Document>>,
    C: Collator,
{
    type Item = Result<MiniBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        while self.pending.len() < self.sampler.config.batch_size {
            match self.step() {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    let stats = self.sampler.stats;
                    info!(
                        valid = stats.valid,
                        invalid = stats.invalid,
                        skipped_documents = stats.skipped_documents,
                        dropped_examples = self.pending.len(),
                        "sampling pass finished"
                    );
                    self.pending.clear();
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        let examples = std::mem::take(&mut self.pending);
        let batch = self.sampler.collator.collate(&examples);
        if batch.is_err() {
            self.done = true;
        }
        Some(batch)
    }
}

impl<I, C> std::iter::FusedIterator for Batches<'_, I, C>
where
    I: Iterator<Item = Result<Document>>,
    C: Collator,
{
}
