pub mod collator;
pub mod config;
pub mod corpus;
pub mod dataset;
pub mod document;
pub mod example;
pub mod minibatch;
pub mod readers;
pub mod sampler;
pub mod transforms;
pub mod vocab;
pub mod windowed;

pub use collator::{Collator, StackCollator};
pub use config::SamplerConfig;
pub use corpus::{CorpusEnumerator, CorpusStats};
pub use document::{Document, DocumentReader, PositionTriple, Sentence};
pub use example::TrainingExample;
pub use minibatch::MiniBatch;
pub use vocab::Vocabulary;
pub use windowed::{SamplingStats, WindowedContrastiveSampler};
