//! src/config.rs
//!
//! Configuration for contrastive batch sampling
//!
//! Example:
//! ```ignore
//! let config = SamplerConfig::builder()
//!     .batch_size(64)
//!     .n_negative(8)
//!     .seq_length(48)
//!     .seed(7)
//!     .build()?;
//! ```
//!
//! The same fields can be loaded from JSON; missing keys take the defaults:
//! ```json
//! { "batch_size": 64, "n_negative": 8 }
//! ```

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// The windowing rule yields exactly one predecessor and one successor.
pub const N_POSITIVE: usize = 2;
pub const DEFAULT_SEED: u64 = 42;

/// Configuration for `WindowedContrastiveSampler`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplerConfig {
    /// Examples per emitted batch
    pub batch_size: usize,
    /// Context sentences per example (must equal [`N_POSITIVE`])
    pub n_positive: usize,
    /// Sampled non-context sentences per example
    pub n_negative: usize,
    /// Length every id sequence is padded or truncated to
    pub seq_length: usize,
    /// Seed of the negative-sampling RNG
    pub seed: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            n_positive: N_POSITIVE,
            n_negative: 4,
            seq_length: 64,
            seed: DEFAULT_SEED,
        }
    }
}

impl SamplerConfig {
    pub fn builder() -> SamplerConfigBuilder {
        SamplerConfigBuilder::default()
    }

    /// Reads a JSON config file and validates it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read sampler config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid sampler config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.batch_size > 0,
            "batch_size must be > 0, but got batch_size={}",
            self.batch_size
        );
        ensure!(
            self.n_positive == N_POSITIVE,
            "n_positive must be {} (predecessor and successor), but got n_positive={}",
            N_POSITIVE,
            self.n_positive
        );
        ensure!(
            self.n_negative > 0,
            "n_negative must be > 0, but got n_negative={}",
            self.n_negative
        );
        ensure!(
            self.seq_length > 0,
            "seq_length must be > 0, but got seq_length={}",
            self.seq_length
        );
        Ok(())
    }

    /// Shortest document that can hold one anchor, its positives and its
    /// negatives. Shorter documents are skipped without being counted.
    pub fn min_document_len(&self) -> usize {
        1 + self.n_positive + self.n_negative
    }

    /// Columns of the label matrix.
    pub fn n_candidates(&self) -> usize {
        self.n_positive + self.n_negative
    }
}

/// Builder for SamplerConfig with method chaining
#[derive(Default)]
pub struct SamplerConfigBuilder {
    config: SamplerConfig,
}

impl SamplerConfigBuilder {
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    pub fn n_positive(mut self, n: usize) -> Self {
        self.config.n_positive = n;
        self
    }

    pub fn n_negative(mut self, n: usize) -> Self {
        self.config.n_negative = n;
        self
    }

    pub fn seq_length(mut self, length: usize) -> Self {
        self.config.seq_length = length;
        self
    }

    /// Identical seeds over an identical corpus give bit-identical batches.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<SamplerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
