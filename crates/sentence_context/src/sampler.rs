use crate::document::Sentence;
use anyhow::{ensure, Result};
use rand::rngs::StdRng;
use rand::seq::index;

/// ============================================================================
/// Closed index range `[lo, hi]` around an anchor that negatives may not be
/// drawn from: the anchor itself plus its positives.
///
/// # Example
/// ```ignore
/// // anchor at t = 5 with one neighbour on each side
/// let window = ExclusionWindow::around(5, 1);
/// assert_eq!((window.lo(), window.hi()), (4, 6));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExclusionWindow {
    lo: usize,
    hi: usize,
}

impl ExclusionWindow {
    pub fn new(lo: usize, hi: usize) -> Result<Self> {
        ensure!(lo <= hi, "Invalid exclusion window [{}, {}]", lo, hi);
        Ok(Self { lo, hi })
    }

    /// Window of `radius` positions on each side of `anchor`, clamped at 0.
    pub fn around(anchor: usize, radius: usize) -> Self {
        Self {
            lo: anchor.saturating_sub(radius),
            hi: anchor + radius,
        }
    }

    pub fn lo(&self) -> usize {
        self.lo
    }

    pub fn hi(&self) -> usize {
        self.hi
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.lo..=self.hi).contains(&index)
    }
}

/// Indices of a document's sentences that may serve as negatives for the
/// given window: everything outside `[lo, hi]` that is not `Absent`.
pub fn candidate_pool(sentences: &[Sentence], window: ExclusionWindow) -> Vec<usize> {
    sentences
        .iter()
        .enumerate()
        .filter(|(i, sentence)| !window.contains(*i) && !sentence.is_absent())
        .map(|(i, _)| i)
        .collect()
}

/// ============================================================================
/// Draws negatives uniformly, without replacement, from a candidate pool.
///
/// The sampler does not own randomness: every call takes the caller's
/// `StdRng`, so two samplers seeded alike draw identical sequences and
/// tests can run side by side without sharing state.
///
/// # Arguments:
/// - `n_negative`: Number of indices returned per draw.
#[derive(Debug, Clone, Copy)]
pub struct NegativeSampler {
    n_negative: usize,
}

impl NegativeSampler {
    pub fn new(n_negative: usize) -> Result<Self> {
        ensure!(
            n_negative > 0,
            "n_negative must be > 0, but got n_negative={}",
            n_negative
        );
        Ok(Self { n_negative })
    }

    pub fn n_negative(&self) -> usize {
        self.n_negative
    }

    /// Returns `n_negative` distinct entries of `pool`, in draw order.
    ///
    /// # Errors
    /// Fails when the pool holds fewer than `n_negative` candidates; this means
    /// the document is too small for the configured negative count.
    pub fn draw(&self, pool: &[usize], rng: &mut StdRng) -> Result<Vec<usize>> {
        ensure!(
            self.n_negative <= pool.len(),
            "Cannot draw {} negatives without replacement from {} candidates",
            self.n_negative,
            pool.len()
        );
        Ok(index::sample(rng, pool.len(), self.n_negative)
            .into_iter()
            .map(|i| pool[i])
            .collect())
    }

    /// Builds the candidate pool for `window` and draws from it.
    pub fn draw_outside(
        &self,
        sentences: &[Sentence],
        window: ExclusionWindow,
        rng: &mut StdRng,
    ) -> Result<Vec<usize>> {
        self.draw(&candidate_pool(sentences, window), rng)
    }
}
