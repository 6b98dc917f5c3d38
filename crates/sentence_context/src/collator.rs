use crate::example::TrainingExample;
use crate::minibatch::{contrastive_labels, MiniBatch};
use anyhow::{bail, Result};
use tch::Tensor;

/// A `Collator` defines how to combine multiple [`TrainingExample`]s into a
/// [`MiniBatch`].
pub trait Collator {
    fn collate(&self, examples: &[TrainingExample]) -> Result<MiniBatch>;
}

/// A `Collator` that stacks each column (anchor, every positive slot, every
/// negative slot) of equally shaped examples along the batch dimension.
/// Sequences are expected to be padded already, so any length or slot-count
/// mismatch is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackCollator;

impl StackCollator {
    /// Stacks one column into an `Int64` tensor of shape `[batch, seq_length]`.
    fn stack_column<'a>(
        rows: impl Iterator<Item = &'a Vec<i64>>,
        batch_size: usize,
        seq_length: usize,
    ) -> Tensor {
        let flat: Vec<i64> = rows.flat_map(|row| row.iter().copied()).collect();
        Tensor::from_slice(&flat).reshape(&[batch_size as i64, seq_length as i64])
    }
}

impl Collator for StackCollator {
    fn collate(&self, examples: &[TrainingExample]) -> Result<MiniBatch> {
        if examples.is_empty() {
            bail!("Cannot collate empty example list");
        }

        // Validate slot counts and sequence lengths against the first example
        let first = &examples[0];
        let n_positive = first.positives.len();
        let n_negative = first.negatives.len();
        let seq_length = first.anchor.len();

        for (i, example) in examples.iter().enumerate() {
            if example.positives.len() != n_positive || example.negatives.len() != n_negative {
                bail!(
                    "Example #{} has {} positives and {} negatives, expected {} and {}",
                    i,
                    example.positives.len(),
                    example.negatives.len(),
                    n_positive,
                    n_negative
                );
            }
            if let Some(seq) = example.sequences().find(|s| s.len() != seq_length) {
                bail!(
                    "Sequence length mismatch in example {}: expected {}, got {}",
                    i,
                    seq_length,
                    seq.len()
                );
            }
        }

        let batch_size = examples.len();
        let anchor = Self::stack_column(examples.iter().map(|e| &e.anchor), batch_size, seq_length);
        let positives = (0..n_positive)
            .map(|slot| {
                Self::stack_column(
                    examples.iter().map(|e| &e.positives[slot]),
                    batch_size,
                    seq_length,
                )
            })
            .collect();
        let negatives = (0..n_negative)
            .map(|slot| {
                Self::stack_column(
                    examples.iter().map(|e| &e.negatives[slot]),
                    batch_size,
                    seq_length,
                )
            })
            .collect();

        Ok(MiniBatch {
            anchor,
            positives,
            negatives,
            labels: contrastive_labels(batch_size, n_positive, n_negative)?,
        })
    }
}
