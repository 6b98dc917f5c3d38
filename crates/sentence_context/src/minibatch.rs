use anyhow::{anyhow, ensure, Result};
use tch::{Device, Tensor};

/// The `MiniBatch` struct holds `batch_size` training examples stacked
/// column-wise, ready for a contrastive sentence-embedding model.
///
/// Shapes, with `B = batch_size`, `S = seq_length`:
/// - `anchor` -> `[B, S]` (`Int64`)
/// - `positives[i]` -> `[B, S]`, one tensor per positive slot
/// - `negatives[j]` -> `[B, S]`, one tensor per negative slot
/// - `labels` -> `[B, n_positive + n_negative]` (`Float`)
///
/// Every label row holds `1 / n_positive` in its positive columns and `0`
/// in its negative columns, so each row sums to one.
#[derive(Debug)]
pub struct MiniBatch {
    pub anchor: Tensor,
    pub positives: Vec<Tensor>,
    pub negatives: Vec<Tensor>,
    pub labels: Tensor,
}

impl MiniBatch {
    /// Returns the number of examples in the batch.
    pub fn batch_size(&self) -> i64 {
        self.anchor.size()[0]
    }

    /// Model inputs in order: anchor, positives, negatives.
    pub fn inputs(&self) -> Vec<&Tensor> {
        std::iter::once(&self.anchor)
            .chain(self.positives.iter())
            .chain(self.negatives.iter())
            .collect()
    }

    /// Looks up a column by name: `"anchor"`, `"positive_{i}"`,
    /// `"negative_{j}"` or `"labels"`.
    pub fn get(&self, column: &str) -> Result<&Tensor> {
        match column {
            "anchor" => Some(&self.anchor),
            "labels" => Some(&self.labels),
            _ => slot(column, "positive_", &self.positives)
                .or_else(|| slot(column, "negative_", &self.negatives)),
        }
        .ok_or_else(|| anyhow!("Column '{}' not found in mini-batch", column))
    }

    /// Returns all column names in input order, followed by `"labels"`.
    pub fn columns(&self) -> Vec<String> {
        std::iter::once("anchor".to_string())
            .chain((0..self.positives.len()).map(|i| format!("positive_{}", i)))
            .chain((0..self.negatives.len()).map(|j| format!("negative_{}", j)))
            .chain(std::iter::once("labels".to_string()))
            .collect()
    }

    /// Splits the batch into the model inputs and the label matrix.
    pub fn into_parts(self) -> (Vec<Tensor>, Tensor) {
        let mut inputs = Vec::with_capacity(1 + self.positives.len() + self.negatives.len());
        inputs.push(self.anchor);
        inputs.extend(self.positives);
        inputs.extend(self.negatives);
        (inputs, self.labels)
    }

    /// Transfers all tensors to the target device (CPU/GPU)
    pub fn to_device(&self, device: Device) -> Self {
        Self {
            anchor: self.anchor.to_device(device),
            positives: self.positives.iter().map(|t| t.to_device(device)).collect(),
            negatives: self.negatives.iter().map(|t| t.to_device(device)).collect(),
            labels: self.labels.to_device(device),
        }
    }
}

fn slot<'a>(column: &str, prefix: &str, tensors: &'a [Tensor]) -> Option<&'a Tensor> {
    column
        .strip_prefix(prefix)
        .and_then(|i| i.parse::<usize>().ok())
        .and_then(|i| tensors.get(i))
}

/// Label matrix of shape `[batch_size, n_positive + n_negative]`.
pub fn contrastive_labels(batch_size: usize, n_positive: usize, n_negative: usize) -> Result<Tensor> {
    ensure!(n_positive > 0, "n_positive must be > 0 to build labels");
    let weight = 1.0 / n_positive as f32;
    let row: Vec<f32> = std::iter::repeat(weight)
        .take(n_positive)
        .chain(std::iter::repeat(0.0).take(n_negative))
        .collect();
    let values: Vec<f32> = row.iter().copied().cycle().take(row.len() * batch_size).collect();
    Ok(Tensor::from_slice(&values).reshape(&[batch_size as i64, (n_positive + n_negative) as i64]))
}
