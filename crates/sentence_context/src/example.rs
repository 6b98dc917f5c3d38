/// One anchor sentence with its context and contrastive counter-examples,
/// already mapped to fixed-length id sequences.
///
/// `position` and `negative_positions` record where in the source document
/// the sequences came from; collation ignores them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingExample {
    pub anchor: Vec<i64>,
    /// Predecessor first, successor second.
    pub positives: Vec<Vec<i64>>,
    pub negatives: Vec<Vec<i64>>,
    pub position: usize,
    pub negative_positions: Vec<usize>,
}

impl TrainingExample {
    /// Every sequence of the example in column order: anchor, positives,
    /// negatives.
    pub fn sequences(&self) -> impl Iterator<Item = &Vec<i64>> {
        std::iter::once(&self.anchor)
            .chain(self.positives.iter())
            .chain(self.negatives.iter())
    }
}
