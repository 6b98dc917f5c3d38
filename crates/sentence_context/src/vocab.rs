use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Token used for out-of-vocabulary lookups unless told otherwise.
pub const DEFAULT_UNK_TOKEN: &str = "<UNK>";

/// Token → id mapping used to turn preprocessed sentences into id sequences.
///
/// Two ids are designated:
/// - `unk_id`: returned for every token missing from the map.
/// - `pad_id`: fills sequences shorter than the configured length. It
///   defaults to `unk_id`, which is what the corpus models were trained with.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    token2id: HashMap<String, i64>,
    unk_id: i64,
    pad_id: i64,
}

impl Vocabulary {
    /// Creates a vocabulary from a full token map. `unk_token` must be a key.
    pub fn new(token2id: HashMap<String, i64>, unk_token: &str) -> Result<Self> {
        let unk_id = *token2id
            .get(unk_token)
            .ok_or_else(|| anyhow!("Unknown token '{}' is missing from vocabulary", unk_token))?;
        Ok(Self {
            token2id,
            unk_id,
            pad_id: unk_id,
        })
    }

    /// Overrides the padding id.
    pub fn with_pad_id(mut self, pad_id: i64) -> Self {
        self.pad_id = pad_id;
        self
    }

    /// Loads a vocabulary file.
    ///
    /// - `*.json`: an object `{"token": id, ...}`
    /// - anything else: one token per line, id = zero-based line number
    pub fn from_file(path: impl AsRef<Path>, unk_token: &str) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read vocabulary file: {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let token2id = if is_json {
            serde_json::from_str::<HashMap<String, i64>>(&raw)
                .with_context(|| format!("Invalid JSON vocabulary: {}", path.display()))?
        } else {
            let mut map = HashMap::new();
            for (line_num, token) in raw.lines().enumerate() {
                if token.is_empty() {
                    continue;
                }
                if map.insert(token.to_string(), line_num as i64).is_some() {
                    bail!(
                        "Duplicate token '{}' at line {} of {}",
                        token,
                        line_num + 1,
                        path.display()
                    );
                }
            }
            map
        };

        Self::new(token2id, unk_token)
            .with_context(|| format!("Invalid vocabulary: {}", path.display()))
    }

    pub fn unk_id(&self) -> i64 {
        self.unk_id
    }

    pub fn pad_id(&self) -> i64 {
        self.pad_id
    }

    pub fn len(&self) -> usize {
        self.token2id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token2id.is_empty()
    }

    /// Id of a single token, falling back to the unknown id.
    pub fn lookup(&self, token: &str) -> i64 {
        self.token2id.get(token).copied().unwrap_or(self.unk_id)
    }

    pub fn lookup_all(&self, tokens: &[String]) -> Vec<i64> {
        tokens.iter().map(|t| self.lookup(t)).collect()
    }
}

/// Truncates `ids` on the right to `seq_length`, or right-pads with `pad_id`.
pub fn pad_sequence(mut ids: Vec<i64>, seq_length: usize, pad_id: i64) -> Vec<i64> {
    ids.resize(seq_length, pad_id);
    ids
}
