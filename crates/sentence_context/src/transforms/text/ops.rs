use crate::transforms::Transform;
use crate::vocab::{pad_sequence, Vocabulary};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokenizers::Tokenizer;

/// ===========================================================================
/// Lowercases a raw sentence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lowercase;

impl Transform<String, String> for Lowercase {
    fn apply(&self, text: String) -> Result<String> {
        Ok(text.to_lowercase())
    }
}

/// ===========================================================================
/// Splits a sentence on Unicode whitespace. Empty pieces are dropped, so a
/// whitespace-only sentence becomes an empty token list (not `Absent`).
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenize;

impl Transform<String, Vec<String>> for WhitespaceTokenize {
    fn apply(&self, text: String) -> Result<Vec<String>> {
        Ok(text.split_whitespace().map(str::to_string).collect())
    }
}

/// ===========================================================================
/// Tokenize text with a HuggingFace tokenizer
///
/// Wraps a [`Tokenizer`](tokenizers::Tokenizer) and returns the token
/// *strings* of the encoding (special tokens are not added), so the output
/// can be looked up in a corpus [`Vocabulary`] like any other token list.
///
/// # Example
/// ```ignore
/// let hf = Tokenizer::from_pretrained("bert-base-uncased", None)?;
/// let tokens = Tokenize::new(hf).apply("Hello world!".to_string())?;
/// assert_eq!(tokens, vec!["hello", "world", "!"]);
/// ```
#[derive(Debug)]
pub struct Tokenize {
    tokenizer: Tokenizer,
}

impl Tokenize {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// Loads a `tokenizer.json` from disk.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", path.display(), e))?;
        Ok(Self::new(tokenizer))
    }
}

impl Transform<String, Vec<String>> for Tokenize {
    fn apply(&self, text: String) -> Result<Vec<String>> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        Ok(encoding.get_tokens().to_vec())
    }
}

/// ===========================================================================
/// Maps a token list to a fixed-length id sequence: vocabulary lookup
/// (unknown tokens get the vocabulary's unknown id), then right truncation
/// or right padding to `seq_length` with the vocabulary's padding id.
#[derive(Debug, Clone)]
pub struct EncodeIds {
    vocab: Arc<Vocabulary>,
    seq_length: usize,
}

impl EncodeIds {
    pub fn new(vocab: Arc<Vocabulary>, seq_length: usize) -> Self {
        Self { vocab, seq_length }
    }

    pub fn seq_length(&self) -> usize {
        self.seq_length
    }

    /// Borrowing variant of [`Transform::apply`]; the sampler encodes the same
    /// sentence many times (as anchor, positive and negative).
    pub fn encode(&self, tokens: &[String]) -> Vec<i64> {
        let ids = self.vocab.lookup_all(tokens);
        pad_sequence(ids, self.seq_length, self.vocab.pad_id())
    }
}

impl Transform<Vec<String>, Vec<i64>> for EncodeIds {
    fn apply(&self, tokens: Vec<String>) -> Result<Vec<i64>> {
        Ok(self.encode(&tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vocab() -> Arc<Vocabulary> {
        let map: HashMap<String, i64> = [("<UNK>", 0), ("the", 1), ("cell", 2), ("divides", 3)]
            .into_iter()
            .map(|(t, i)| (t.to_string(), i))
            .collect();
        Arc::new(Vocabulary::new(map, "<UNK>").unwrap())
    }

    #[test]
    fn test_lowercase_then_split() -> Result<()> {
        let pipeline = Lowercase.then(WhitespaceTokenize);
        let tokens = pipeline.apply("The  Cell\tDivides".to_string())?;
        assert_eq!(tokens, vec!["the", "cell", "divides"]);
        Ok(())
    }

    #[test]
    fn test_whitespace_only_sentence_is_empty() -> Result<()> {
        assert!(WhitespaceTokenize.apply(" \t ".to_string())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_encode_ids_pads_and_maps_unknown() -> Result<()> {
        let encode = EncodeIds::new(vocab(), 5);
        let ids = encode.apply(vec!["the".into(), "mitosis".into(), "divides".into()])?;
        assert_eq!(ids, vec![1, 0, 3, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_encode_ids_truncates_long_sentences() {
        let encode = EncodeIds::new(vocab(), 2);
        let tokens: Vec<String> = ["cell", "cell", "the", "the"].iter().map(|s| s.to_string()).collect();
        assert_eq!(encode.encode(&tokens), vec![2, 2]);
    }

    #[test]
    fn test_full_preprocessing_chain() -> Result<()> {
        let pipeline = Lowercase
            .then(WhitespaceTokenize)
            .then(EncodeIds::new(vocab(), 4));
        assert_eq!(pipeline.apply("THE Cell".to_string())?, vec![1, 2, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_tokenize_with_word_level_tokenizer() -> Result<()> {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"{{"version":"1.0","truncation":null,"padding":null,"added_tokens":[],
"normalizer":{{"type":"Lowercase"}},"pre_tokenizer":{{"type":"Whitespace"}},
"post_processor":null,"decoder":null,
"model":{{"type":"WordLevel","vocab":{{"[UNK]":0,"hello":1,"rust":2,"!":3}},"unk_token":"[UNK]"}}}}"#
        )?;

        let tokens = Tokenize::from_file(file.path())?.apply("Hello Rust!".to_string())?;
        assert_eq!(tokens, vec!["hello", "rust", "!"]);
        Ok(())
    }
}
