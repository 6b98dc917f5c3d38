#![allow(dead_code)]

use anyhow::Result;
use sentence_context::Vocabulary;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Builds the rows of one corpus file.
///
/// Sentence text is `"tok{n}"` with `n` a running counter across the whole
/// fixture, so every body sentence maps to a distinct vocabulary id.
pub struct TsvFixture {
    rows: Vec<String>,
    section: usize,
    next_token: usize,
}

impl TsvFixture {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            section: 0,
            next_token: 0,
        }
    }

    fn push(&mut self, id: String, section_type: &str, content: &str) {
        let mut cells = vec![id, "paper".to_string(), section_type.to_string()];
        cells.extend(std::iter::repeat(String::new()).take(8));
        cells.push(content.to_string());
        self.rows.push(cells.join("\t"));
    }

    pub fn title(mut self, text: &str) -> Self {
        self.push("0-0-0-0-0".to_string(), "", text);
        self
    }

    /// Header row followed by `n` body sentences in one paragraph.
    pub fn section(mut self, heading: &str, n: usize) -> Self {
        self.section += 1;
        self.push(format!("0-{}-0-0-0", self.section), "", heading);
        for i in 0..n {
            let token = format!("tok{}", self.next_token);
            self.next_token += 1;
            self.push(format!("0-{}-1-1-{}", self.section, i), "", &token);
        }
        self
    }

    /// A body row with an empty content cell in the current section.
    pub fn empty_sentence(mut self) -> Self {
        self.push(format!("0-{}-1-1-99", self.section), "", "");
        self
    }

    pub fn row(mut self, id: &str, section_type: &str, content: &str) -> Self {
        self.push(id.to_string(), section_type, content);
        self
    }

    pub fn write(&self, path: &Path) -> Result<PathBuf> {
        let mut file = File::create(path)?;
        for row in &self.rows {
            writeln!(file, "{}", row)?;
        }
        Ok(path.to_path_buf())
    }
}

/// `tok{i}` -> `i + 1`, `<UNK>` -> 0.
pub fn token_vocab(n: usize) -> Arc<Vocabulary> {
    let mut map: HashMap<String, i64> = (0..n)
        .map(|i| (format!("tok{}", i), i as i64 + 1))
        .collect();
    map.insert("<UNK>".to_string(), 0);
    Arc::new(Vocabulary::new(map, "<UNK>").expect("fixture vocabulary has <UNK>"))
}
