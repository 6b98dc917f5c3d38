use crate::dataset::DataSource;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Column layout of a sentence-tagged corpus file. Only `sentenceId`,
/// `sectionType` and `content` carry meaning for document reconstruction.
pub const TSV_COLUMNS: [&str; 12] = [
    "sentenceId",
    "category",
    "sectionType",
    "sectionCategory",
    "section4",
    "5",
    "6",
    "7",
    "8",
    "9",
    "10",
    "content",
];

const SENTENCE_ID_COL: usize = 0;
const SECTION_TYPE_COL: usize = 2;
const CONTENT_COL: usize = 11;

/// One row of a corpus file. Empty cells (and cells past the end of a short
/// row) are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsvRecord {
    pub sentence_id: String,
    pub section_type: Option<String>,
    pub content: Option<String>,
}

impl TsvRecord {
    pub fn new(
        sentence_id: impl Into<String>,
        section_type: Option<&str>,
        content: Option<&str>,
    ) -> Self {
        Self {
            sentence_id: sentence_id.into(),
            section_type: section_type.map(str::to_string),
            content: content.map(str::to_string),
        }
    }

    fn from_record(record: &csv::StringRecord) -> Self {
        let cell = |index: usize| {
            record
                .get(index)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        Self {
            sentence_id: record.get(SENTENCE_ID_COL).unwrap_or_default().to_string(),
            section_type: cell(SECTION_TYPE_COL),
            content: cell(CONTENT_COL),
        }
    }
}

/// Streams rows of a headerless, tab-separated corpus file.
///
/// Quote characters are treated as ordinary text: sentence cells routinely
/// contain unbalanced `"`.
///
/// # Example
/// ```ignore
/// let source = TsvSource::new("corpus/paper_0001.tsv");
/// for record in source.stream()? {
///     let record = record?;
///     println!("{} {:?}", record.sentence_id, record.content);
/// }
/// ```
pub struct TsvSource {
    path: PathBuf,
}

impl TsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl DataSource<TsvRecord> for TsvSource {
    fn stream(&self) -> Result<Box<dyn Iterator<Item = Result<TsvRecord>> + Send>> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_path(&self.path)
            .with_context(|| format!("Failed to open TSV file: {}", self.path.display()))?;

        let path = self.path.clone();
        let iter = reader
            .into_records()
            .enumerate()
            .map(move |(row_num, record)| {
                record
                    .map(|r| TsvRecord::from_record(&r))
                    .with_context(|| format!("Error reading row {} of {}", row_num + 1, path.display()))
            });
        Ok(Box::new(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_tsv_streaming_extracts_used_columns() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            "0-1-0-0-0\tpaper\tSectionHeader\t\t\t\t\t\t\t\t\t1 Introduction"
        )?;
        writeln!(file, "0-1-1-1-0\tpaper\t\t\t\t\t\t\t\t\t\tA \"quoted sentence.")?;
        writeln!(file, "0-1-1-2-0\tpaper\t\t\t\t\t\t\t\t\t\t")?;

        let records: Vec<TsvRecord> = TsvSource::new(file.path()).stream()?.collect::<Result<_>>()?;
        assert_eq!(
            records,
            vec![
                TsvRecord::new("0-1-0-0-0", Some("SectionHeader"), Some("1 Introduction")),
                TsvRecord::new("0-1-1-1-0", None, Some("A \"quoted sentence.")),
                TsvRecord::new("0-1-1-2-0", None, None),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_short_rows_have_no_content() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "0-2-1-1-0\tpaper\tFootnote")?;

        let records: Vec<TsvRecord> = TsvSource::new(file.path()).stream()?.collect::<Result<_>>()?;
        assert_eq!(records[0].section_type.as_deref(), Some("Footnote"));
        assert_eq!(records[0].content, None);
        Ok(())
    }

    #[test]
    fn test_missing_file_fails_on_stream() {
        assert!(TsvSource::new("/nonexistent/corpus.tsv").stream().is_err());
    }
}
