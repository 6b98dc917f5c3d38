use anyhow::Result;

/// A `DataSource` streams raw records of one kind out of some storage.
///
/// Sources are lazy: `stream()` opens the underlying file (or clones the
/// in-memory buffer) and every record is produced on demand. Per-record
/// failures are reported in-band so the consumer decides whether they are
/// fatal.
pub trait DataSource<Raw>: Send + Sync {
    fn stream(&self) -> Result<Box<dyn Iterator<Item = Result<Raw>> + Send>>;
}

/// A source over records already held in memory. Handy for building
/// documents in tests and for callers that parse their own formats.
#[derive(Debug, Clone)]
pub struct InMemorySource<Raw> {
    records: Vec<Raw>,
}

impl<Raw> InMemorySource<Raw> {
    pub fn new(records: Vec<Raw>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<Raw> DataSource<Raw> for InMemorySource<Raw>
where
    Raw: Clone + Send + Sync + 'static,
{
    fn stream(&self) -> Result<Box<dyn Iterator<Item = Result<Raw>> + Send>> {
        Ok(Box::new(self.records.clone().into_iter().map(Ok)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_source_restreams() -> Result<()> {
        let source = InMemorySource::new(vec!["a".to_string(), "b".to_string()]);
        let first: Vec<String> = source.stream()?.collect::<Result<_>>()?;
        let second: Vec<String> = source.stream()?.collect::<Result<_>>()?;
        assert_eq!(first, second);
        assert_eq!(source.len(), 2);
        Ok(())
    }
}
