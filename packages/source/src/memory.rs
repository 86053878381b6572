//! In-memory source returning a fixed set of rows.

use async_trait::async_trait;

use crate::{DataSource, RawRow, SourceError};

/// Serves the same rows for every query key.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<RawRow>,
}

impl MemorySource {
    /// Creates a source that always returns `rows`.
    #[must_use]
    pub const fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl DataSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self, _query_key: &str) -> Result<Vec<RawRow>, SourceError> {
        Ok(self.rows.clone())
    }
}
