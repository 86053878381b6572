//! Local JSON file source.
//!
//! The file must contain a single JSON array of row objects, the shape a
//! query result export produces.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::{DataSource, RawRow, SourceError};

/// Reads rows from a JSON array file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Creates a JSON source for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Parses a JSON array of objects.
///
/// # Errors
///
/// Returns [`SourceError`] if the bytes are not JSON, the top level is not
/// an array, or any element is not an object.
pub fn parse_json_rows(bytes: &[u8]) -> Result<Vec<RawRow>, SourceError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let serde_json::Value::Array(rows) = value else {
        return Err(SourceError::Config {
            message: "expected a JSON array of row objects".to_string(),
        });
    };

    if let Some(pos) = rows.iter().position(|row| !row.is_object()) {
        return Err(SourceError::Config {
            message: format!("row {pos} is not a JSON object"),
        });
    }

    Ok(rows)
}

#[async_trait]
impl DataSource for JsonFileSource {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn fetch(&self, query_key: &str) -> Result<Vec<RawRow>, SourceError> {
        log::debug!("[{query_key}] Reading JSON {}", self.path.display());
        let bytes = tokio::fs::read(&self.path).await?;
        let rows = parse_json_rows(&bytes)?;
        log::info!(
            "[{query_key}] Parsed {} rows from {}",
            rows.len(),
            self.path.display()
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_of_objects() {
        let rows = parse_json_rows(br#"[{"AnimalType":"Dog","AgeInMonths":6},{"AnimalType":"Cat"}]"#)
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["AgeInMonths"], 6);
    }

    #[test]
    fn rejects_non_array() {
        let err = parse_json_rows(br#"{"AnimalType":"Dog"}"#).unwrap_err();
        assert!(matches!(err, SourceError::Config { .. }));
    }

    #[test]
    fn rejects_non_object_rows() {
        let err = parse_json_rows(br#"[{"AnimalType":"Dog"}, 3]"#).unwrap_err();
        assert!(matches!(err, SourceError::Config { .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_json_rows(b"[{").unwrap_err();
        assert!(matches!(err, SourceError::Json(_)));
    }

    #[tokio::test]
    async fn reads_file_from_disk() {
        let tmp = std::env::temp_dir().join("shelter_stats_json_file_source.json");
        std::fs::write(&tmp, r#"[{"AnimalType":"Dog"}]"#).unwrap();

        let rows = JsonFileSource::new(&tmp).fetch("test").await.unwrap();
        assert_eq!(rows.len(), 1);

        let _ = std::fs::remove_file(&tmp);
    }
}
