//! Config-driven data source definition.
//!
//! [`FetcherConfig`] is the `[fetcher]` table of the dashboard TOML config.
//! It selects one of the built-in sources and carries its settings.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::csv_download::CsvDownloadSource;
use crate::csv_file::CsvFileSource;
use crate::json_file::JsonFileSource;
use crate::{DataSource, SourceError};

/// How to fetch raw rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetcherConfig {
    /// A CSV file on local disk.
    CsvFile {
        /// Path to the file.
        path: PathBuf,
        /// Single-character field delimiter (default: comma).
        #[serde(default)]
        delimiter: Option<String>,
    },
    /// A JSON array file on local disk.
    JsonFile {
        /// Path to the file.
        path: PathBuf,
    },
    /// A CSV file downloaded over HTTP.
    CsvDownload {
        /// URL of the CSV file.
        url: String,
        /// Single-character field delimiter (default: comma).
        #[serde(default)]
        delimiter: Option<String>,
        /// Request timeout in seconds.
        #[serde(default)]
        timeout_secs: Option<u64>,
        /// Additional HTTP headers.
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
}

/// Converts a configured delimiter string to its single byte.
fn delimiter_byte(delimiter: Option<&str>) -> Result<u8, SourceError> {
    match delimiter {
        None => Ok(b','),
        Some("\\t") => Ok(b'\t'),
        Some(d) if d.len() == 1 => Ok(d.as_bytes()[0]),
        Some(d) => Err(SourceError::Config {
            message: format!("delimiter must be a single ASCII character, got '{d}'"),
        }),
    }
}

impl FetcherConfig {
    /// Builds the configured [`DataSource`].
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if a delimiter is not a single byte.
    pub fn build(&self) -> Result<Arc<dyn DataSource>, SourceError> {
        Ok(match self {
            Self::CsvFile { path, delimiter } => Arc::new(
                CsvFileSource::new(path.clone())
                    .with_delimiter(delimiter_byte(delimiter.as_deref())?),
            ),
            Self::JsonFile { path } => Arc::new(JsonFileSource::new(path.clone())),
            Self::CsvDownload {
                url,
                delimiter,
                timeout_secs,
                headers,
            } => {
                let mut source = CsvDownloadSource::new(url)
                    .with_delimiter(delimiter_byte(delimiter.as_deref())?);
                if let Some(secs) = timeout_secs {
                    source = source.with_timeout(Duration::from_secs(*secs));
                }
                for (key, value) in headers {
                    source = source.with_header(key, value);
                }
                Arc::new(source)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<FetcherConfig, toml::de::Error> {
        toml::from_str(s)
    }

    #[test]
    fn parses_csv_file_fetcher() {
        let config = parse(
            r#"
            type = "csv_file"
            path = "data/animal_shelter.csv"
            "#,
        )
        .unwrap();
        assert_eq!(
            config,
            FetcherConfig::CsvFile {
                path: PathBuf::from("data/animal_shelter.csv"),
                delimiter: None,
            }
        );
        assert_eq!(config.build().unwrap().name(), "csv_file");
    }

    #[test]
    fn parses_csv_download_fetcher() {
        let config = parse(
            r#"
            type = "csv_download"
            url = "https://example.org/shelter.csv"
            delimiter = ";"
            timeout_secs = 30

            [headers]
            Accept = "text/csv"
            "#,
        )
        .unwrap();
        let FetcherConfig::CsvDownload {
            timeout_secs,
            headers,
            ..
        } = &config
        else {
            panic!("expected csv_download, got {config:?}");
        };
        assert_eq!(*timeout_secs, Some(30));
        assert_eq!(headers.get("Accept").map(String::as_str), Some("text/csv"));
        assert_eq!(config.build().unwrap().name(), "csv_download");
    }

    #[test]
    fn rejects_unknown_fetcher_type() {
        assert!(parse(r#"type = "bigquery""#).is_err());
    }

    #[test]
    fn rejects_multi_character_delimiter() {
        let config = FetcherConfig::CsvFile {
            path: PathBuf::from("x.csv"),
            delimiter: Some("||".to_string()),
        };
        assert!(matches!(
            config.build(),
            Err(SourceError::Config { .. })
        ));
    }

    #[test]
    fn accepts_tab_escape_delimiter() {
        assert_eq!(delimiter_byte(Some("\\t")).unwrap(), b'\t');
        assert_eq!(delimiter_byte(Some("\t")).unwrap(), b'\t');
        assert_eq!(delimiter_byte(None).unwrap(), b',');
    }
}
