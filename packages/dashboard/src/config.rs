//! Dashboard configuration loaded from TOML.
//!
//! Without an explicit file the embedded `config/default.toml` is used.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shelter_stats_analytics_models::DEFAULT_HISTOGRAM_BINS;
use shelter_stats_source::SourceError;
use shelter_stats_source::normalize::FieldMapping;
use shelter_stats_source::source_def::FetcherConfig;

/// The embedded default configuration.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config is not valid TOML or has the wrong shape.
    #[error("Invalid dashboard config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The configured fetcher cannot be built.
    #[error("Invalid fetcher config: {0}")]
    Source(#[from] SourceError),
}

const fn default_histogram_bins() -> NonZeroUsize {
    match NonZeroUsize::new(DEFAULT_HISTOGRAM_BINS) {
        Some(bins) => bins,
        None => NonZeroUsize::MIN,
    }
}

fn default_title() -> String {
    "Animal Shelter Dashboard".to_string()
}

/// Top-level dashboard settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Heading shown above the views.
    #[serde(default = "default_title")]
    pub title: String,
    /// Query key passed to the data source and used as the cache key.
    pub query_key: String,
    /// Number of age histogram buckets. Must be at least one.
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: NonZeroUsize,
    /// Where raw rows come from.
    pub fetcher: FetcherConfig,
    /// Source column names for each record field.
    #[serde(default)]
    pub fields: FieldMapping,
}

impl DashboardConfig {
    /// Parses a config from TOML text. Relative fetcher paths are left
    /// as written.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text is malformed.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// The embedded default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the embedded file is malformed.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml(DEFAULT_CONFIG_TOML)
    }

    /// Loads a config file. Relative fetcher paths resolve against the
    /// file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text)?;
        if let Some(base) = path.parent() {
            config.rebase_paths(base);
        }
        log::debug!("Loaded dashboard config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` if given, otherwise the embedded default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config cannot be read or parsed.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(Self::embedded, Self::load)
    }

    fn rebase_paths(&mut self, base: &Path) {
        match &mut self.fetcher {
            FetcherConfig::CsvFile { path, .. } | FetcherConfig::JsonFile { path } => {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
            FetcherConfig::CsvDownload { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_default_parses() {
        let config = DashboardConfig::embedded().unwrap();
        assert_eq!(config.title, "Animal Shelter Dashboard");
        assert_eq!(
            config.query_key,
            "animalshelter-452610.animal_shelter_data.processed_animalshelterdata"
        );
        assert_eq!(config.histogram_bins.get(), 20);
        assert_eq!(config.fields, FieldMapping::default());
        assert_eq!(
            config.fetcher,
            FetcherConfig::CsvFile {
                path: PathBuf::from("data/animal_shelter.csv"),
                delimiter: None,
            }
        );
    }

    #[test]
    fn defaults_fill_optional_keys() {
        let config = DashboardConfig::from_toml(
            r#"
            query_key = "shelter"

            [fetcher]
            type = "json_file"
            path = "rows.json"

            [fields]
            animal_type = "Species"
            "#,
        )
        .unwrap();
        assert_eq!(config.title, "Animal Shelter Dashboard");
        assert_eq!(config.histogram_bins.get(), DEFAULT_HISTOGRAM_BINS);
        assert_eq!(config.fields.animal_type, "Species");
        assert_eq!(config.fields.month, "Month");
    }

    #[test]
    fn zero_histogram_bins_is_rejected() {
        let result = DashboardConfig::from_toml(
            r#"
            query_key = "shelter"
            histogram_bins = 0

            [fetcher]
            type = "csv_file"
            path = "rows.csv"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_resolves_relative_paths_against_config_dir() {
        let dir = std::env::temp_dir().join(format!("shelter_stats_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let config_path = dir.join("dashboard.toml");
        std::fs::write(
            &config_path,
            r#"
            query_key = "shelter"

            [fetcher]
            type = "csv_file"
            path = "data/rows.csv"
            "#,
        )
        .unwrap();

        let config = DashboardConfig::load(&config_path).unwrap();
        assert_eq!(
            config.fetcher,
            FetcherConfig::CsvFile {
                path: dir.join("data/rows.csv"),
                delimiter: None,
            }
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("shelter_stats_no_such_config.toml");
        assert!(matches!(
            DashboardConfig::load(&path),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn io_error_names_the_file() {
        let path = std::env::temp_dir().join("shelter_stats_no_such_config.toml");
        let err = DashboardConfig::load(&path).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Failed to read config file "));
        assert!(message.contains("shelter_stats_no_such_config.toml"));
    }
}
