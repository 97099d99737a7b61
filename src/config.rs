// ⚙️ Scanner Configuration
// Optional JSON file, then environment overrides.
//
//   RECEIPT_SCANNER_LOCALE    built-in keyword table ("japanese", "english")
//   RECEIPT_SCANNER_KEYWORDS  path to a JSON keyword table (wins over locale)
//   RECEIPT_SCANNER_LOG       log level when RUST_LOG is unset
//   RECEIPT_SCANNER_LOG_DIR   directory for rolling log files

use crate::error::ConfigError;
use crate::keywords::KeywordTable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_LOCALE: &str = "RECEIPT_SCANNER_LOCALE";
pub const ENV_KEYWORDS: &str = "RECEIPT_SCANNER_KEYWORDS";
pub const ENV_LOG: &str = "RECEIPT_SCANNER_LOG";
pub const ENV_LOG_DIR: &str = "RECEIPT_SCANNER_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Built-in keyword table name
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Custom keyword table, overrides `locale`
    #[serde(default)]
    pub keyword_file: Option<PathBuf>,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// No file logging when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_locale() -> String {
    "japanese".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            locale: default_locale(),
            keyword_file: None,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl ScannerConfig {
    /// Load from an optional JSON file and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => ScannerConfig::from_file(path)?,
            None => ScannerConfig::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply overrides from `lookup` (the process environment in [`ScannerConfig::load`])
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(locale) = non_empty(ENV_LOCALE) {
            self.locale = locale;
        }
        if let Some(file) = non_empty(ENV_KEYWORDS) {
            self.keyword_file = Some(PathBuf::from(file));
        }
        if let Some(level) = non_empty(ENV_LOG) {
            self.log_level = level;
        }
        if let Some(dir) = non_empty(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Keyword table selected by this config
    pub fn keyword_table(&self) -> Result<KeywordTable, ConfigError> {
        match &self.keyword_file {
            Some(path) => KeywordTable::from_file(path),
            None => Ok(KeywordTable::by_name(&self.locale)?),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
