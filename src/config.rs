use crate::query::occurs::DEFAULT_MAX_OCCURS;
use crate::query::scorer::ScoringWeights;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "termsearch";
const CONFIG_FILE: &str = "config.json";

/// Search configuration, read from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of results kept per query (K)
    #[serde(default = "default_result_capacity")]
    pub result_capacity: usize,

    /// Results per printed page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Occurrence positions kept per result for highlighting
    #[serde(default = "default_max_highlight_occurs")]
    pub max_highlight_occurs: usize,

    /// Add the term proximity bonus to scores
    #[serde(default = "default_proximity")]
    pub proximity: bool,

    #[serde(default = "default_max_query_terms")]
    pub max_query_terms: usize,

    /// Longest accepted query term, in bytes
    #[serde(default = "default_max_term_bytes")]
    pub max_term_bytes: usize,

    /// Posting lists kept decoded in memory (0 disables the cache)
    #[serde(default = "default_posting_cache_capacity")]
    pub posting_cache_capacity: usize,

    /// Largest document text loaded for highlighting
    #[serde(default = "default_max_text_bytes")]
    pub max_text_bytes: usize,

    #[serde(default)]
    pub scoring: ScoringWeights,
}

fn default_result_capacity() -> usize {
    100
}

fn default_page_size() -> usize {
    10
}

fn default_max_highlight_occurs() -> usize {
    DEFAULT_MAX_OCCURS
}

fn default_proximity() -> bool {
    true
}

fn default_max_query_terms() -> usize {
    16
}

fn default_max_term_bytes() -> usize {
    256
}

fn default_posting_cache_capacity() -> usize {
    64
}

fn default_max_text_bytes() -> usize {
    8 * 1024 * 1024
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_capacity: default_result_capacity(),
            page_size: default_page_size(),
            max_highlight_occurs: default_max_highlight_occurs(),
            proximity: default_proximity(),
            max_query_terms: default_max_query_terms(),
            max_term_bytes: default_max_term_bytes(),
            posting_cache_capacity: default_posting_cache_capacity(),
            max_text_bytes: default_max_text_bytes(),
            scoring: ScoringWeights::default(),
        }
    }
}

impl SearchConfig {
    /// Load config from `path`, else from the user config directory,
    /// else return defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::read(path);
        }

        match get_config_path() {
            Some(config_path) if config_path.exists() => Self::read(&config_path),
            _ => Ok(Self::default()),
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SearchConfig =
            serde_json::from_str(&content).context("Failed to parse config file")?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

/// Default config location: `<config_dir>/termsearch/config.json`
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.result_capacity, 100);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.max_highlight_occurs, 16);
        assert!(config.proximity);
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"page_size": 3, "scoring": {"b": 0.5}}"#).unwrap();

        let config = SearchConfig::load(Some(&path)).unwrap();
        assert_eq!(config.page_size, 3);
        assert_eq!(config.result_capacity, 100);
        assert_eq!(config.scoring.b, 0.5);
        assert_eq!(config.scoring.k1, 1.2);
    }

    #[test]
    fn test_full_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let config = SearchConfig {
            result_capacity: 7,
            proximity: false,
            ..Default::default()
        };
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = SearchConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.result_capacity, 7);
        assert!(!loaded.proximity);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(SearchConfig::load(Some(&dir.path().join("absent.json"))).is_err());
    }
}
