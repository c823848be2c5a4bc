//! Optional TOML configuration. Every field has a default, so an empty file
//! (or no file at all) is a valid configuration; command-line flags
//! override whatever is loaded here.

use crate::error::ConfigError;
use crate::types::Granularity;
use crate::views::ViewKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// CSV export to report on.
    pub source: Option<PathBuf>,
    pub view: ViewKind,
    pub granularity: Granularity,
    /// Raw free-text answers shown per question.
    pub top_responses: usize,
    /// Words shown per free-text question.
    pub top_words: usize,
    pub week_over_week: bool,
    /// Used when `RUST_LOG` is unset.
    pub log_level: String,
    pub json_output: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub preview_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: None,
            view: ViewKind::default(),
            granularity: Granularity::default(),
            top_responses: 5,
            top_words: 10,
            week_over_week: true,
            log_level: "info".to_string(),
            json_output: None,
            export_dir: None,
            preview_rows: 0,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
