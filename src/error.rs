use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a table from a data source.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read `{location}`: {source}")]
    Unreachable {
        location: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed data in `{location}`: {source}")]
    Malformed {
        location: String,
        #[source]
        source: csv::Error,
    },
    #[error("unsupported source `{location}` (expected a .csv file)")]
    Unsupported { location: String },
}

/// Required columns absent from a table. Lists every missing name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required columns: {}", .missing.join(", "))]
pub struct SchemaViolation {
    pub missing: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Schema(#[from] SchemaViolation),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write CSV `{path}`: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}
