use std::path::PathBuf;
use thiserror::Error;

/// Problems with user configuration. Fatal before any generation starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
    #[error("Auxiliary input files not found: {}", .0.join(", "))]
    MissingFiles(Vec<String>),
}

/// A generated history failed one of its structural invariants.
///
/// These indicate a logic defect or impossible input; the affected replicate
/// is abandoned rather than written in an inconsistent state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("Invalid generator input: {0}")]
    InvalidInput(String),
    #[error("Gave up sampling {what} after {attempts} attempts")]
    RetryLimit { what: &'static str, attempts: usize },
    #[error("Variable closure violated: {0}")]
    Closure(String),
    #[error("Migration matrix indices inconsistent: {0}")]
    MatrixIndex(String),
}

/// A topology or parameters file does not follow the fixed line format.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Unexpected end of file while reading {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("Line {line}: expected {expected}, found '{found}'")]
    Unexpected {
        line: usize,
        expected: &'static str,
        found: String,
    },
    #[error("Line {line}: invalid number '{value}'")]
    InvalidNumber { line: usize, value: String },
}

/// Error type for the whole crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
