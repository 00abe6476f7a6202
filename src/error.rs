use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Export error types
#[derive(Error, Debug)]
pub enum ExportError {
    /// A limit handed straight to the runner was not a finite positive number
    #[error("Invalid configuration: {0}")]
    InvalidConfigurationError(String),

    /// The source repository could not be located or validated
    #[error("Setup error: {message}\n  hint: {hint}")]
    SetupError { message: String, hint: String },

    #[error("Security error: {} resolves outside the repository root", .0.display())]
    SecurityError(PathBuf),

    #[error("Discovery error: {0}")]
    DiscoveryError(String),

    #[error("Decode error in {}: {message}", path.display())]
    DecodeError { path: PathBuf, message: String },

    #[error("Failed to load set file {}: {source}", path.display())]
    SetLoadError {
        path: PathBuf,
        #[source]
        source: Box<ExportError>,
    },

    #[error("Failed to load card file {}: {source}", path.display())]
    CardLoadError {
        path: PathBuf,
        #[source]
        source: Box<ExportError>,
    },

    #[error("Persistence error on {}: {source}", path.display())]
    PersistenceError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Task failed: {0}")]
    TaskError(String),

    #[error(transparent)]
    IoError(#[from] io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    ConfigError(#[from] config::ConfigError),
}

impl ExportError {
    pub fn setup(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::SetupError {
            message: message.into(),
            hint: hint.into(),
        }
    }

    pub fn decode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DecodeError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::PersistenceError {
            path: path.into(),
            source,
        }
    }

    /// Path of the file a batch failed on, if this is a wrapped load failure
    pub fn failing_path(&self) -> Option<&PathBuf> {
        match self {
            Self::SetLoadError { path, .. } | Self::CardLoadError { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<std::convert::Infallible> for ExportError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_renders_hint() {
        let err = ExportError::setup("repository missing", "clone it next to the project");
        let rendered = err.to_string();
        assert!(rendered.contains("repository missing"));
        assert!(rendered.contains("hint: clone it next to the project"));
    }

    #[test]
    fn test_load_errors_have_distinct_prefixes() {
        let inner = || Box::new(ExportError::decode("x.json", "bad"));
        let set_err = ExportError::SetLoadError {
            path: PathBuf::from("data/s/a.json"),
            source: inner(),
        };
        let card_err = ExportError::CardLoadError {
            path: PathBuf::from("data/s/a/1.json"),
            source: inner(),
        };
        assert!(set_err.to_string().starts_with("Failed to load set file data/s/a.json"));
        assert!(card_err.to_string().starts_with("Failed to load card file data/s/a/1.json"));
        assert_eq!(set_err.failing_path(), Some(&PathBuf::from("data/s/a.json")));
    }
}
