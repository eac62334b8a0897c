use thiserror::Error;

/// Classydoc error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Unable to resolve '{path}'")]
    Resolution { path: String },

    #[error("'{path}' does not refer to a class")]
    NotAClass { path: String },

    #[error("Cannot linearize ancestry of '{path}': {message}")]
    Linearization { path: String, message: String },

    #[error("Invalid registry snapshot: {0}")]
    Snapshot(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for classydoc operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create a resolution error for a dotted path
    pub fn resolution(path: impl Into<String>) -> Self {
        Error::Resolution { path: path.into() }
    }

    /// Create a not-a-class error for a dotted path
    pub fn not_a_class(path: impl Into<String>) -> Self {
        Error::NotAClass { path: path.into() }
    }

    /// Create a linearization error
    pub fn linearization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Linearization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-snapshot error
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Error::Snapshot(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// True when the error means a dotted path could not be resolved.
    ///
    /// Batch callers use this to skip-and-continue while single-item
    /// callers surface the failure.
    pub fn is_resolution(&self) -> bool {
        matches!(self, Error::Resolution { .. })
    }
}
