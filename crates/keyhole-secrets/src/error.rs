use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building layered configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required settings file is missing or unreadable
    #[error("Failed to read settings file '{path}': {message}")]
    FileError { path: PathBuf, message: String },

    /// Settings content is not valid JSON
    #[error("Invalid JSON in '{source_name}': {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// Settings content parsed, but the document root is not an object
    #[error("Settings in '{source_name}' must be a JSON object at the root")]
    InvalidRoot { source_name: String },
}

impl ConfigError {
    /// Create a file error
    pub fn file(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}
