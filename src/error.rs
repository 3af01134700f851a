use std::path::PathBuf;

use thiserror::Error;

/// Main error type for tsdocgen operations
#[derive(Error, Debug)]
pub enum DocgenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error in {}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl DocgenError {
    /// Wrap an IO failure with the path it happened on
    pub fn fs(action: &str, path: &std::path::Path, err: std::io::Error) -> Self {
        DocgenError::FileSystem(format!("failed to {} {}: {}", action, path.display(), err))
    }
}

pub type Result<T> = std::result::Result<T, DocgenError>;
