//! Error types for backlog and sprint operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building the backlog or a sprint
#[derive(Error, Debug)]
pub enum BacklogError {
    #[error("Stories directory not found: {}", .0.display())]
    StoriesDirNotFound(PathBuf),

    #[error("No US-*.md files found in {}", .0.display())]
    NoStoryDocuments(PathBuf),

    #[error("{} not found", .0.display())]
    BacklogNotFound(PathBuf),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl BacklogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BacklogError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        BacklogError::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, BacklogError>;
