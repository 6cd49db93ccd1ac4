//! Errors surfaced by the post repository

use std::path::PathBuf;

/// Result type alias using `ContentError`
pub type Result<T> = std::result::Result<T, ContentError>;

/// Failures while reading posts. A missing post or a missing posts
/// directory is not an error.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The leading front-matter block could not be parsed
    #[error("Malformed front-matter in {path}: {message}")]
    MalformedFrontMatter { path: PathBuf, message: String },

    /// Filesystem failure (permissions, I/O)
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
