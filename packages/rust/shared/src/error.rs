//! Error types for SiteSearch.
//!
//! Library crates use [`SiteSearchError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all SiteSearch operations.
#[derive(Debug, thiserror::Error)]
pub enum SiteSearchError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a page or sitemap.
    #[error("network error: {0}")]
    Network(String),

    /// Sitemap, robots.txt or HTML parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid input (bad URL, unsupported option, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Writing extracted fragments to the output destination failed.
    #[error("output error: {0}")]
    Output(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SiteSearchError>;

impl SiteSearchError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SiteSearchError::config("unknown key `workerz`");
        assert_eq!(err.to_string(), "config error: unknown key `workerz`");

        let err = SiteSearchError::Network("https://example.com/: HTTP 503".into());
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[test]
    fn io_error_keeps_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = SiteSearchError::io("/tmp/abstracts.jsonl", source);
        let msg = err.to_string();
        assert!(msg.contains("abstracts.jsonl"));
        assert!(msg.contains("gone"));
    }
}
