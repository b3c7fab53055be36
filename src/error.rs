use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the engine.
///
/// Per-file problems (`ParseFailed`, `WorkerCrashed`) are recovered locally by
/// the coordinator — they are logged and the file contributes only its file
/// node. Configuration and grammar problems abort the run before or during
/// setup. `VcsUnavailable` downgrades git-based ranking to all-zero ranks.
#[derive(Debug, Error)]
pub enum RepomapError {
    /// The grammar for a registered language could not be loaded or its
    /// capture query failed to compile. Other languages continue.
    #[error("failed to load grammar for language '{0}'")]
    GrammarLoadFailed(String),

    /// Tree-sitter returned no syntax tree for a file.
    #[error("failed to parse {0}")]
    ParseFailed(String),

    /// A configuration field failed validation. Raised before any work begins.
    #[error("invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    /// A worker panicked while analyzing a file. Treated like `ParseFailed`.
    #[error("worker crashed while analyzing {0}")]
    WorkerCrashed(String),

    /// The repository's version-control history could not be read.
    #[error("version control history unavailable")]
    VcsUnavailable(#[source] git2::Error),

    #[error("io error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RepomapError {
    pub fn invalid_config(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RepomapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_message_names_field() {
        let err = RepomapError::invalid_config("ranking-strategy", "unknown value 'foo'");
        let msg = err.to_string();
        assert!(msg.contains("ranking-strategy"));
        assert!(msg.contains("foo"));
    }

    #[test]
    fn test_io_error_preserves_cause() {
        use std::error::Error;
        let err = RepomapError::Io {
            path: PathBuf::from("src/main.ts"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some(), "cause chain should be preserved");
    }
}
