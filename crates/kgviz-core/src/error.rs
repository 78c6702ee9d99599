//! Top-level error type

use crate::config::ConfigError;
use kgviz_reactive::{DeadlineError, FirstValueError};
use kgviz_sankey::{DocumentError, ResolutionError};

/// kgviz errors
#[derive(Debug, thiserror::Error)]
pub enum KgvizError {
    /// Configuration could not be loaded or is inconsistent
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Graph document could not be parsed
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Graph links could not be resolved, or contain a cycle
    #[error("resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// Deadline passed, or the raced task died
    #[error("{0}")]
    Deadline(#[from] DeadlineError),

    /// A one-shot read found an empty stream
    #[error("{0}")]
    FirstValue(#[from] FirstValueError),

    /// Document source could not be read
    #[error("I/O error reading {location}: {source}")]
    Io {
        /// Location that was read
        location: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl KgvizError {
    /// Check if error is retryable
    ///
    /// Timeouts and I/O failures may succeed on a second attempt; malformed
    /// input never will.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Deadline(DeadlineError::Elapsed { .. }) | Self::Io { .. }
        )
    }

    /// Create an I/O error for a location
    #[inline]
    pub fn io(location: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            location: location.into(),
            source,
        }
    }
}

/// Result alias for kgviz operations
pub type Result<T> = std::result::Result<T, KgvizError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn timeouts_and_io_are_retryable() {
        let elapsed = KgvizError::from(DeadlineError::Elapsed {
            after: Duration::from_millis(10),
        });
        assert!(elapsed.is_retryable());

        let io = KgvizError::io(
            "graph.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(io.is_retryable());
        assert!(io.to_string().contains("graph.json"));
    }

    #[test]
    fn malformed_input_is_not_retryable() {
        let err = KgvizError::from(ResolutionError::DuplicateNodeId { id: "a".to_string() });
        assert!(!err.is_retryable());
        assert!(!KgvizError::from(DeadlineError::Aborted("panic".to_string())).is_retryable());
        assert!(!KgvizError::from(DeadlineError::NoRuntime).is_retryable());
        assert!(!KgvizError::from(FirstValueError::Empty).is_retryable());
    }
}
