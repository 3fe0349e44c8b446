//! Errors raised by payload handling and by handlers themselves.

use std::fmt;

/// Failure while turning a payload into text or back, or while reading
/// typed values out of an argument list.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("payload json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("argument index {index} out of range (len={len})")]
    MissingArgument { index: usize, len: usize },
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// HandlerError is what a handler returns when it could not process an event.
///
/// Carries a message and, optionally, the underlying cause.
#[derive(Debug)]
pub struct HandlerError {
    message: String,
    source: Option<BoxError>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error, keeping it reachable through `source()`.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.message, source),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<CodecError> for HandlerError {
    fn from(err: CodecError) -> Self {
        Self::with_source("argument decode", err)
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_includes_source() {
        let io = std::io::Error::other("disk gone");
        let err = HandlerError::with_source("write log", io);
        assert_eq!(err.to_string(), "write log: disk gone");
        assert!(err.source().is_some());
    }

    #[test]
    fn plain_message_has_no_source() {
        let err = HandlerError::from("nope");
        assert_eq!(err.message(), "nope");
        assert!(err.source().is_none());
    }
}
