//! The crate-level error type
//!
//! Module-specific errors ([`CompileError`], [`ExpressionParseError`]) stay
//! in their modules; this aggregates them for callers that drive the whole
//! pipeline, like the CLI loading a world dump from disk.

use crate::compiler::CompileError;
use crate::expression::ExpressionParseError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum TrackerError {
    /// The world description could not be compiled into a graph.
    Compile(CompileError),
    /// A requirement expression failed to parse.
    Parse(ExpressionParseError),
    /// The world dump was not valid JSON.
    Json(serde_json::Error),
    /// IO error wrapper.
    Io(io::Error),
    /// A name given by the caller does not exist in the loaded world.
    UnknownName { kind: &'static str, name: String },
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::Compile(err) => write!(f, "{}", err),
            TrackerError::Parse(err) => write!(f, "{}", err),
            TrackerError::Json(err) => write!(f, "invalid world dump: {}", err),
            TrackerError::Io(err) => write!(f, "{}", err),
            TrackerError::UnknownName { kind, name } => {
                write!(f, "no {} named {:?} in this world", kind, name)
            }
        }
    }
}

impl std::error::Error for TrackerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackerError::Compile(err) => Some(err),
            TrackerError::Parse(err) => Some(err),
            TrackerError::Json(err) => Some(err),
            TrackerError::Io(err) => Some(err),
            TrackerError::UnknownName { .. } => None,
        }
    }
}

impl From<CompileError> for TrackerError {
    fn from(err: CompileError) -> Self {
        TrackerError::Compile(err)
    }
}

impl From<ExpressionParseError> for TrackerError {
    fn from(err: ExpressionParseError) -> Self {
        TrackerError::Parse(err)
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Json(err)
    }
}

impl From<io::Error> for TrackerError {
    fn from(err: io::Error) -> Self {
        TrackerError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn unknown_name_display() {
        let err = TrackerError::UnknownName {
            kind: "check",
            name: "SV - Missing Chest".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("check"));
        assert!(msg.contains("SV - Missing Chest"));
        assert!(err.source().is_none());
    }

    #[test]
    fn io_error_carries_source() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "no such dump");
        let err: TrackerError = io_err.into();
        assert!(err.to_string().contains("no such dump"));
        assert!(err.source().is_some());
    }
}
