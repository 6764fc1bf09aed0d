//! Public error types for the sift API.
//!
//! This module defines the stable error types exposed to library users.
//! Internal errors (`ParseError`, `CompileError`, `ExecutionError`,
//! `JsonError`) are converted to these public types at API boundaries.

use core::fmt;

use crate::parser::Span;

/// Public error type for all sift operations.
///
/// Only the first error of a run is ever reported; later stages never start
/// once one has failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Malformed JSON input.
    #[error("Invalid JSON input: {}", .diagnostic.message)]
    Syntax { diagnostic: Diagnostic, src: String },

    /// Malformed or semantically invalid filter source.
    #[error("{}", .diagnostic.message)]
    Compilation { diagnostic: Diagnostic, src: String },

    /// Evaluation errors: type mismatches, division by zero, out of range
    /// indices, invalid paths and values raised with `error`.
    #[error("{0}")]
    Runtime(String),

    /// Resource limits exceeded (call depth).
    #[error("{0}")]
    ResourceExceeded(String),

    /// Invalid API usage: a stage called out of order, a wrong number of
    /// filter arguments.
    #[error("API error: {0}")]
    Api(String),
}

impl Error {
    /// The plain message, without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Error::Syntax { diagnostic, .. } | Error::Compilation { diagnostic, .. } => {
                &diagnostic.message
            }
            Error::Runtime(msg) | Error::ResourceExceeded(msg) | Error::Api(msg) => msg,
        }
    }

    /// The structured diagnostic for errors that point into source text.
    pub fn diagnostic(&self) -> Option<(&Diagnostic, &str)> {
        match self {
            Error::Syntax { diagnostic, src } | Error::Compilation { diagnostic, src } => {
                Some((diagnostic, src))
            }
            _ => None,
        }
    }
}

/// A diagnostic message with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level (error, warning, or info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Byte range of the primary issue in the source text.
    pub span: Span,

    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,

    /// Optional error code (e.g., "P001", "C002").
    pub code: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span,
            help: None,
            code: None,
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - compilation cannot succeed.
    Error,
    /// Warning - suspicious code that might be wrong.
    Warning,
    /// Info - informational message.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

// ============================================================================
// Conversion from internal errors
// ============================================================================

impl From<crate::parser::ParseError> for Error {
    fn from(err: crate::parser::ParseError) -> Self {
        Error::Compilation {
            diagnostic: err.to_diagnostic(),
            src: err.source,
        }
    }
}

impl From<crate::compiler::CompileError> for Error {
    fn from(err: crate::compiler::CompileError) -> Self {
        Error::Compilation {
            diagnostic: err.to_diagnostic(),
            src: err.source().to_string(),
        }
    }
}

impl From<crate::evaluator::ExecutionError> for Error {
    fn from(err: crate::evaluator::ExecutionError) -> Self {
        use crate::evaluator::ExecutionError;
        match err {
            ExecutionError::ResourceExceeded(res_err) => Error::ResourceExceeded(res_err.to_string()),
            ExecutionError::Runtime(runtime_err) => Error::Runtime(runtime_err.to_string()),
        }
    }
}

impl Error {
    /// Wrap a JSON syntax error together with the text it was found in.
    pub fn from_json(err: crate::values::JsonError, src: &str) -> Self {
        let end = (err.offset + 1).min(src.len()).max(err.offset);
        Error::Syntax {
            diagnostic: Diagnostic::error(err.message, Span::new(err.offset, end)).with_code("J001"),
            src: src.to_string(),
        }
    }
}
