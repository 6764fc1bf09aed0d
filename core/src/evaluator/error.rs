//! Runtime evaluation errors.
//!
//! # Error Categories
//!
//! - **Runtime errors**: errors raised by the filter (type mismatches,
//!   division by zero, `error(...)`, out of range indices, invalid path
//!   expressions). `try` and `?` catch them; the caught value is what
//!   [`RuntimeError::value`] returns.
//!
//! - **Resource exceeded errors**: fatal resource limit violations. They
//!   propagate through `try` and `?` so a runaway filter cannot hide them.

use core::fmt;
use std::sync::Arc;

use crate::values::{DumpStyle, Value};

/// An error produced while pulling outputs from a running filter.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// Runtime error that `try` can catch.
    Runtime(RuntimeError),

    /// Resource limit exceeded (cannot be caught).
    ResourceExceeded(ResourceExceededError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// An operation failed on its operands.
    Message(String),

    /// `error(v)`: the raised value, caught as is.
    Raised(Value),

    /// Array index outside `0..len` under strict indexing.
    IndexOutOfBounds { index: i64, len: usize },

    /// A path expression produced something that is not a path.
    InvalidPath(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceExceededError {
    /// Function call depth exceeded.
    StackOverflow { depth: usize, max_depth: usize },
}

impl ExecutionError {
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_resource_exceeded(&self) -> bool {
        matches!(self, ExecutionError::ResourceExceeded(_))
    }
}

impl RuntimeError {
    /// The value a `catch` handler receives.
    pub fn value(&self) -> Value {
        match self {
            RuntimeError::Raised(value) => value.clone(),
            other => Value::string(other.to_string()),
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::Runtime(e) => write!(f, "{}", e),
            ExecutionError::ResourceExceeded(e) => write!(f, "{}", e),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::Message(message) => write!(f, "{}", message),
            RuntimeError::Raised(Value::String(message)) => write!(f, "{}", message),
            RuntimeError::Raised(value) => write!(f, "{} (not a string)", compact(value)),
            RuntimeError::IndexOutOfBounds { index, len } => {
                write!(f, "Index {} out of bounds (length: {})", index, len)
            }
            RuntimeError::InvalidPath(value) => {
                write!(f, "Invalid path expression with result {}", compact(value))
            }
        }
    }
}

fn compact(value: &Value) -> String {
    value
        .dump(DumpStyle::Compact)
        .unwrap_or_else(|_| value.to_string())
}

impl fmt::Display for ResourceExceededError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceExceededError::StackOverflow { depth, max_depth } => {
                write!(
                    f,
                    "Evaluation stack overflow: depth {} exceeds maximum of {}",
                    depth, max_depth
                )
            }
        }
    }
}

impl From<RuntimeError> for ExecutionError {
    fn from(e: RuntimeError) -> Self {
        ExecutionError::Runtime(e)
    }
}

impl From<ResourceExceededError> for ExecutionError {
    fn from(e: ResourceExceededError) -> Self {
        ExecutionError::ResourceExceeded(e)
    }
}

/// The message of an invalid value that reached the evaluator.
impl From<Arc<str>> for ExecutionError {
    fn from(message: Arc<str>) -> Self {
        ExecutionError::Runtime(RuntimeError::Message(message.to_string()))
    }
}

impl std::error::Error for ExecutionError {}

impl std::error::Error for RuntimeError {}

impl std::error::Error for ResourceExceededError {}
