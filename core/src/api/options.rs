//! Configuration options for the sift engine.
//!
//! Every options struct implements `Default` and deserializes with
//! missing fields taking their defaults, so hosts can keep partial
//! configuration in JSON:
//!
//! ```
//! use sift_core::api::EngineOptions;
//!
//! let options = EngineOptions::from_json(r#"{"execution": {"max_depth": 64}}"#).unwrap();
//! assert_eq!(options.execution.max_depth, 64);
//! assert!(options.execution.strict_indexing);
//! ```

use serde::Deserialize;

use super::Error;
use crate::evaluator::EvaluatorOptions;

/// Configuration options for compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilationOptions {
    /// Maximum syntactic nesting of the filter.
    ///
    /// Default: 500
    pub max_depth: usize,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            max_depth: crate::compiler::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Configuration options for parsing JSON input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InputOptions {
    /// Maximum number of nested arrays and objects.
    ///
    /// Default: 512
    pub max_depth: usize,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            max_depth: crate::values::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Configuration options for filter execution.
///
/// These options control resource limits and runtime behavior during evaluation.
///
/// # Example
///
/// ```
/// use sift_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions {
///     max_depth: 64,
///     strict_indexing: false,
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecutionOptions {
    /// Maximum depth of user function calls (for recursion protection).
    ///
    /// Default: 256
    pub max_depth: usize,

    /// Whether `.[i]` outside the array is an error instead of `null`.
    ///
    /// Default: true
    pub strict_indexing: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let defaults = EvaluatorOptions::default();
        Self {
            max_depth: defaults.max_depth,
            strict_indexing: defaults.strict_indexing,
        }
    }
}

impl From<ExecutionOptions> for EvaluatorOptions {
    fn from(options: ExecutionOptions) -> Self {
        EvaluatorOptions {
            max_depth: options.max_depth,
            strict_indexing: options.strict_indexing,
        }
    }
}

/// Configuration options for the sift engine.
///
/// These options set the limits for every stage of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub compilation: CompilationOptions,
    pub input: InputOptions,
    pub execution: ExecutionOptions,
}

impl EngineOptions {
    /// Read options from JSON text; absent fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|err| Error::Api(format!("Invalid engine options: {}", err)))
    }
}
