//! Sift - a jq-style JSON filter engine
//!
//! # Overview
//!
//! Sift compiles filter programs written in a jq dialect and runs them
//! against JSON values. A filter maps one input to a lazy stream of zero or
//! more outputs:
//!
//! - `.a.b` reads a nested field
//! - `.[] | select(.age > 30)` streams matching array elements
//! - `map(.price * .qty) | add` aggregates
//! - `.items[0].tags |= sort` rewrites part of the input
//!
//! # Quick Start
//!
//! ```
//! use sift::{Engine, EngineOptions, Policy, Value};
//!
//! let engine = Engine::new(EngineOptions::default());
//! let filter = engine.compile("[.[] | . * 2]").unwrap();
//!
//! let input = engine.parse_json("[1, 2, 3]").unwrap();
//! let result = filter.evaluate(input, Policy::First).unwrap();
//! assert_eq!(result, Value::parse("[2, 4, 6]"));
//! ```
//!
//! # Output Policies
//!
//! [`Policy`] decides how the stream becomes one value: the first output,
//! all outputs as an array, or all outputs unwrapped when there is exactly
//! one. Use [`CompiledFilter::run`] to pull outputs one at a time instead.
//!
//! # Errors
//!
//! Every failure is an [`Error`]. Syntax and compilation errors carry a
//! [`Diagnostic`] pointing into the source text; [`render_error`] prints them
//! with a source snippet.

mod error_renderer;

// Re-export public API from sift_core
pub use sift_core::api::{
    CompilationOptions, CompiledFilter, Diagnostic, Engine, EngineOptions, Error,
    ExecutionOptions, InputOptions, Policy, Session, SessionStream, Severity, Stage, oneshot,
};

// Re-export commonly used values
pub use sift_core::values::{self, Kind, Value};

pub use error_renderer::{render_error, render_error_to, render_error_to_string, render_error_to_string_no_color};
