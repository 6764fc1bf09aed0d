//! Public API for the sift filter engine.
//!
//! This module provides the stable public API for compiling and running
//! filters. It offers three levels:
//!
//! 1. **One-call helpers**: [`run`], [`compile_filter`], [`parse_json`],
//!    [`evaluate`] and the `validate_*` functions, with default options
//! 2. **Engine**: [`Engine`] compiles [`CompiledFilter`]s with explicit
//!    [`EngineOptions`]; filters run lazily or under a [`Policy`]
//! 3. **Session**: [`Session`] drives one filter over one input stage by
//!    stage
//!
//! All errors are reported as [`Error`].
//!
//! # Example
//!
//! ```
//! use sift_core::api::{Engine, EngineOptions, Policy};
//! use sift_core::Value;
//!
//! let engine = Engine::new(EngineOptions::default());
//!
//! // Compile filter
//! let filter = engine.compile("map(. * 2)").unwrap();
//!
//! // Execute
//! let input = engine.parse_json("[1, 2, 3]").unwrap();
//! let result = filter.evaluate(input, Policy::First).unwrap();
//! assert_eq!(result, Value::parse("[2, 4, 6]"));
//! ```

pub mod engine;
pub mod error;
pub mod filter;
pub mod oneshot;
pub mod options;
pub mod policy;
pub mod session;


pub use engine::Engine;
pub use error::{Diagnostic, Error, Severity};
pub use filter::CompiledFilter;
pub use oneshot::{VERSION, compile_filter, evaluate, parse_json, run, validate_filter, validate_json};
pub use options::{CompilationOptions, EngineOptions, ExecutionOptions, InputOptions};
pub use policy::Policy;
pub use session::{Session, SessionStream, Stage};

use static_assertions::assert_impl_all;

assert_impl_all!(Engine: Send, Sync);
assert_impl_all!(Error: Send, Sync);
