//! Core of the sift JSON filter engine.
//!
//! The pipeline is `parser` (filter text to AST) → `compiler` (AST to a
//! resolved [`compiler::Program`]) → `evaluator` (lazy stream of output
//! values). JSON input is parsed by [`values::parse_json`]. The [`api`]
//! module ties the stages together behind [`api::Engine`] and
//! [`api::Session`].

pub mod api;
pub mod compiler;
pub mod evaluator;
pub mod parser;
pub mod scope_stack;
pub mod stdlib;
pub mod syntax;
pub mod values;

pub use values::Value;
