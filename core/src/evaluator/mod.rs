//! Lazy evaluator for compiled filters.
//!
//! [`run`] returns the outputs of a [`Program`] on one input as a pull
//! based iterator of `Result<Value, ExecutionError>`. Nothing is computed
//! before the first pull, and dropping the iterator abandons the rest of
//! the run.
//!
//! ## Design Principles
//!
//! - **Never panic**: failures surface as `Err` items.
//! - **Stack-safe**: function call depth is bounded by
//!   [`EvaluatorOptions::max_depth`]; `recurse`, `range`, `while`, `until`
//!   and `..` run on explicit stacks.
//! - **Not `Send`**: environments are `Rc` lists, so the iterator stays on
//!   the thread that created it. The [`Program`] itself is shared freely.
//!
//! ## Example
//!
//! ```
//! use sift_core::{compiler, evaluator, Value};
//!
//! let program = compiler::compile(".[] | . * 2").unwrap();
//! let outputs: Vec<Value> = evaluator::run(&program, Value::parse("[1, 2]"))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(outputs, vec![Value::from(2.0), Value::from(4.0)]);
//! ```

mod env;
mod error;
mod eval;
pub(crate) mod operators;
mod paths;

#[cfg(test)]
mod paths_test;

pub use error::{ExecutionError, ResourceExceededError, RuntimeError};
pub use eval::Outputs;

use crate::compiler::Program;
use crate::values::Value;
use env::{Binding, Env};
use eval::{Ctx, defer};

/// Default maximum function call depth.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Runtime limits and behaviour of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorOptions {
    /// Maximum function call depth.
    pub max_depth: usize,
    /// Whether `.[i]` outside the array is an error (rather than `null`).
    pub strict_indexing: bool,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_indexing: true,
        }
    }
}

/// Run a program without parameters, with default options.
pub fn run(program: &Program, input: Value) -> Outputs<'_> {
    run_with(program, input, &[], EvaluatorOptions::default())
}

/// Run a program. `args` are the values of the program's parameters, in
/// the order of [`Program::params`].
pub fn run_with<'p>(
    program: &'p Program,
    input: Value,
    args: &[Value],
    options: EvaluatorOptions,
) -> Outputs<'p> {
    let ctx = Ctx {
        prelude: program.prelude(),
        max_depth: options.max_depth,
        strict: options.strict_indexing,
        depth: 0,
    };
    let env = args
        .iter()
        .fold(Env::default(), |env, arg| env.push(Binding::Var(arg.clone())));
    defer(move || eval::eval(ctx, program.root(), &env, input))
}
