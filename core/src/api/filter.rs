//! Compiled filters.

use static_assertions::assert_impl_all;

use super::{Error, ExecutionOptions, Policy};
use crate::compiler::Program;
use crate::evaluator::{self, Outputs};
use crate::values::Value;

/// A compiled filter ready for execution.
///
/// A compiled filter owns its program and can be run any number of times,
/// on any thread; each run gets its own lazy output iterator.
///
/// # Execution
///
/// - **`run()`**: lazy outputs for a filter without parameters
/// - **`run_with()`**: lazy outputs, binding the filter's `$name`
///   parameters; validates the argument count
/// - **`evaluate()`**: run and shape the outputs with a [`Policy`]
///
/// # Example
///
/// ```
/// use sift_core::api::{Engine, EngineOptions, Policy};
/// use sift_core::Value;
///
/// let engine = Engine::new(EngineOptions::default());
/// let filter = engine.compile(".[] | select(. > 1)").unwrap();
///
/// let all = filter.evaluate(Value::parse("[1, 2, 3]"), Policy::All).unwrap();
/// assert_eq!(all, Value::parse("[2, 3]"));
///
/// let first = filter.evaluate(Value::parse("[1, 2, 3]"), Policy::First).unwrap();
/// assert_eq!(first, Value::from(2.0));
/// ```
#[derive(Debug)]
pub struct CompiledFilter {
    program: Program,
    options: ExecutionOptions,
}

assert_impl_all!(CompiledFilter: Send, Sync);

impl CompiledFilter {
    /// This is called internally by Engine::compile().
    pub(crate) fn new(program: Program, options: ExecutionOptions) -> Self {
        Self { program, options }
    }

    /// The resolved program.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Names of the filter's parameters, in the order `run_with` expects
    /// their values.
    pub fn params(&self) -> &[String] {
        self.program.params()
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// The same filter with other execution options.
    pub fn with_options(mut self, options: ExecutionOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the filter on one input.
    ///
    /// Nothing is evaluated until the first pull. A filter compiled with
    /// parameters fails on its first use of an unbound `$name`; use
    /// [`run_with`](Self::run_with) for those.
    pub fn run(&self, input: Value) -> Outputs<'_> {
        evaluator::run_with(&self.program, input, &[], self.options.into())
    }

    /// Run the filter with values for its parameters.
    ///
    /// # Errors
    ///
    /// `Error::Api` when the number of arguments differs from the number
    /// of parameters.
    pub fn run_with(&self, input: Value, args: &[Value]) -> Result<Outputs<'_>, Error> {
        let expected = self.program.params().len();
        if args.len() != expected {
            return Err(Error::Api(format!(
                "Argument count mismatch: expected {}, got {}",
                expected,
                args.len()
            )));
        }
        Ok(evaluator::run_with(
            &self.program,
            input,
            args,
            self.options.into(),
        ))
    }

    /// Run the filter and shape its outputs with `policy`.
    pub fn evaluate(&self, input: Value, policy: Policy) -> Result<Value, Error> {
        self.evaluate_with(input, &[], policy)
    }

    /// [`evaluate`](Self::evaluate) with parameter values.
    pub fn evaluate_with(&self, input: Value, args: &[Value], policy: Policy) -> Result<Value, Error> {
        policy.apply(self.run_with(input, args)?)
    }
}
