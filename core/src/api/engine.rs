//! The sift compilation engine.

use super::{CompiledFilter, EngineOptions, Error};
use crate::compiler;
use crate::values::{Value, parse_json_with_max_depth};

/// The sift compilation engine.
///
/// The engine holds the options every filter it compiles will run with.
/// It owns no other state: compiling the same source twice yields two
/// independent filters, and the engine can be shared between threads.
///
/// # Example
///
/// ```
/// use sift_core::api::{Engine, EngineOptions};
/// use sift_core::Value;
///
/// let engine = Engine::new(EngineOptions::default());
///
/// // Compile a filter
/// let filter = engine.compile(".a + 1").unwrap();
///
/// // Execute
/// let outputs: Vec<Value> = filter
///     .run(Value::parse(r#"{"a": 41}"#))
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(outputs, vec![Value::from(42.0)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: EngineOptions,
}

impl Engine {
    /// Create a new engine.
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Access the engine options.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Compile a filter that takes no parameters.
    pub fn compile(&self, source: &str) -> Result<CompiledFilter, Error> {
        self.compile_with_params(source, &[])
    }

    /// Compile a filter.
    ///
    /// # Parameters
    ///
    /// - `source`: The filter source
    /// - `params`: Names of the `$name` variables the filter reads, without
    ///   the `$`; their values are supplied to [`CompiledFilter::run_with`]
    ///   in the same order
    ///
    /// # Example
    ///
    /// ```
    /// # use sift_core::api::{Engine, EngineOptions};
    /// # use sift_core::Value;
    /// let engine = Engine::new(EngineOptions::default());
    /// let filter = engine.compile_with_params("$x + $y", &["x", "y"]).unwrap();
    ///
    /// let mut outputs = filter.run_with(Value::Null, &[Value::from(10.0), Value::from(32.0)]).unwrap();
    /// assert_eq!(outputs.next(), Some(Ok(Value::from(42.0))));
    /// ```
    pub fn compile_with_params(&self, source: &str, params: &[&str]) -> Result<CompiledFilter, Error> {
        let params: Vec<String> = params.iter().map(|name| name.to_string()).collect();
        let program = compiler::compile_with(source, &params, self.options.compilation.max_depth)?;
        Ok(CompiledFilter::new(program, self.options.execution))
    }

    /// Parse JSON text with the engine's input limits.
    pub fn parse_json(&self, text: &str) -> Result<Value, Error> {
        parse_json_with_max_depth(text, self.options.input.max_depth)
            .map_err(|err| Error::from_json(err, text))
    }
}
