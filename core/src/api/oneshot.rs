//! One-call helpers with default options.

use super::{CompiledFilter, Engine, Error, Policy, Session};
use crate::values::Value;

/// Version of the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compile a filter with default options.
pub fn compile_filter(source: &str) -> Result<CompiledFilter, Error> {
    Engine::default().compile(source)
}

/// Parse JSON text with default limits.
pub fn parse_json(text: &str) -> Result<Value, Error> {
    Engine::default().parse_json(text)
}

/// Run a compiled filter on `input` and shape the outputs with `policy`.
pub fn evaluate(filter: &CompiledFilter, input: Value, policy: Policy) -> Result<Value, Error> {
    filter.evaluate(input, policy)
}

/// Compile `filter`, parse `input` and evaluate, stopping at the first
/// failing stage.
///
/// ```
/// use sift_core::api::{Policy, run};
/// use sift_core::Value;
///
/// let result = run(r#"{"a":[{"b":1},{"b":2}]}"#, ".a[] | .b", Policy::All).unwrap();
/// assert_eq!(result, Value::parse("[1, 2]"));
/// ```
pub fn run(input: &str, filter: &str, policy: Policy) -> Result<Value, Error> {
    let mut session = Session::new(Engine::default());
    session.compile(filter)?;
    session.parse_input(input)?;
    session.evaluate(policy)
}

/// Whether `source` compiles.
pub fn validate_filter(source: &str) -> Result<(), Error> {
    compile_filter(source).map(drop)
}

/// Whether `text` is a well-formed JSON document.
pub fn validate_json(text: &str) -> Result<(), Error> {
    parse_json(text).map(drop)
}
