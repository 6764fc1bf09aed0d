//! Staged execution of one filter on one input.
//!
//! A [`Session`] walks a fixed sequence of stages and refuses anything out
//! of order:
//!
//! ```text
//! Idle → Compiling → Compiled → Parsing → Parsed → Evaluating → Drained
//!            ↘ CompileFailed      ↘ ParseFailed        ↘ EvalFailed
//! ```
//!
//! A failed stage is terminal: the error of the first failing stage is the
//! result of the whole session. Every transition is logged at `debug`.

use core::cell::Cell;
use core::fmt;

use super::{CompiledFilter, Engine, Error, Policy};
use crate::evaluator::Outputs;
use crate::values::Value;

/// The stage a [`Session`] is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Idle,
    Compiling,
    CompileFailed,
    Compiled,
    Parsing,
    ParseFailed,
    Parsed,
    Evaluating,
    EvalFailed,
    Drained,
}

impl Stage {
    /// Whether no further stage can follow.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Stage::CompileFailed | Stage::ParseFailed | Stage::EvalFailed | Stage::Drained
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

fn transition(stage: &Cell<Stage>, next: Stage) {
    let from = stage.replace(next);
    tracing::debug!(%from, to = %next, "Session stage");
}

/// One filter applied to one input, stage by stage.
///
/// # Example
///
/// ```
/// use sift_core::api::{Engine, Policy, Session, Stage};
/// use sift_core::Value;
///
/// let mut session = Session::new(Engine::default());
/// session.compile(".a").unwrap();
/// session.parse_input(r#"{"a": [1, 2]}"#).unwrap();
/// assert_eq!(session.evaluate(Policy::First).unwrap(), Value::parse("[1, 2]"));
/// assert_eq!(session.stage(), Stage::Drained);
/// ```
#[derive(Debug)]
pub struct Session {
    engine: Engine,
    stage: Cell<Stage>,
    filter: Option<CompiledFilter>,
    input: Option<Value>,
}

impl Session {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            stage: Cell::new(Stage::Idle),
            filter: None,
            input: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage.get()
    }

    /// The compiled filter, once the session got past compilation.
    pub fn filter(&self) -> Option<&CompiledFilter> {
        self.filter.as_ref()
    }

    fn expect(&self, expected: Stage, action: &str) -> Result<(), Error> {
        let stage = self.stage.get();
        if stage == expected {
            Ok(())
        } else {
            Err(Error::Api(format!(
                "Cannot {} in stage {} (expected {})",
                action, stage, expected
            )))
        }
    }

    /// Compile a filter without parameters. Only valid in `Idle`.
    pub fn compile(&mut self, source: &str) -> Result<(), Error> {
        self.compile_with_params(source, &[])
    }

    /// Compile a filter reading the `$name` variables `params`.
    pub fn compile_with_params(&mut self, source: &str, params: &[&str]) -> Result<(), Error> {
        self.expect(Stage::Idle, "compile")?;
        transition(&self.stage, Stage::Compiling);
        match self.engine.compile_with_params(source, params) {
            Ok(filter) => {
                self.filter = Some(filter);
                transition(&self.stage, Stage::Compiled);
                Ok(())
            }
            Err(err) => {
                transition(&self.stage, Stage::CompileFailed);
                Err(err)
            }
        }
    }

    /// Parse the JSON input. Only valid in `Compiled`.
    pub fn parse_input(&mut self, text: &str) -> Result<(), Error> {
        self.expect(Stage::Compiled, "parse input")?;
        transition(&self.stage, Stage::Parsing);
        match self.engine.parse_json(text) {
            Ok(value) => {
                self.input = Some(value);
                transition(&self.stage, Stage::Parsed);
                Ok(())
            }
            Err(err) => {
                transition(&self.stage, Stage::ParseFailed);
                Err(err)
            }
        }
    }

    /// Use an already built input value. Only valid in `Compiled`.
    pub fn set_input(&mut self, value: Value) -> Result<(), Error> {
        self.expect(Stage::Compiled, "set input")?;
        transition(&self.stage, Stage::Parsing);
        self.input = Some(value);
        transition(&self.stage, Stage::Parsed);
        Ok(())
    }

    /// Run the filter and shape the outputs with `policy`. Only valid in
    /// `Parsed`.
    pub fn evaluate(&self, policy: Policy) -> Result<Value, Error> {
        self.evaluate_with(&[], policy)
    }

    /// [`evaluate`](Self::evaluate), with values for the filter's
    /// parameters.
    pub fn evaluate_with(&self, args: &[Value], policy: Policy) -> Result<Value, Error> {
        let outputs = self.start(args)?;
        match policy.apply(outputs) {
            Ok(value) => {
                transition(&self.stage, Stage::Drained);
                Ok(value)
            }
            Err(err) => {
                transition(&self.stage, Stage::EvalFailed);
                Err(err)
            }
        }
    }

    /// Hand out the lazy outputs. Only valid in `Parsed`.
    ///
    /// The session reaches `Drained` when the stream is exhausted, or
    /// `EvalFailed` when it yields an error; a stream dropped early leaves
    /// it `Evaluating`.
    pub fn stream(&self) -> Result<SessionStream<'_>, Error> {
        self.stream_with(&[])
    }

    pub fn stream_with(&self, args: &[Value]) -> Result<SessionStream<'_>, Error> {
        Ok(SessionStream {
            outputs: self.start(args)?,
            stage: &self.stage,
            done: false,
        })
    }

    fn start(&self, args: &[Value]) -> Result<Outputs<'_>, Error> {
        self.expect(Stage::Parsed, "evaluate")?;
        let (Some(filter), Some(input)) = (&self.filter, &self.input) else {
            return Err(Error::Api("Session has no filter or input".to_string()));
        };
        let outputs = filter.run_with(input.clone(), args)?;
        transition(&self.stage, Stage::Evaluating);
        Ok(outputs)
    }
}

/// Lazy outputs of a [`Session`], tracking its stage.
pub struct SessionStream<'s> {
    outputs: Outputs<'s>,
    stage: &'s Cell<Stage>,
    done: bool,
}

impl Iterator for SessionStream<'_> {
    type Item = Result<Value, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.outputs.next() {
            Some(Ok(value)) => Some(Ok(value)),
            Some(Err(err)) => {
                self.done = true;
                transition(self.stage, Stage::EvalFailed);
                Some(Err(err.into()))
            }
            None => {
                self.done = true;
                transition(self.stage, Stage::Drained);
                None
            }
        }
    }
}

impl fmt::Debug for SessionStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStream")
            .field("stage", &self.stage.get())
            .field("done", &self.done)
            .finish()
    }
}
