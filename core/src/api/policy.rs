//! Output policies: how the lazy outputs of a run become one result.

use core::fmt;
use core::str::FromStr;

use super::Error;
use crate::evaluator::ExecutionError;
use crate::values::Value;

/// How the outputs of a run are shaped into a single [`Value`].
///
/// Every policy reports the first error the run yields, even after some
/// outputs were produced; partial results are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// The first output, or `null` when there is none. Later outputs are
    /// never computed.
    First,
    /// All outputs, as an array (even for zero or one output).
    All,
    /// All outputs: `null` for none, the value itself for one, an array
    /// for more.
    Unwrap,
}

impl Policy {
    /// Consume `outputs` according to the policy.
    pub fn apply<I>(self, mut outputs: I) -> Result<Value, Error>
    where
        I: Iterator<Item = Result<Value, ExecutionError>>,
    {
        match self {
            Policy::First => Ok(outputs.next().transpose()?.unwrap_or_default()),
            Policy::All => Ok(Value::array(outputs.collect::<Result<_, _>>()?)),
            Policy::Unwrap => {
                let mut values: Vec<Value> = outputs.collect::<Result<_, _>>()?;
                Ok(match values.len() {
                    0 => Value::Null,
                    1 => values.remove(0),
                    _ => Value::array(values),
                })
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Policy::First => "first",
            Policy::All => "all",
            Policy::Unwrap => "unwrap",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(Policy::First),
            "all" => Ok(Policy::All),
            "unwrap" => Ok(Policy::Unwrap),
            _ => Err(Error::Api(format!("Unknown policy '{}'", s))),
        }
    }
}
