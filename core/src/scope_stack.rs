//! Compile-time scope stack.
//!
//! The compiler keeps one entry per binding that will exist at run time,
//! in the same order the evaluator pushes them onto its environment. A
//! name therefore resolves to its distance from the top of the stack (a de
//! Bruijn index), and the evaluator finds the binding by walking that many
//! links up its environment list.
//!
//! Three kinds of names share the stack:
//! - **Variables** (`$x`), bound by `as`, `reduce`, `foreach` and `$param`s
//! - **Filter parameters** (`def f(g): ...`), closures of arity 0
//! - **Definitions** (`def f(a; b): ...`), looked up by name *and* arity
//!
//! ```text
//! def f(g): . as $x | g;     stack while compiling `g`:  [Def f/1, Param g, Var x]
//!                                                          index:  2        1        0
//! ```

use core::fmt;

/// One binding visible to the filter being compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Var(String),
    Param(String),
    Def { name: String, arity: usize },
}

/// What a call `name/arity` resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTarget {
    /// A filter parameter of an enclosing definition.
    Param(usize),
    /// A definition in scope.
    Def(usize),
}

/// A stack of bindings, searched from innermost to outermost.
#[derive(Debug, Default)]
pub struct ScopeStack {
    bindings: Vec<Binding>,
}

impl ScopeStack {
    /// Create a new empty scope stack.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn push(&mut self, binding: Binding) {
        self.bindings.push(binding);
    }

    /// Pop the topmost binding from the stack.
    ///
    /// Returns an error if the stack is empty.
    pub fn pop(&mut self) -> Result<Binding, PopError> {
        self.bindings.pop().ok_or(PopError::EmptyStack)
    }

    /// Drop every binding pushed after the stack had `len` entries.
    pub fn truncate(&mut self, len: usize) {
        self.bindings.truncate(len);
    }

    /// Index of the innermost variable `$name`.
    pub fn lookup_var(&self, name: &str) -> Option<usize> {
        self.position(|b| matches!(b, Binding::Var(n) if n == name))
    }

    /// Resolve a call. Parameters only match calls without arguments.
    pub fn lookup_call(&self, name: &str, arity: usize) -> Option<CallTarget> {
        self.bindings
            .iter()
            .rev()
            .enumerate()
            .find_map(|(index, binding)| match binding {
                Binding::Param(n) if n == name && arity == 0 => Some(CallTarget::Param(index)),
                Binding::Def { name: n, arity: a } if n == name && *a == arity => {
                    Some(CallTarget::Def(index))
                }
                _ => None,
            })
    }

    /// Every arity under which `name` is callable in this scope.
    pub fn arities_of(&self, name: &str) -> Vec<usize> {
        let mut arities: Vec<usize> = self
            .bindings
            .iter()
            .filter_map(|binding| match binding {
                Binding::Param(n) if n == name => Some(0),
                Binding::Def { name: n, arity } if n == name => Some(*arity),
                _ => None,
            })
            .collect();
        arities.sort_unstable();
        arities.dedup();
        arities
    }

    fn position(&self, pred: impl Fn(&Binding) -> bool) -> Option<usize> {
        self.bindings.iter().rev().position(pred)
    }
}

/// Error when trying to pop a scope.
#[derive(Debug, Clone)]
pub enum PopError {
    /// The stack is empty.
    EmptyStack,
}

impl fmt::Display for PopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopError::EmptyStack => write!(f, "Cannot pop from empty scope stack"),
        }
    }
}
