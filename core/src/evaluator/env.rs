//! Run-time environments.
//!
//! An environment is a persistent linked list of bindings shared through
//! `Rc`: pushing a binding never disturbs the environments other
//! suspended generators hold. Bindings are found by their distance from
//! the top, the index the compiler computed with its scope stack.

use std::rc::Rc;

use crate::compiler::{Filter, FuncBody};
use crate::values::Value;

pub(crate) enum Binding<'p> {
    Var(Value),
    /// A filter argument, evaluated in the caller's environment.
    Closure { filter: &'p Filter, env: Env<'p> },
    Def(&'p FuncBody),
}

struct Node<'p> {
    binding: Binding<'p>,
    parent: Env<'p>,
}

#[derive(Clone, Default)]
pub(crate) struct Env<'p>(Option<Rc<Node<'p>>>);

impl<'p> Env<'p> {
    pub(crate) fn push(&self, binding: Binding<'p>) -> Env<'p> {
        Env(Some(Rc::new(Node {
            binding,
            parent: self.clone(),
        })))
    }

    /// The binding `index` links up, with the environment it heads.
    pub(crate) fn get(&self, index: usize) -> Option<(&Binding<'p>, &Env<'p>)> {
        let mut env = self;
        for _ in 0..index {
            env = &env.0.as_ref()?.parent;
        }
        env.0.as_ref().map(|node| (&node.binding, env))
    }
}

impl Drop for Env<'_> {
    // Unlink iteratively so a long chain does not recurse on drop.
    fn drop(&mut self) {
        let mut next = self.0.take();
        while let Some(node) = next {
            match Rc::try_unwrap(node) {
                Ok(mut node) => next = node.parent.0.take(),
                Err(_) => break,
            }
        }
    }
}
