use std::rc::Rc;

use crate::{exception::RunError, value::Value};

/// Outcome of advancing an iterator once.
///
/// Keeping exhaustion apart from failure lets `next(it, default)` substitute the default for
/// exhaustion only, while every other error propagates.
#[derive(Debug)]
pub enum NextResult {
    /// The iterator produced a value.
    Produced(Value),
    /// The iterator is exhausted. Carries the `StopIteration` that signalled it, if one was raised.
    Exhausted(Option<RunError>),
    /// Advancing raised something other than exhaustion.
    Failed(RunError),
}

/// Native iterator over a snapshot of a builtin sequence.
///
/// `iter()` of a list copies its current items, so mutating the list afterwards does not
/// affect an iterator already taken.
#[derive(Debug)]
pub struct PyIter {
    items: Rc<[Value]>,
    index: usize,
}

impl PyIter {
    #[must_use]
    pub fn new(items: impl Into<Rc<[Value]>>) -> Self {
        Self {
            items: items.into(),
            index: 0,
        }
    }

    /// Advances the iterator, returning `None` once every item has been produced.
    pub fn advance(&mut self) -> Option<Value> {
        let item = self.items.get(self.index)?.clone();
        self.index += 1;
        Some(item)
    }
}
