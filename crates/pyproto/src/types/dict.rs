use std::{cell::RefCell, fmt, rc::Rc};

use indexmap::IndexMap;

use crate::value::Value;

/// A string-keyed, insertion-ordered mapping with shared ownership.
///
/// Cloning a `Dict` clones the handle, not the contents: both handles observe every
/// mutation. This is what lets a class body write into the exact namespace object that was
/// prepared for it. Use [`Dict::copy`] for an independent shallow copy.
#[derive(Clone, Default)]
pub struct Dict(Rc<RefCell<IndexMap<Rc<str>, Value>>>);

impl Dict {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dict from key/value pairs, later duplicates overwriting earlier ones.
    pub fn from_pairs<K: Into<Rc<str>>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        let map = pairs.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self(Rc::new(RefCell::new(map)))
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<Rc<str>>, value: Value) {
        self.0.borrow_mut().insert(key.into(), value);
    }

    /// Removes `key`, preserving the order of the remaining entries.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Snapshot of the keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<Rc<str>> {
        self.0.borrow().keys().cloned().collect()
    }

    /// Snapshot of the entries in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<(Rc<str>, Value)> {
        self.0.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Returns a new dict with the same entries that shares nothing with `self`.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self(Rc::new(RefCell::new(self.0.borrow().clone())))
    }

    /// Whether both handles refer to the same underlying mapping.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // values may refer back to this dict through classes and closures, so keys only
        f.debug_set().entries(self.0.borrow().keys()).finish()
    }
}
