use std::rc::Rc;

use crate::{types::Dict, value::Value};

/// A module object as returned by an importer: a name and its global namespace.
#[derive(Debug)]
pub struct Module {
    name: Rc<str>,
    dict: Dict,
}

impl Module {
    /// Creates a module, recording `__name__` in its namespace.
    pub fn new(name: impl Into<Rc<str>>, dict: Dict) -> Self {
        let name = name.into();
        if !dict.contains_key("__name__") {
            dict.set("__name__", Value::Str(name.clone()));
        }
        Self { name, dict }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn dict(&self) -> &Dict {
        &self.dict
    }
}
