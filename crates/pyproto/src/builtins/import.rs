//! Implementation of the __import__() builtin function.

use std::rc::Rc;

use crate::{
    args::ArgValues,
    exception::{ExcType, RunError, RunResult},
    runtime::Runtime,
    types::Dict,
    value::Value,
};

/// Implementation of the __import__() builtin function.
///
/// `__import__(name, globals=None, locals=None, fromlist=(), level=0)`. Missing scopes become
/// empty dicts and the caller's dicts are passed through untouched. The importer returns the
/// top-level package for a bare import and the leaf module when `fromlist` is non-empty.
pub fn builtin_import(rt: &Runtime, args: ArgValues) -> RunResult<Value> {
    let [name, globals, locals, fromlist, level] = args.parse_tuple_and_keywords(
        "U|OOOi:__import__",
        ["name", "globals", "locals", "fromlist", "level"],
        [Value::None, Value::None, Value::None, Value::empty_tuple(), Value::Int(0)],
    )?;

    let name = name
        .as_str()
        .ok_or_else(|| RunError::internal("__import__() name not bound as str"))?;
    let level = level.as_int().unwrap_or_default();
    let level = u32::try_from(level).map_err(|_| ExcType::value_error("level must be >= 0"))?;
    if name.is_empty() && level == 0 {
        return Err(ExcType::value_error("Empty module name"));
    }

    let globals = scope_arg("globals", globals)?;
    let locals = scope_arg("locals", locals)?;
    let fromlist = fromlist_arg(&fromlist)?;

    rt.importer()
        .import_module_level(rt, name, &globals, &locals, &fromlist, level)
}

fn scope_arg(what: &str, value: Value) -> RunResult<Dict> {
    match value {
        Value::None => Ok(Dict::new()),
        Value::Dict(dict) => Ok(dict),
        other => Err(ExcType::type_error(format!(
            "__import__() {what} must be a dict, not {}",
            other.py_type()
        ))),
    }
}

fn fromlist_arg(value: &Value) -> RunResult<Vec<Rc<str>>> {
    let items = match value {
        Value::None => return Ok(Vec::new()),
        Value::Tuple(items) => items.to_vec(),
        Value::List(items) => items.borrow().clone(),
        other => {
            return Err(ExcType::type_error(format!(
                "__import__() fromlist must be a tuple or list, not {}",
                other.py_type()
            )));
        }
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Str(s) => Ok(s),
            other => Err(ExcType::type_error(format!(
                "Item in from list must be str, not {}",
                other.py_type()
            ))),
        })
        .collect()
}
