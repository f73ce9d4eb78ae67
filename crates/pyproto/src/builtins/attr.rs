//! Implementations of the getattr(), hasattr() and setattr() builtin functions.

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    runtime::Runtime,
    value::Value,
};

/// Implementation of the getattr() builtin function.
///
/// With a default, an `AttributeError` (or subclass) is replaced by the default; any other
/// error propagates.
pub fn builtin_getattr(rt: &Runtime, args: ArgValues) -> RunResult<Value> {
    let (obj, name, default) = args.get_two_three_args("getattr")?;
    let name = attr_name("getattr", &name)?;
    match (rt.getattr(&obj, name), default) {
        (Err(err), Some(default)) if err.matches(ExcType::AttributeError) => Ok(default),
        (result, _) => result,
    }
}

/// Implementation of the hasattr() builtin function.
pub fn builtin_hasattr(rt: &Runtime, args: ArgValues) -> RunResult<Value> {
    let (obj, name) = args.get_two_args("hasattr")?;
    let name = attr_name("hasattr", &name)?;
    match rt.getattr(&obj, name) {
        Ok(_) => Ok(Value::Bool(true)),
        Err(err) if err.matches(ExcType::AttributeError) => Ok(Value::Bool(false)),
        Err(err) => Err(err),
    }
}

/// Implementation of the setattr() builtin function.
pub fn builtin_setattr(rt: &Runtime, args: ArgValues) -> RunResult<Value> {
    let (obj, name, value) = args.get_three_args("setattr")?;
    let name = attr_name("setattr", &name)?;
    rt.setattr(&obj, name, value)?;
    Ok(Value::None)
}

fn attr_name<'a>(func: &str, name: &'a Value) -> RunResult<&'a str> {
    name.as_str()
        .ok_or_else(|| ExcType::type_error(format!("{func}(): attribute name must be string")))
}
