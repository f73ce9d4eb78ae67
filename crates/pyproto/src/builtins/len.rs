//! Implementation of the len() builtin function.

use crate::{args::ArgValues, exception::RunResult, runtime::Runtime, value::Value};

/// Implementation of the len() builtin function.
///
/// Returns the length of a builtin container, or the result of `__len__` for user classes,
/// which must be a non-negative integer.
pub fn builtin_len(rt: &Runtime, args: ArgValues) -> RunResult<Value> {
    let value = args.get_one_arg("len")?;
    let len = rt.py_len(&value)?;
    Ok(Value::from(num_bigint::BigInt::from(len)))
}
