//! Implementation of the abs() builtin function.

use crate::{args::ArgValues, exception::RunResult, runtime::Runtime, value::Value};

/// Implementation of the abs() builtin function.
///
/// Returns the absolute value of a number. Native for `bool`, `int` and `float`; user classes
/// dispatch to `__abs__`. For `i64::MIN`, which overflows on negation, promotes to a long integer.
pub fn builtin_abs(rt: &Runtime, args: ArgValues) -> RunResult<Value> {
    let value = args.get_one_arg("abs")?;
    rt.py_abs(&value)
}
