//! Implementation of the round() builtin function.

use crate::{args::ArgValues, exception::RunResult, runtime::Runtime, value::Value};

/// Implementation of the round() builtin function.
///
/// `ndigits` defaults to `0`; pass `None` explicitly to round a float to an `int`.
pub fn builtin_round(rt: &Runtime, args: ArgValues) -> RunResult<Value> {
    let [number, ndigits] = args.unpack_tuple("round", 1, [Value::None, Value::Int(0)])?;
    rt.py_round(&number, &ndigits)
}
