//! Implementation of the pow() builtin function.

use crate::{args::ArgValues, exception::RunResult, runtime::Runtime, value::Value};

/// Implementation of the pow() builtin function.
///
/// `pow(base, exp, mod=None)`: an explicit `None` modulus is the two-argument form.
pub fn builtin_pow(rt: &Runtime, args: ArgValues) -> RunResult<Value> {
    let [base, exp, modulus] = args.unpack_tuple("pow", 2, [Value::None, Value::None, Value::None])?;
    let modulus = match modulus {
        Value::None => None,
        m => Some(m),
    };
    rt.py_pow(&base, &exp, modulus.as_ref())
}
