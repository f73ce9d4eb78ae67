//! Implementation of the chr() builtin function.

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    value::Value,
};

/// One past the largest Unicode code point.
const MAX_CODE_POINT: i64 = 0x11_0000;

/// Implementation of the chr() builtin function.
///
/// Returns the one-character string for a code point. Surrogates (U+D800..U+DFFF) have no
/// UTF-8 encoding and come back as U+FFFD. Any integer outside the code point range, big
/// integers included, is a `ValueError`.
pub fn builtin_chr(args: ArgValues) -> RunResult<Value> {
    let [code] = args.parse_tuple("O:chr", [Value::None])?;
    let code = match &code {
        Value::Bool(_) | Value::Int(_) => code.as_int(),
        Value::LongInt(_) => None,
        other => return Err(ExcType::type_error_not_integer(other.py_type().name())),
    };
    let Some(code) = code.filter(|c| (0..MAX_CODE_POINT).contains(c)) else {
        return Err(ExcType::value_error("chr() arg not in range(0x110000)"));
    };
    let c = u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    Ok(Value::from(c.to_string()))
}
