//! Implementation of the ord() builtin function.

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    value::Value,
};

/// Implementation of the ord() builtin function.
///
/// Accepts a one-character `str` or a one-byte `bytes` and returns its code point.
pub fn builtin_ord(args: ArgValues) -> RunResult<Value> {
    let value = args.get_one_arg("ord")?;
    match &value {
        Value::Str(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Int(i64::from(u32::from(c)))),
                _ => Err(ExcType::type_error(format!(
                    "ord() expected a character, but string of length {} found",
                    s.chars().count()
                ))),
            }
        }
        Value::Bytes(b) => match **b {
            [byte] => Ok(Value::Int(i64::from(byte))),
            _ => Err(ExcType::type_error(format!(
                "ord() expected a character, but string of length {} found",
                b.len()
            ))),
        },
        other => Err(ExcType::type_error(format!(
            "ord() expected string of length 1, but {} found",
            other.py_type()
        ))),
    }
}
