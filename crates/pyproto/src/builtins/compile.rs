//! Implementation of the compile() builtin function.

use std::str::FromStr;

use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    args::ArgValues,
    exception::{ExcType, RunError, RunResult},
    runtime::Runtime,
    value::Value,
};

/// What `compile()` should produce from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum CompileMode {
    /// A module: a sequence of statements.
    Exec,
    /// A single expression.
    Eval,
    /// A single interactive statement.
    Single,
}

/// Implementation of the compile() builtin function.
///
/// `compile(source, filename, mode, flags=0, dont_inherit=False, optimize=-1)`. Only `str`
/// sources are accepted; the arguments are validated and handed to the runtime's compiler,
/// whose code object or `SyntaxError` is returned unchanged.
pub fn builtin_compile(rt: &Runtime, args: ArgValues) -> RunResult<Value> {
    let [source, filename, mode, flags, dont_inherit, optimize] = args.parse_tuple_and_keywords(
        "Oss|iii:compile",
        ["source", "filename", "mode", "flags", "dont_inherit", "optimize"],
        [Value::None, Value::None, Value::None, Value::Int(0), Value::Int(0), Value::Int(-1)],
    )?;

    let optimize = int_arg(&optimize)?;
    if !(-1..=2).contains(&optimize) {
        return Err(ExcType::value_error("compile(): invalid optimize value"));
    }
    let mode = mode
        .as_str()
        .and_then(|m| CompileMode::from_str(m).ok())
        .ok_or_else(|| ExcType::value_error("compile() mode must be 'exec', 'eval' or 'single'"))?;
    let Value::Str(source) = source else {
        return Err(ExcType::type_error("compile() arg 1 must be a string, bytes or AST object"));
    };
    let filename = filename
        .as_str()
        .ok_or_else(|| RunError::internal("compile() filename not bound as str"))?;

    rt.compiler()
        .compile(rt, &source, filename, mode, int_arg(&flags)?, int_arg(&dont_inherit)? != 0)
}

fn int_arg(value: &Value) -> RunResult<i64> {
    value
        .as_int()
        .ok_or_else(|| RunError::internal("compile() integer argument not bound as int"))
}
