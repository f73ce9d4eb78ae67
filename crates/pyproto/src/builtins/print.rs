//! Implementation of the print() builtin function.

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    runtime::Runtime,
    types::Dict,
    value::Value,
};

/// Implementation of the print() builtin function.
///
/// Supports the following keyword arguments:
/// - `sep`: separator between values (default: " ")
/// - `end`: string appended after the last value (default: "\n")
/// - `file`: only `None` is accepted
/// - `flush`: flushes the writer when true
///
/// The text is built first and written with a single call, so a failing `__str__` prints nothing.
pub fn builtin_print(rt: &Runtime, args: ArgValues) -> RunResult<Value> {
    let (positional, kwargs) = args.into_parts();
    let options = PrintOptions::from_kwargs(kwargs.as_ref())?;

    let mut output = String::new();
    for (i, value) in positional.iter().enumerate() {
        if i > 0 {
            output.push_str(options.sep.as_deref().unwrap_or(" "));
        }
        output.push_str(&rt.py_str(value)?);
    }
    output.push_str(options.end.as_deref().unwrap_or("\n"));

    let mut writer = rt.print_writer()?;
    writer.stdout_write(output.into())?;
    if options.flush {
        writer.flush()?;
    }
    Ok(Value::None)
}

#[derive(Debug, Default)]
struct PrintOptions {
    sep: Option<String>,
    end: Option<String>,
    flush: bool,
}

impl PrintOptions {
    fn from_kwargs(kwargs: Option<&Dict>) -> RunResult<Self> {
        let mut options = Self::default();
        let Some(kwargs) = kwargs else {
            return Ok(options);
        };
        for (key, value) in kwargs.items() {
            match &*key {
                "sep" => options.sep = str_or_none("sep", &value)?,
                "end" => options.end = str_or_none("end", &value)?,
                "file" if matches!(value, Value::None) => {}
                "file" => return Err(ExcType::type_error("print() file redirection is not supported")),
                "flush" => options.flush = value.is_truthy(),
                other => return Err(ExcType::type_error_unexpected_keyword("print", other)),
            }
        }
        Ok(options)
    }
}

fn str_or_none(name: &str, value: &Value) -> RunResult<Option<String>> {
    match value {
        Value::None => Ok(None),
        Value::Str(s) => Ok(Some(s.to_string())),
        other => Err(ExcType::type_error(format!(
            "{name} must be None or a string, not {}",
            other.py_type()
        ))),
    }
}
