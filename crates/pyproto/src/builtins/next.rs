//! Implementation of the next() builtin function.

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    runtime::Runtime,
    types::NextResult,
    value::Value,
};

/// Implementation of the next() builtin function.
///
/// Without a default, exhaustion re-raises the iterator's `StopIteration` (or a bare one for
/// native iterators). With a default, only exhaustion is replaced by the default; every other
/// error propagates unchanged.
pub fn builtin_next(rt: &Runtime, args: ArgValues) -> RunResult<Value> {
    let (iterator, default) = args.get_one_two_args("next")?;
    match (rt.py_next(&iterator), default) {
        (NextResult::Produced(value), _) => Ok(value),
        (NextResult::Exhausted(_), Some(default)) => Ok(default),
        (NextResult::Exhausted(err), None) => Err(err.unwrap_or_else(ExcType::stop_iteration)),
        (NextResult::Failed(err), _) => Err(err),
    }
}
