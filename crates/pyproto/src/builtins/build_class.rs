//! Implementation of the __build_class__() builtin: the machinery behind a `class` statement.

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    runtime::Runtime,
    types::{Dict, Type, TypeRef},
    value::Value,
};

/// Implementation of the __build_class__() builtin function.
///
/// `__build_class__(func, name, *bases, metaclass=None, **kwds)`:
/// 1. resolves the metaclass, from the `metaclass` keyword or the first base, and picks the
///    most derived one among it and the bases' metaclasses (an explicit non-type metaclass is
///    used as-is),
/// 2. prepares the namespace with `__prepare__` when the metaclass defines one,
/// 3. runs the class body with that namespace as its locals,
/// 4. calls the metaclass with `(name, bases, namespace)` and the remaining keywords,
/// 5. fills the `__class__` cell returned by the body with the new class.
///
/// The caller's keyword dict is never modified. A body that returns no result builds no class
/// and `None` is returned.
pub fn builtin_build_class(rt: &Runtime, args: ArgValues) -> RunResult<Value> {
    let (positional, kwargs) = args.into_parts();
    let [func, name, bases @ ..] = positional.as_slice() else {
        return Err(ExcType::type_error("__build_class__: not enough arguments"));
    };
    let Value::Function(func) = func else {
        return Err(ExcType::type_error("__build_class__: func must be a function"));
    };
    let Value::Str(class_name) = name else {
        return Err(ExcType::type_error("__build_class__: name is not a string"));
    };

    let (explicit_meta, kwargs) = split_metaclass(kwargs);
    let metaclass = match explicit_meta {
        Some(meta) => match meta.as_type() {
            Some(meta_type) => meta_type.calculate_metaclass(bases)?.into_value(),
            None => meta,
        },
        None => bases
            .first()
            .map_or(TypeRef::Builtin(Type::Type), Value::py_type)
            .calculate_metaclass(bases)?
            .into_value(),
    };
    let meta_name = describe(&metaclass);
    rt.trace(|t| t.on_metaclass_resolved(class_name, &meta_name));

    let bases = Value::Tuple(bases.into());
    let namespace = prepare_namespace(rt, &metaclass, &meta_name, name, &bases, kwargs.as_ref())?;

    let locals = func.locals_for_call(&[Value::Dict(namespace.clone())], None)?;
    let Some(body_result) = rt.run_code(func.globals(), &locals, func.code(), func.closure())? else {
        return Ok(Value::None);
    };

    let class = rt.call(
        &metaclass,
        ArgValues::new(vec![name.clone(), bases, Value::Dict(namespace)], kwargs),
    )?;
    if let Value::Cell(cell) = &body_result {
        cell.fill(class.clone())?;
    }
    rt.trace(|t| t.on_class_built(class_name, &meta_name));
    Ok(class)
}

/// Separates the `metaclass` keyword from the rest, copying the dict only when it is present.
fn split_metaclass(kwargs: Option<Dict>) -> (Option<Value>, Option<Dict>) {
    match kwargs {
        Some(kwargs) if kwargs.contains_key("metaclass") => {
            let filtered = kwargs.copy();
            let meta = filtered.remove("metaclass");
            (meta, Some(filtered).filter(|k| !k.is_empty()))
        }
        other => (None, other),
    }
}

/// Builds the class namespace, calling `__prepare__` when the metaclass provides one.
///
/// The hook is probed directly in the MRO dicts: on the metaclass itself when it is a class,
/// on its type otherwise. A missing hook is not an error.
fn prepare_namespace(
    rt: &Runtime,
    metaclass: &Value,
    meta_name: &str,
    name: &Value,
    bases: &Value,
    kwargs: Option<&Dict>,
) -> RunResult<Dict> {
    let prepared = match metaclass.as_type() {
        Some(meta_type) => meta_type
            .lookup("__prepare__")
            .map(|prepare| rt.call(&prepare, ArgValues::new(vec![name.clone(), bases.clone()], kwargs.cloned()))),
        None => rt.call_capability_kw(metaclass, "__prepare__", vec![name.clone(), bases.clone()], kwargs),
    };
    match prepared.transpose()? {
        None => Ok(Dict::new()),
        Some(Value::Dict(namespace)) => Ok(namespace),
        Some(other) => Err(ExcType::type_error(format!(
            "{meta_name}.__prepare__() must return a mapping, not {}",
            other.py_type()
        ))),
    }
}

/// Name used for the metaclass in trace events and messages.
fn describe(metaclass: &Value) -> String {
    match metaclass.as_type() {
        Some(t) => t.name().to_owned(),
        None => metaclass.py_type().name().to_owned(),
    }
}
