//! Implementation of the type() builtin: `type(x)` and three-argument class creation.

use std::rc::Rc;

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    types::{ClassObject, Type, TypeRef},
    value::Value,
};

/// Implementation of the type() builtin function.
///
/// `type(x)` returns the class of `x`; `type(name, bases, namespace)` creates a new class.
pub fn builtin_type(args: ArgValues) -> RunResult<Value> {
    if args.count() == 1 && args.kwargs().is_none() {
        let value = args.get_one_arg("type")?;
        return Ok(value.py_type().into_value());
    }
    if args.count() == 3 {
        return type_new(TypeRef::Builtin(Type::Type), args);
    }
    Err(ExcType::type_error("type() takes 1 or 3 arguments"))
}

/// Creates a class from `(name, bases, namespace)` with `metaclass` as the requested metaclass.
///
/// The metaclass actually used is the most derived of `metaclass` and the metaclasses of the
/// bases. The namespace is copied, so later writes to the caller's dict do not reach the class.
pub(crate) fn type_new(metaclass: TypeRef, args: ArgValues) -> RunResult<Value> {
    if args.kwargs().is_some() {
        return Err(ExcType::type_error("type.__init__() takes no keyword arguments"));
    }
    let (name, bases, namespace) = args.get_three_args("type")?;

    let Value::Str(name) = name else {
        return Err(ExcType::type_error(format!(
            "type.__new__() argument 1 must be str, not {}",
            name.py_type()
        )));
    };
    let Value::Tuple(bases) = bases else {
        return Err(ExcType::type_error(format!(
            "type.__new__() argument 2 must be tuple, not {}",
            bases.py_type()
        )));
    };
    let Value::Dict(namespace) = namespace else {
        return Err(ExcType::type_error(format!(
            "type.__new__() argument 3 must be dict, not {}",
            namespace.py_type()
        )));
    };

    let base_types = bases
        .iter()
        .map(|base| base.as_type().ok_or_else(|| ExcType::type_error("bases must be types")))
        .collect::<RunResult<Vec<_>>>()?;
    let winner = metaclass.calculate_metaclass(&bases)?;

    let class = ClassObject::new(name, winner, base_types, namespace.copy())?;
    Ok(Value::Class(Rc::new(class)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::Dict;

    #[test]
    fn type_of_value() {
        let result = builtin_type(ArgValues::one(Value::Bool(true))).unwrap();
        assert_eq!(result.py_repr(), "<class 'bool'>");
    }

    #[test]
    fn three_argument_form_copies_namespace() {
        let ns = Dict::from_pairs([("x", Value::Int(1))]);
        let args = ArgValues::positional(vec![Value::from("Foo"), Value::empty_tuple(), Value::Dict(ns.clone())]);
        let Value::Class(cls) = builtin_type(args).unwrap() else {
            panic!("expected a class");
        };
        ns.set("y", Value::Int(2));

        assert_eq!(cls.name(), "Foo");
        assert_eq!(cls.namespace().keys(), vec![Rc::from("x")]);
        assert_eq!(*cls.metaclass(), TypeRef::Builtin(Type::Type));
    }

    #[test]
    fn bases_must_be_types() {
        let args = ArgValues::positional(vec![
            Value::from("Foo"),
            Value::from(vec![Value::Int(1)]),
            Value::Dict(Dict::new()),
        ]);
        let err = builtin_type(args).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: bases must be types");
    }

    #[test]
    fn two_arguments_rejected() {
        let err = builtin_type(ArgValues::two(Value::Int(1), Value::Int(2))).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: type() takes 1 or 3 arguments");
    }
}
