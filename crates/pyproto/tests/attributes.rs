//! `getattr`, `hasattr` and `setattr` over instances, classes, modules and builtins.
mod common;

use std::rc::Rc;

use common::{err_text, function, instance, make_class, returning, runtime};
use pretty_assertions::assert_eq;
use pyproto::{ArgValues, Dict, ExcType, Module, RunResult, Runtime, SimpleException, Value};

fn getattr(rt: &Runtime, obj: &Value, name: &str, default: Option<Value>) -> RunResult<Value> {
    let mut args = vec![obj.clone(), Value::from(name)];
    args.extend(default);
    rt.call_builtin("getattr", ArgValues::positional(args))
}

fn hasattr(rt: &Runtime, obj: &Value, name: &str) -> bool {
    matches!(
        rt.call_builtin("hasattr", ArgValues::two(obj.clone(), Value::from(name))),
        Ok(Value::Bool(true))
    )
}

#[test]
fn instance_attributes_round_trip() {
    let rt = runtime();
    let cls = make_class(&rt, "Point", vec![], Dict::from_pairs([("dims", Value::Int(2))]));
    let p = instance(&rt, &cls);

    let result = rt.call_builtin(
        "setattr",
        ArgValues::positional(vec![p.clone(), Value::from("x"), Value::Int(10)]),
    );
    assert_eq!(result.unwrap(), Value::None);
    assert_eq!(getattr(&rt, &p, "x", None).unwrap(), Value::Int(10));
    assert_eq!(getattr(&rt, &p, "dims", None).unwrap(), Value::Int(2));
    assert_eq!(getattr(&rt, &p, "__class__", None).unwrap(), cls);
}

#[test]
fn methods_bind_to_the_instance() {
    let rt = runtime();
    let whoami = function("whoami", &["self"], |_, frame| Ok(frame.locals.get("self")));
    let cls = make_class(&rt, "Who", vec![], Dict::from_pairs([("whoami", whoami)]));
    let obj = instance(&rt, &cls);

    let method = getattr(&rt, &obj, "whoami", None).unwrap();
    assert!(matches!(method, Value::BoundMethod(_)));
    assert_eq!(rt.call(&method, ArgValues::default()).unwrap(), obj);
}

#[test]
fn getattr_raises_iff_hasattr_is_false() {
    let rt = runtime();
    let cls = make_class(&rt, "Thing", vec![], Dict::from_pairs([("a", Value::Int(1))]));
    let module = Value::Module(Rc::new(Module::new(
        "mod",
        Dict::from_pairs([("b", Value::Int(2))]),
    )));
    let objects = [instance(&rt, &cls), cls, module, Value::Int(1), Value::from("s")];

    for obj in &objects {
        for name in ["a", "b", "missing", "__class__"] {
            let raised = getattr(&rt, obj, name, None).is_err();
            assert_eq!(raised, !hasattr(&rt, obj, name), "{obj:?}.{name}");
        }
    }
}

#[test]
fn attribute_errors_use_cpython_wording() {
    let rt = runtime();
    let cls = make_class(&rt, "Thing", vec![], Dict::new());
    let module = Value::Module(Rc::new(Module::new("mod", Dict::new())));

    assert_eq!(
        err_text(getattr(&rt, &instance(&rt, &cls), "nope", None)),
        "AttributeError: 'Thing' object has no attribute 'nope'"
    );
    assert_eq!(
        err_text(getattr(&rt, &cls, "nope", None)),
        "AttributeError: type object 'Thing' has no attribute 'nope'"
    );
    assert_eq!(
        err_text(getattr(&rt, &module, "nope", None)),
        "AttributeError: module 'mod' has no attribute 'nope'"
    );
    assert_eq!(
        err_text(getattr(&rt, &Value::Int(1), "nope", None)),
        "AttributeError: 'int' object has no attribute 'nope'"
    );
}

#[test]
fn default_suppresses_attribute_error_only() {
    let rt = runtime();
    let cls = make_class(&rt, "Thing", vec![], Dict::new());
    let obj = instance(&rt, &cls);
    assert_eq!(getattr(&rt, &obj, "nope", Some(Value::Int(0))).unwrap(), Value::Int(0));

    let failing = function("__getattr__", &["self", "name"], |_, _| {
        Err(SimpleException::new_msg(ExcType::RuntimeError, "boom").into())
    });
    let cls = make_class(&rt, "Failing", vec![], Dict::from_pairs([("__getattr__", failing)]));
    let obj = instance(&rt, &cls);
    assert_eq!(err_text(getattr(&rt, &obj, "x", Some(Value::None))), "RuntimeError: boom");
    let err = rt
        .call_builtin("hasattr", ArgValues::two(obj, Value::from("x")))
        .unwrap_err();
    assert!(err.is_exception_type(ExcType::RuntimeError));
}

#[test]
fn getattr_hook_supplies_missing_attributes() {
    let rt = runtime();
    let hook = function("__getattr__", &["self", "name"], |_, frame| Ok(frame.locals.get("name")));
    let cls = make_class(&rt, "Dynamic", vec![], Dict::from_pairs([("__getattr__", hook)]));
    let obj = instance(&rt, &cls);
    assert_eq!(getattr(&rt, &obj, "anything", None).unwrap(), Value::from("anything"));
}

#[test]
fn attribute_names_must_be_strings() {
    let rt = runtime();
    for (name, args) in [
        ("getattr", vec![Value::None, Value::Int(1)]),
        ("hasattr", vec![Value::None, Value::Int(1)]),
        ("setattr", vec![Value::None, Value::Int(1), Value::None]),
    ] {
        assert_eq!(
            err_text(rt.call_builtin(name, ArgValues::positional(args))),
            format!("TypeError: {name}(): attribute name must be string")
        );
    }
}

#[test]
fn builtin_types_are_immutable() {
    let rt = runtime();
    let int = pyproto::lookup_builtin("int").unwrap();
    let err = rt
        .call_builtin("setattr", ArgValues::positional(vec![int, Value::from("x"), Value::None]))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "AttributeError: cannot set 'x' attribute of immutable type 'int'"
    );
}

#[test]
fn class_attributes_reach_existing_instances() {
    let rt = runtime();
    let cls = make_class(&rt, "Late", vec![], Dict::new());
    let obj = instance(&rt, &cls);
    rt.setattr(&cls, "greeting", returning("greeting", &["self"], Value::from("hi")))
        .unwrap();
    let method = rt.getattr(&obj, "greeting").unwrap();
    assert_eq!(rt.call(&method, ArgValues::default()).unwrap(), Value::from("hi"));
}

#[test]
fn class_introspection() {
    let rt = runtime();
    let base = make_class(&rt, "Base", vec![], Dict::new());
    let derived = make_class(&rt, "Derived", vec![base.clone()], Dict::new());

    assert_eq!(rt.getattr(&derived, "__name__").unwrap(), Value::from("Derived"));
    assert_eq!(rt.getattr(&derived, "__bases__").unwrap(), Value::from(vec![base.clone()]));
    let mro = rt.getattr(&derived, "__mro__").unwrap();
    assert_eq!(mro.py_repr(), "(<class 'Derived'>, <class 'Base'>, <class 'object'>)");
    assert_eq!(rt.getattr(&derived, "__class__").unwrap().py_repr(), "<class 'type'>");
}
