//! `print()` formatting and the `builtins` namespace table.
mod common;

use std::{borrow::Cow, cell::Cell, rc::Rc};

use common::{ScriptExecutor, err_text, function, instance, make_class, returning};
use pretty_assertions::assert_eq;
use pyproto::{
    ArgValues, Builtins, BuiltinsFunctions, CollectStringPrint, Dict, ExcType, PrintWriter, RunResult, Runtime,
    SimpleException, Type, Value, builtins_namespace, lookup_builtin,
};
use strum::IntoEnumIterator;

fn printing_runtime() -> (Runtime, CollectStringPrint) {
    let print = CollectStringPrint::new();
    let rt = Runtime::builder().executor(ScriptExecutor).print(print.clone()).build();
    (rt, print)
}

fn print(rt: &Runtime, args: Vec<Value>, kwargs: Option<Dict>) -> RunResult<Value> {
    rt.call_builtin("print", ArgValues::new(args, kwargs))
}

#[test]
fn values_are_joined_by_spaces() {
    let (rt, out) = printing_runtime();
    let result = print(&rt, vec![Value::from("a"), Value::Int(1), Value::None, Value::Float(2.5)], None).unwrap();
    assert_eq!(result, Value::None);
    print(&rt, vec![], None).unwrap();
    assert_eq!(out.output(), "a 1 None 2.5\n\n");
}

#[test]
fn sep_and_end_keywords() {
    let (rt, out) = printing_runtime();
    let kwargs = Dict::from_pairs([("sep", Value::from("-")), ("end", Value::from("!"))]);
    print(&rt, vec![Value::from("a"), Value::from("b")], Some(kwargs)).unwrap();

    let kwargs = Dict::from_pairs([("sep", Value::None), ("end", Value::None), ("file", Value::None)]);
    print(&rt, vec![Value::from("c"), Value::from("d")], Some(kwargs)).unwrap();
    assert_eq!(out.output(), "a-b!c d\n");
}

#[test]
fn keyword_errors() {
    let (rt, out) = printing_runtime();
    let x = || vec![Value::from("x")];
    assert_eq!(
        err_text(print(&rt, x(), Some(Dict::from_pairs([("sep", Value::Int(1))])))),
        "TypeError: sep must be None or a string, not int"
    );
    assert_eq!(
        err_text(print(&rt, x(), Some(Dict::from_pairs([("end", Value::Bool(false))])))),
        "TypeError: end must be None or a string, not bool"
    );
    assert_eq!(
        err_text(print(&rt, x(), Some(Dict::from_pairs([("file", Value::Int(1))])))),
        "TypeError: print() file redirection is not supported"
    );
    assert_eq!(
        err_text(print(&rt, x(), Some(Dict::from_pairs([("colour", Value::from("red"))])))),
        "TypeError: 'colour' is an invalid keyword argument for print()"
    );
    assert_eq!(out.output(), "");
}

#[test]
fn instances_print_through_str_then_repr() {
    let (rt, out) = printing_runtime();
    let with_str = make_class(
        &rt,
        "Named",
        vec![],
        Dict::from_pairs([("__str__", returning("__str__", &["self"], Value::from("named")))]),
    );
    let with_repr = make_class(
        &rt,
        "Shown",
        vec![],
        Dict::from_pairs([("__repr__", returning("__repr__", &["self"], Value::from("<shown>")))]),
    );
    print(&rt, vec![instance(&rt, &with_str), instance(&rt, &with_repr)], None).unwrap();
    assert_eq!(out.output(), "named <shown>\n");
}

#[test]
fn failing_str_prints_nothing() {
    let (rt, out) = printing_runtime();
    let raising = function("__str__", &["self"], |_, _| {
        Err(SimpleException::new_msg(ExcType::ValueError, "no text").into())
    });
    let cls = make_class(&rt, "Broken", vec![], Dict::from_pairs([("__str__", raising)]));
    let obj = instance(&rt, &cls);

    assert_eq!(
        err_text(print(&rt, vec![Value::from("before"), obj], None)),
        "ValueError: no text"
    );

    let non_string = make_class(
        &rt,
        "Numeric",
        vec![],
        Dict::from_pairs([("__str__", returning("__str__", &["self"], Value::Int(3)))]),
    );
    assert_eq!(
        err_text(print(&rt, vec![instance(&rt, &non_string)], None)),
        "TypeError: __str__ returned non-string (type int)"
    );
    assert_eq!(out.output(), "");
}

/// Counts writes and flushes.
#[derive(Debug, Clone, Default)]
struct CountingPrint {
    writes: Rc<Cell<usize>>,
    flushes: Rc<Cell<usize>>,
}

impl PrintWriter for CountingPrint {
    fn stdout_write(&mut self, _output: Cow<'_, str>) -> RunResult<()> {
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn flush(&mut self) -> RunResult<()> {
        self.flushes.set(self.flushes.get() + 1);
        Ok(())
    }
}

#[test]
fn flush_only_when_requested_and_one_write_per_call() {
    let counter = CountingPrint::default();
    let rt = Runtime::builder().print(counter.clone()).build();
    let values = || vec![Value::Int(1), Value::Int(2), Value::Int(3)];

    print(&rt, values(), None).unwrap();
    print(&rt, values(), Some(Dict::from_pairs([("flush", Value::Bool(false))]))).unwrap();
    print(&rt, values(), Some(Dict::from_pairs([("flush", Value::Bool(true))]))).unwrap();
    assert_eq!(counter.writes.get(), 3);
    assert_eq!(counter.flushes.get(), 1);
}

#[test]
fn registry_exposes_every_builtin_function() {
    for func in BuiltinsFunctions::iter() {
        let name: &'static str = func.into();
        assert_eq!(lookup_builtin(name), Some(Value::Builtin(Builtins::Function(func))), "{name}");
    }
    for name in [
        "__build_class__",
        "__import__",
        "abs",
        "chr",
        "compile",
        "getattr",
        "hasattr",
        "len",
        "next",
        "ord",
        "pow",
        "print",
        "round",
        "setattr",
    ] {
        assert!(lookup_builtin(name).is_some(), "{name}");
    }
}

#[test]
fn registry_constants_types_and_exceptions() {
    assert_eq!(lookup_builtin("None"), Some(Value::None));
    assert_eq!(lookup_builtin("Ellipsis"), Some(Value::Ellipsis));
    assert!(matches!(lookup_builtin("True"), Some(Value::Bool(true))));
    assert!(matches!(lookup_builtin("False"), Some(Value::Bool(false))));
    assert_eq!(lookup_builtin("object"), Some(Value::Builtin(Builtins::Type(Type::Object))));
    assert_eq!(lookup_builtin("type"), Some(Value::Builtin(Builtins::Type(Type::Type))));
    assert_eq!(
        lookup_builtin("StopIteration"),
        Some(Value::Builtin(Builtins::ExcType(ExcType::StopIteration)))
    );
    assert_eq!(lookup_builtin("EnvironmentError"), lookup_builtin("OSError"));
    assert_eq!(lookup_builtin("eval"), None);
    assert_eq!(lookup_builtin("Print"), None);
}

#[test]
fn namespace_is_a_fresh_copy() {
    let first = builtins_namespace();
    first.set("len", Value::Int(0));
    first.remove("print");

    let second = builtins_namespace();
    assert_eq!(second.get("len"), lookup_builtin("len"));
    assert!(second.contains_key("print"));
    assert_eq!(second.keys()[..4].to_vec(), ["None", "Ellipsis", "False", "True"].map(Rc::<str>::from).to_vec());
}

#[test]
fn namespace_entries_are_callable() {
    let (rt, out) = printing_runtime();
    let namespace = builtins_namespace();
    let len = namespace.get("len").unwrap();
    assert_eq!(rt.call(&len, ArgValues::one(Value::from("abc"))).unwrap(), Value::Int(3));

    let print = namespace.get("print").unwrap();
    rt.call(&print, ArgValues::one(Value::from("hi"))).unwrap();
    assert_eq!(out.output(), "hi\n");
}
