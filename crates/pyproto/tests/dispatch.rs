//! Capability dispatch of `len`, `abs`, `pow`, `round`, `ord` and `chr`.
mod common;

use common::{err_text, function, instance, make_class, returning, runtime};
use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use pyproto::{ArgValues, Dict, ExcType, ResourceLimits, Runtime, Value};

fn call1(rt: &Runtime, name: &str, arg: Value) -> pyproto::RunResult<Value> {
    rt.call_builtin(name, ArgValues::one(arg))
}

fn call(rt: &Runtime, name: &str, args: Vec<Value>) -> pyproto::RunResult<Value> {
    rt.call_builtin(name, ArgValues::positional(args))
}

#[test]
fn len_of_builtin_containers() {
    let rt = runtime();
    assert_eq!(call1(&rt, "len", Value::from("héllo")).unwrap(), Value::Int(5));
    assert_eq!(
        call1(&rt, "len", Value::from(vec![Value::None, Value::None])).unwrap(),
        Value::Int(2)
    );
    assert_eq!(call1(&rt, "len", Value::new_list(vec![])).unwrap(), Value::Int(0));
    let dict = Dict::from_pairs([("a", Value::Int(1))]);
    assert_eq!(call1(&rt, "len", Value::Dict(dict)).unwrap(), Value::Int(1));
}

#[test]
fn len_dispatches_to_user_capability() {
    let rt = runtime();
    let ns = Dict::from_pairs([("__len__", returning("__len__", &["self"], Value::Int(3)))]);
    let sized = make_class(&rt, "Sized", vec![], ns);
    let obj = instance(&rt, &sized);
    assert_eq!(call1(&rt, "len", obj).unwrap(), Value::Int(3));
}

#[test]
fn len_rejects_negative_and_missing() {
    let rt = runtime();
    let ns = Dict::from_pairs([("__len__", returning("__len__", &["self"], Value::Int(-1)))]);
    let broken = make_class(&rt, "Broken", vec![], ns);
    let obj = instance(&rt, &broken);
    assert_eq!(err_text(call1(&rt, "len", obj)), "ValueError: __len__() should return >= 0");

    assert_eq!(
        err_text(call1(&rt, "len", Value::Int(5))),
        "TypeError: object of type 'int' has no len()"
    );
    let plain = make_class(&rt, "Plain", vec![], Dict::new());
    let obj = instance(&rt, &plain);
    assert_eq!(
        err_text(call1(&rt, "len", obj)),
        "TypeError: object of type 'Plain' has no len()"
    );
}

#[test]
fn abs_native_and_user() {
    let rt = runtime();
    assert_eq!(call1(&rt, "abs", Value::Int(-5)).unwrap(), Value::Int(5));
    assert_eq!(call1(&rt, "abs", Value::Float(-2.5)).unwrap(), Value::Float(2.5));
    assert_eq!(call1(&rt, "abs", Value::Bool(true)).unwrap(), Value::Int(1));

    let promoted = call1(&rt, "abs", Value::Int(i64::MIN)).unwrap();
    assert!(matches!(promoted, Value::LongInt(_)));
    assert_eq!(promoted.py_repr(), "9223372036854775808");

    let ns = Dict::from_pairs([("__abs__", returning("__abs__", &["self"], Value::from("abs!")))]);
    let cls = make_class(&rt, "Absolute", vec![], ns);
    assert_eq!(call1(&rt, "abs", instance(&rt, &cls)).unwrap(), Value::from("abs!"));

    assert_eq!(
        err_text(call1(&rt, "abs", Value::from("x"))),
        "TypeError: bad operand type for abs(): 'str'"
    );
}

#[test]
fn pow_integer_and_float_forms() {
    let rt = runtime();
    assert_eq!(call(&rt, "pow", vec![Value::Int(2), Value::Int(10)]).unwrap(), Value::Int(1024));
    assert_eq!(
        call(&rt, "pow", vec![Value::Int(2), Value::Int(100)]).unwrap().py_repr(),
        "1267650600228229401496703205376"
    );
    let half = call(&rt, "pow", vec![Value::Int(2), Value::Int(-1)]).unwrap();
    assert!(matches!(half, Value::Float(f) if f == 0.5));
    assert_eq!(
        call(&rt, "pow", vec![Value::Float(1.5), Value::Int(2)]).unwrap(),
        Value::Float(2.25)
    );
}

#[test]
fn pow_explicit_none_modulus_is_two_argument_form() {
    let rt = runtime();
    let result = call(&rt, "pow", vec![Value::Int(3), Value::Int(2), Value::None]).unwrap();
    assert_eq!(result, Value::Int(9));
}

#[test]
fn pow_three_argument_form() {
    let rt = runtime();
    let result = call(&rt, "pow", vec![Value::Int(3), Value::Int(4), Value::Int(5)]).unwrap();
    assert_eq!(result, Value::Int(1));
    let inverse = call(&rt, "pow", vec![Value::Int(3), Value::Int(-1), Value::Int(7)]).unwrap();
    assert_eq!(inverse, Value::Int(5));

    assert_eq!(
        err_text(call(&rt, "pow", vec![Value::Int(2), Value::Int(3), Value::Int(0)])),
        "ValueError: pow() 3rd argument cannot be 0"
    );
    assert_eq!(
        err_text(call(&rt, "pow", vec![Value::Int(2), Value::Int(-1), Value::Int(4)])),
        "ValueError: base is not invertible for the given modulus"
    );
    assert_eq!(
        err_text(call(&rt, "pow", vec![Value::Float(2.0), Value::Int(3), Value::Int(5)])),
        "TypeError: pow() 3rd argument not allowed unless all arguments are integers"
    );
}

#[test]
fn pow_errors() {
    let rt = runtime();
    let err = call(&rt, "pow", vec![Value::Float(0.0), Value::Int(-1)]).unwrap_err();
    assert!(err.is_exception_type(ExcType::ZeroDivisionError));
    assert_eq!(
        err_text(call(&rt, "pow", vec![Value::from("a"), Value::Int(2)])),
        "TypeError: unsupported operand type(s) for ** or pow(): 'str' and 'int'"
    );
    assert_eq!(
        err_text(call(&rt, "pow", vec![Value::from("a"), Value::Int(2), Value::Int(3)])),
        "TypeError: unsupported operand type(s) for ** or pow(): 'str', 'int', 'int'"
    );
    assert_eq!(
        err_text(call(&rt, "pow", vec![Value::Int(2)])),
        "TypeError: pow expected at least 2 arguments, got 1"
    );
}

#[test]
fn pow_respects_integer_size_limit() {
    let rt = Runtime::builder()
        .limits(ResourceLimits::new().max_int_bits(1024))
        .build();
    let err = call(&rt, "pow", vec![Value::Int(2), Value::Int(100_000)]).unwrap_err();
    assert!(err.is_exception_type(ExcType::MemoryError));
}

#[test]
fn pow_dispatches_to_user_capability() {
    let rt = runtime();
    let pow = function("__pow__", &["self", "exp"], |_, frame| Ok(frame.locals.get("exp")));
    let cls = make_class(&rt, "Powered", vec![], Dict::from_pairs([("__pow__", pow)]));
    let obj = instance(&rt, &cls);
    assert_eq!(call(&rt, "pow", vec![obj, Value::Int(7)]).unwrap(), Value::Int(7));
}

#[test]
fn round_floats_and_ints() {
    let rt = runtime();
    let two = call(&rt, "round", vec![Value::Float(2.5), Value::None]).unwrap();
    assert!(matches!(two, Value::Int(2)));
    let four = call(&rt, "round", vec![Value::Float(3.5), Value::None]).unwrap();
    assert!(matches!(four, Value::Int(4)));

    let default = call(&rt, "round", vec![Value::Float(3.7)]).unwrap();
    assert!(matches!(default, Value::Float(f) if f == 4.0));

    assert_eq!(
        call(&rt, "round", vec![Value::Float(2.675), Value::Int(2)]).unwrap(),
        Value::Float(2.67)
    );
    assert_eq!(
        call(&rt, "round", vec![Value::Int(1250), Value::Int(-2)]).unwrap(),
        Value::Int(1200)
    );
    assert_eq!(
        call(&rt, "round", vec![Value::Int(1350), Value::Int(-2)]).unwrap(),
        Value::Int(1400)
    );
    assert_eq!(call(&rt, "round", vec![Value::Int(7)]).unwrap(), Value::Int(7));
}

#[test]
fn round_errors() {
    let rt = runtime();
    assert_eq!(
        err_text(call(&rt, "round", vec![Value::from("x")])),
        "TypeError: type str doesn't define __round__ method"
    );
    let err = call(&rt, "round", vec![Value::Float(f64::NAN), Value::None]).unwrap_err();
    assert!(err.is_exception_type(ExcType::ValueError));
    let err = call(&rt, "round", vec![Value::Float(f64::INFINITY), Value::None]).unwrap_err();
    assert!(err.is_exception_type(ExcType::OverflowError));
}

#[test]
fn round_dispatches_to_user_capability() {
    let rt = runtime();
    let round = function("__round__", &["self", "ndigits"], |_, frame| Ok(frame.locals.get("ndigits")));
    let cls = make_class(&rt, "Rounded", vec![], Dict::from_pairs([("__round__", round)]));
    let obj = instance(&rt, &cls);
    assert_eq!(call(&rt, "round", vec![obj]).unwrap(), Value::Int(0));
}

#[test]
fn chr_inverts_ord() {
    let rt = runtime();
    for c in ["a", "Z", "0", "é", "€", "😀", "\u{10FFFF}"] {
        let code = call1(&rt, "ord", Value::from(c)).unwrap();
        assert_eq!(call1(&rt, "chr", code).unwrap(), Value::from(c));
    }
}

#[test]
fn chr_range_and_type() {
    let rt = runtime();
    for bad in [-1, 0x11_0000] {
        assert_eq!(
            err_text(call1(&rt, "chr", Value::Int(bad))),
            "ValueError: chr() arg not in range(0x110000)"
        );
    }
    for big in [BigInt::from(1) << 70, -(BigInt::from(1) << 70u32)] {
        assert_eq!(
            err_text(call1(&rt, "chr", Value::from(big))),
            "ValueError: chr() arg not in range(0x110000)"
        );
    }
    assert_eq!(
        err_text(call1(&rt, "chr", Value::from("a"))),
        "TypeError: 'str' object cannot be interpreted as an integer"
    );
    assert_eq!(call1(&rt, "chr", Value::Int(0xD800)).unwrap(), Value::from("\u{FFFD}"));
    assert_eq!(call1(&rt, "chr", Value::Bool(true)).unwrap(), Value::from("\u{1}"));
}

#[test]
fn ord_rejects_wrong_lengths_and_kinds() {
    let rt = runtime();
    assert_eq!(
        call1(&rt, "ord", Value::Bytes(b"A".as_slice().into())).unwrap(),
        Value::Int(65)
    );
    assert_eq!(
        err_text(call1(&rt, "ord", Value::from("ab"))),
        "TypeError: ord() expected a character, but string of length 2 found"
    );
    assert_eq!(
        err_text(call1(&rt, "ord", Value::from(""))),
        "TypeError: ord() expected a character, but string of length 0 found"
    );
    assert_eq!(
        err_text(call1(&rt, "ord", Value::Int(1))),
        "TypeError: ord() expected string of length 1, but int found"
    );
}
