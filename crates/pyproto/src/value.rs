use std::{
    borrow::Cow,
    cell::RefCell,
    fmt::Write,
    rc::Rc,
};

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::{
    builtins::Builtins,
    exception::SimpleException,
    types::{BoundMethod, Cell, ClassObject, Code, Dict, Function, Instance, Module, PyIter, Type, TypeRef},
};

/// Primary value type representing Python objects at runtime.
///
/// Immediate values (`None`, `Bool`, `Int`, `Float`) are stored inline; everything else is
/// reference counted so that cloning a `Value` clones a handle, never the object.
/// Integers live in `Int` while they fit an `i64` and are promoted to `LongInt` otherwise;
/// `Value::from(BigInt)` demotes results that fit back to `Int`.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Ellipsis,
    Bool(bool),
    Int(i64),
    LongInt(Rc<BigInt>),
    Float(f64),
    Str(Rc<str>),
    Bytes(Rc<[u8]>),
    Tuple(Rc<[Value]>),
    List(Rc<RefCell<Vec<Value>>>),
    Dict(Dict),
    /// A builtin function, builtin type or exception class.
    Builtin(Builtins),
    Class(Rc<ClassObject>),
    Instance(Rc<Instance>),
    Function(Rc<Function>),
    BoundMethod(Rc<BoundMethod>),
    Cell(Cell),
    Code(Rc<Code>),
    Module(Rc<Module>),
    Iter(Rc<RefCell<PyIter>>),
    /// An exception instance that has been created but not raised.
    Exception(Rc<SimpleException>),
}

impl Value {
    #[must_use]
    pub fn empty_tuple() -> Self {
        Self::Tuple(Rc::from(Vec::new()))
    }

    #[must_use]
    pub fn new_list(items: Vec<Self>) -> Self {
        Self::List(Rc::new(RefCell::new(items)))
    }

    /// Returns the class of this value: what `type(value)` evaluates to.
    #[must_use]
    pub fn py_type(&self) -> TypeRef {
        let builtin = match self {
            Self::None => Type::NoneType,
            Self::Ellipsis => Type::Ellipsis,
            Self::Bool(_) => Type::Bool,
            Self::Int(_) | Self::LongInt(_) => Type::Int,
            Self::Float(_) => Type::Float,
            Self::Str(_) => Type::Str,
            Self::Bytes(_) => Type::Bytes,
            Self::Tuple(_) => Type::Tuple,
            Self::List(_) => Type::List,
            Self::Dict(_) => Type::Dict,
            Self::Builtin(Builtins::Function(_)) => Type::BuiltinFunction,
            Self::Builtin(Builtins::Type(_) | Builtins::ExcType(_)) => Type::Type,
            Self::Class(cls) => return cls.metaclass().clone(),
            Self::Instance(inst) => return TypeRef::Class(inst.class().clone()),
            Self::Function(_) => Type::Function,
            Self::BoundMethod(_) => Type::Method,
            Self::Cell(_) => Type::Cell,
            Self::Code(_) => Type::Code,
            Self::Module(_) => Type::Module,
            Self::Iter(_) => Type::Iterator,
            Self::Exception(exc) => return TypeRef::Exc(exc.exc_type()),
        };
        TypeRef::Builtin(builtin)
    }

    /// Returns the class this value denotes, if the value is itself a class.
    #[must_use]
    pub fn as_type(&self) -> Option<TypeRef> {
        match self {
            Self::Builtin(Builtins::Type(t)) => Some(TypeRef::Builtin(*t)),
            Self::Builtin(Builtins::ExcType(e)) => Some(TypeRef::Exc(*e)),
            Self::Class(cls) => Some(TypeRef::Class(cls.clone())),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an `i64` if it is a `bool` or an `int` that fits.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Int(i) => Some(*i),
            Self::LongInt(i) => i.to_i64(),
            _ => None,
        }
    }

    /// Truthiness of builtin values; instances of user classes are always true.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            // long integers are never zero, zero always demotes to Int
            Self::LongInt(_) => true,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Bytes(b) => !b.is_empty(),
            Self::Tuple(t) => !t.is_empty(),
            Self::List(l) => !l.borrow().is_empty(),
            Self::Dict(d) => !d.is_empty(),
            _ => true,
        }
    }

    /// `str(value)` without consulting user-defined `__str__`.
    ///
    /// See [`Runtime::py_str`](crate::Runtime::py_str) for the version that dispatches to
    /// instances' `__str__` and `__repr__`.
    #[must_use]
    pub fn py_str(&self) -> Cow<'_, str> {
        match self {
            Self::Str(s) => Cow::Borrowed(s),
            Self::Exception(exc) => Cow::Borrowed(exc.py_str()),
            _ => Cow::Owned(self.py_repr()),
        }
    }

    /// `repr(value)` without consulting user-defined `__repr__`.
    #[must_use]
    pub fn py_repr(&self) -> String {
        let mut out = String::new();
        self.repr_fmt(&mut out);
        out
    }

    fn repr_fmt(&self, out: &mut String) {
        match self {
            Self::None => out.push_str("None"),
            Self::Ellipsis => out.push_str("Ellipsis"),
            Self::Bool(true) => out.push_str("True"),
            Self::Bool(false) => out.push_str("False"),
            Self::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Self::LongInt(i) => {
                let _ = write!(out, "{i}");
            }
            Self::Float(f) => out.push_str(&float_repr(*f)),
            Self::Str(s) => out.push_str(&str_repr(s)),
            Self::Bytes(b) => out.push_str(&bytes_repr(b)),
            Self::Tuple(items) => {
                out.push('(');
                seq_repr_fmt(items, out);
                if items.len() == 1 {
                    out.push(',');
                }
                out.push(')');
            }
            Self::List(items) => {
                out.push('[');
                seq_repr_fmt(&items.borrow(), out);
                out.push(']');
            }
            Self::Dict(dict) => {
                out.push('{');
                for (i, (key, value)) in dict.items().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&str_repr(key));
                    out.push_str(": ");
                    value.repr_fmt(out);
                }
                out.push('}');
            }
            Self::Builtin(Builtins::Function(f)) => {
                let _ = write!(out, "<built-in function {f}>");
            }
            Self::Builtin(Builtins::Type(t)) => {
                let _ = write!(out, "<class '{t}'>");
            }
            Self::Builtin(Builtins::ExcType(e)) => {
                let _ = write!(out, "<class '{e}'>");
            }
            Self::Class(cls) => match cls.namespace().get("__module__") {
                Some(Self::Str(module)) if &*module != "builtins" => {
                    let _ = write!(out, "<class '{module}.{}'>", cls.name());
                }
                _ => {
                    let _ = write!(out, "<class '{}'>", cls.name());
                }
            },
            Self::Instance(inst) => {
                let _ = write!(out, "<{} object>", inst.class().name());
            }
            Self::Function(f) => {
                let _ = write!(out, "<function {}>", f.name());
            }
            Self::BoundMethod(m) => {
                let name = match m.function() {
                    Self::Function(f) => f.name().to_owned(),
                    other => other.py_repr(),
                };
                let _ = write!(out, "<bound method {name} of ");
                m.receiver().repr_fmt(out);
                out.push('>');
            }
            Self::Cell(cell) => out.push_str(if cell.is_empty() { "<cell: empty>" } else { "<cell>" }),
            Self::Code(code) => {
                let _ = write!(out, "<code object {}, file \"{}\">", code.name(), code.filename());
            }
            Self::Module(module) => {
                let _ = write!(out, "<module '{}'>", module.name());
            }
            Self::Iter(_) => out.push_str("<iterator object>"),
            Self::Exception(exc) => out.push_str(&exc.py_repr()),
        }
    }
}

fn seq_repr_fmt(items: &[Value], out: &mut String) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.repr_fmt(out);
    }
}

/// Quotes a string the way CPython's `repr()` does.
///
/// Single quotes are preferred; double quotes are used when the text contains a single
/// quote but no double quote.
#[must_use]
pub(crate) fn str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn bytes_repr(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') { b'"' } else { b'\'' };
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(char::from(quote));
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b == quote => {
                out.push('\\');
                out.push(char::from(b));
            }
            0x20..0x7f => out.push(char::from(b)),
            b => {
                let _ = write!(out, "\\x{b:02x}");
            }
        }
    }
    out.push(char::from(quote));
    out
}

/// Formats a float like CPython's `repr()`.
fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f.is_sign_negative() { "-inf" } else { "inf" }.to_string();
    }
    // shortest round-tripping digits
    let mut buffer = ryu::Buffer::new();
    fix_ryu_exponent(buffer.format(f))
}

/// Converts ryu output to CPython's spelling: `1e+20` rather than `1e20`, `1e-07` rather
/// than `1e-7`, and `3.0` rather than `3`.
fn fix_ryu_exponent(s: &str) -> String {
    if let Some(e_pos) = s.find('e') {
        let (mantissa, exp_part) = s.split_at(e_pos);
        let exp = &exp_part[1..];
        let (sign, digits) = match exp.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exp),
        };
        return format!("{mantissa}e{sign}{digits:0>2}");
    }
    if s.contains('.') { s.to_string() } else { format!("{s}.0") }
}

fn int_eq(a: &Value, b: &Value) -> Option<bool> {
    let as_big = |v: &Value| match v {
        Value::Bool(x) => Some(BigInt::from(u8::from(*x))),
        Value::Int(x) => Some(BigInt::from(*x)),
        Value::LongInt(x) => Some(x.as_ref().clone()),
        _ => None,
    };
    Some(as_big(a)? == as_big(b)?)
}

fn float_eq(a: &Value, b: &Value) -> Option<bool> {
    let as_float = |v: &Value| match v {
        Value::Float(x) => Some(*x),
        Value::Bool(x) => Some(f64::from(u8::from(*x))),
        Value::Int(x) => Some(*x as f64),
        Value::LongInt(x) => x.to_f64(),
        _ => None,
    };
    Some(as_float(a)? == as_float(b)?)
}

/// Python `==` for builtin values; mutable and user objects compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) | (Self::Ellipsis, Self::Ellipsis) => true,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::List(a), Self::List(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Self::Dict(a), Self::Dict(b)) => {
                a.ptr_eq(b)
                    || (a.len() == b.len() && a.items().into_iter().all(|(k, v)| b.get(&k).is_some_and(|bv| bv == v)))
            }
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            (Self::Class(a), Self::Class(b)) => Rc::ptr_eq(a, b),
            (Self::Instance(a), Self::Instance(b)) => Rc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::BoundMethod(a), Self::BoundMethod(b)) => Rc::ptr_eq(a, b),
            (Self::Cell(a), Self::Cell(b)) => a.ptr_eq(b),
            (Self::Code(a), Self::Code(b)) => Rc::ptr_eq(a, b),
            (Self::Module(a), Self::Module(b)) => Rc::ptr_eq(a, b),
            (Self::Iter(a), Self::Iter(b)) => Rc::ptr_eq(a, b),
            (Self::Exception(a), Self::Exception(b)) => Rc::ptr_eq(a, b),
            _ => int_eq(self, other).or_else(|| float_eq(self, other)).unwrap_or(false),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s.into())
    }
}

impl From<BigInt> for Value {
    /// Demotes to `Int` when the value fits in an `i64`.
    fn from(i: BigInt) -> Self {
        match i.to_i64() {
            Some(small) => Self::Int(small),
            None => Self::LongInt(Rc::new(i)),
        }
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Self::Dict(d)
    }
}

impl From<Vec<Self>> for Value {
    /// Builds a tuple.
    fn from(items: Vec<Self>) -> Self {
        Self::Tuple(items.into())
    }
}
