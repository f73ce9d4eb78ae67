//! Python builtin functions, types, and exception constructors.
//!
//! Each builtin function has its own submodule; this module holds the [`Builtins`] value
//! enum, the [`BuiltinsFunctions`] dispatch table and the immutable registry behind
//! [`lookup_builtin`] and [`builtins_namespace`].

mod abs;
mod attr; // getattr, hasattr and setattr share name validation
mod build_class;
mod chr;
mod compile;
mod import;
mod len;
mod next;
mod ord;
mod pow;
mod print;
mod round;
pub(crate) mod type_;

use std::sync::LazyLock;

use indexmap::IndexMap;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

pub use compile::CompileMode;

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    runtime::Runtime,
    types::{Dict, Type},
    value::Value,
};

/// A builtin callable: a function, a builtin type or an exception class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Builtins {
    /// A builtin function like `print`, `len`, `__build_class__`.
    Function(BuiltinsFunctions),
    /// A type constructor like `int`, `dict` or `type`.
    Type(Type),
    /// An exception class like `ValueError`.
    ExcType(ExcType),
}

/// Enumerates every builtin function this layer provides.
///
/// Uses strum derives for automatic `Display`, `FromStr`, and `&'static str` conversions.
/// Variants serialize to lowercase (e.g., `Print` -> "print"); the dunder entry points
/// carry explicit names.
#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    EnumString,
    IntoStaticStr,
    EnumIter,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum BuiltinsFunctions {
    #[strum(serialize = "__build_class__")]
    BuildClass,
    #[strum(serialize = "__import__")]
    Import,
    Abs,
    Chr,
    Compile,
    Getattr,
    Hasattr,
    Len,
    Next,
    Ord,
    Pow,
    Print,
    Round,
    Setattr,
}

impl BuiltinsFunctions {
    /// Executes the builtin with the provided arguments.
    pub(crate) fn call(self, rt: &Runtime, args: ArgValues) -> RunResult<Value> {
        match self {
            Self::BuildClass => build_class::builtin_build_class(rt, args),
            Self::Import => import::builtin_import(rt, args),
            Self::Abs => abs::builtin_abs(rt, args),
            Self::Chr => chr::builtin_chr(args),
            Self::Compile => compile::builtin_compile(rt, args),
            Self::Getattr => attr::builtin_getattr(rt, args),
            Self::Hasattr => attr::builtin_hasattr(rt, args),
            Self::Len => len::builtin_len(rt, args),
            Self::Next => next::builtin_next(rt, args),
            Self::Ord => ord::builtin_ord(args),
            Self::Pow => pow::builtin_pow(rt, args),
            Self::Print => print::builtin_print(rt, args),
            Self::Round => round::builtin_round(rt, args),
            Self::Setattr => attr::builtin_setattr(rt, args),
        }
    }
}

/// Builtin type names exposed in the namespace.
const BUILTIN_TYPES: [Type; 10] = [
    Type::Bool,
    Type::Bytes,
    Type::Dict,
    Type::Float,
    Type::Int,
    Type::List,
    Type::Object,
    Type::Str,
    Type::Tuple,
    Type::Type,
];

/// Name to value table of the `builtins` module, built once on first use.
static REGISTRY: LazyLock<IndexMap<&'static str, Entry>> = LazyLock::new(|| {
    let mut table = IndexMap::new();
    table.insert("None", Entry::None);
    table.insert("Ellipsis", Entry::Ellipsis);
    table.insert("False", Entry::Bool(false));
    table.insert("True", Entry::Bool(true));
    for func in BuiltinsFunctions::iter() {
        table.insert(func.into(), Entry::Builtin(Builtins::Function(func)));
    }
    for t in BUILTIN_TYPES {
        table.insert(t.into(), Entry::Builtin(Builtins::Type(t)));
    }
    for exc in ExcType::iter() {
        table.insert(exc.into(), Entry::Builtin(Builtins::ExcType(exc)));
    }
    table.insert("EnvironmentError", Entry::Builtin(Builtins::ExcType(ExcType::OSError)));
    table.insert("IOError", Entry::Builtin(Builtins::ExcType(ExcType::OSError)));
    table
});

/// Registry entry; plain data so the table is `Sync`.
#[derive(Debug, Clone, Copy)]
enum Entry {
    None,
    Ellipsis,
    Bool(bool),
    Builtin(Builtins),
}

impl Entry {
    fn to_value(self) -> Value {
        match self {
            Self::None => Value::None,
            Self::Ellipsis => Value::Ellipsis,
            Self::Bool(b) => Value::Bool(b),
            Self::Builtin(b) => Value::Builtin(b),
        }
    }
}

/// Looks up a name in the `builtins` namespace.
#[must_use]
pub fn lookup_builtin(name: &str) -> Option<Value> {
    REGISTRY.get(name).map(|entry| entry.to_value())
}

/// Materializes the `builtins` namespace as a fresh dict, e.g. for a module's `__builtins__`.
#[must_use]
pub fn builtins_namespace() -> Dict {
    Dict::from_pairs(REGISTRY.iter().map(|(name, entry)| (*name, entry.to_value())))
}
