use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    args::ArgValues,
    builtins::type_::builtin_type,
    exception::{ExcType, RunResult},
    runtime::Runtime,
    types::Dict,
    value::Value,
};

/// Represents the Python type of a builtin value.
///
/// This enum is used both for type checking and as a callable constructor: the registry
/// exposes `int`, `str`, `type` and friends as `Builtins::Type(..)` values which dispatch
/// through [`Type::call`]. User classes and exception classes are not listed here,
/// see [`TypeRef`](crate::types::TypeRef).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum Type {
    Object,
    Type,
    #[strum(serialize = "NoneType")]
    NoneType,
    Ellipsis,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    Tuple,
    List,
    Dict,
    Function,
    #[strum(serialize = "builtin_function_or_method")]
    BuiltinFunction,
    Method,
    Cell,
    Code,
    Module,
    Iterator,
}

impl Type {
    /// Returns the builtin MRO of this type, most-derived first and always ending in `object`.
    #[must_use]
    pub fn mro(self) -> &'static [Self] {
        match self {
            Self::Object => &[Self::Object],
            Self::Type => &[Self::Type, Self::Object],
            Self::NoneType => &[Self::NoneType, Self::Object],
            Self::Ellipsis => &[Self::Ellipsis, Self::Object],
            Self::Bool => &[Self::Bool, Self::Int, Self::Object],
            Self::Int => &[Self::Int, Self::Object],
            Self::Float => &[Self::Float, Self::Object],
            Self::Str => &[Self::Str, Self::Object],
            Self::Bytes => &[Self::Bytes, Self::Object],
            Self::Tuple => &[Self::Tuple, Self::Object],
            Self::List => &[Self::List, Self::Object],
            Self::Dict => &[Self::Dict, Self::Object],
            Self::Function => &[Self::Function, Self::Object],
            Self::BuiltinFunction => &[Self::BuiltinFunction, Self::Object],
            Self::Method => &[Self::Method, Self::Object],
            Self::Cell => &[Self::Cell, Self::Object],
            Self::Code => &[Self::Code, Self::Object],
            Self::Module => &[Self::Module, Self::Object],
            Self::Iterator => &[Self::Iterator, Self::Object],
        }
    }

    /// Whether user classes may list this type among their bases.
    ///
    /// Only `object` and `type` carry no native payload; subclassing `type` is how metaclasses
    /// are declared.
    #[must_use]
    pub fn is_acceptable_base(self) -> bool {
        matches!(self, Self::Object | Self::Type)
    }

    /// Calls the type as a constructor, e.g. `int('3')` or `type(name, bases, ns)`.
    pub(crate) fn call(self, rt: &Runtime, args: ArgValues) -> RunResult<Value> {
        match self {
            Self::Type => builtin_type(args),
            Self::Int => {
                let [value] = args.unpack_tuple("int", 0, [Value::Int(0)])?;
                int_from_value(&value)
            }
            Self::Float => {
                let [value] = args.unpack_tuple("float", 0, [Value::Float(0.0)])?;
                float_from_value(&value)
            }
            Self::Str => {
                let [value] = args.unpack_tuple("str", 0, [Value::from("")])?;
                Ok(Value::Str(rt.py_str(&value)?.into()))
            }
            Self::Bool => {
                let [value] = args.unpack_tuple("bool", 0, [Value::Bool(false)])?;
                Ok(Value::Bool(value.is_truthy()))
            }
            Self::Tuple => {
                let [value] = args.unpack_tuple("tuple", 0, [Value::empty_tuple()])?;
                Ok(Value::Tuple(rt.collect_iterable(&value)?.into()))
            }
            Self::List => {
                let [value] = args.unpack_tuple("list", 0, [Value::empty_tuple()])?;
                Ok(Value::new_list(rt.collect_iterable(&value)?))
            }
            Self::Dict => {
                let (positional, kwargs) = args.into_parts();
                let dict = match positional.as_slice() {
                    [] => Dict::new(),
                    [Value::Dict(source)] => source.copy(),
                    [other] => {
                        return Err(ExcType::type_error(format!(
                            "'{}' object is not a mapping",
                            other.py_type()
                        )));
                    }
                    _ => return Err(ExcType::type_error_at_most("dict", 1, positional.len())),
                };
                if let Some(kwargs) = kwargs {
                    for (key, value) in kwargs.items() {
                        dict.set(key, value);
                    }
                }
                Ok(Value::Dict(dict))
            }
            _ => Err(ExcType::type_error(format!("cannot create '{self}' instances"))),
        }
    }
}

/// `int(x)`: truncates floats and parses base-10 strings.
fn int_from_value(value: &Value) -> RunResult<Value> {
    match value {
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Int(_) | Value::LongInt(_) => Ok(value.clone()),
        Value::Float(f) => {
            if f.is_nan() {
                Err(ExcType::value_error("cannot convert float NaN to integer"))
            } else if f.is_infinite() {
                Err(ExcType::overflow_error("cannot convert float infinity to integer"))
            } else {
                let truncated = BigInt::from_f64(f.trunc()).ok_or_else(|| ExcType::value_error("invalid float"))?;
                Ok(Value::from(truncated))
            }
        }
        Value::Str(s) => {
            let trimmed = s.trim().replace('_', "");
            BigInt::from_str(&trimmed)
                .map(Value::from)
                .map_err(|_| {
                    ExcType::value_error(format!("invalid literal for int() with base 10: {}", value.py_repr()))
                })
        }
        other => Err(ExcType::type_error(format!(
            "int() argument must be a string, a bytes-like object or a real number, not '{}'",
            other.py_type()
        ))),
    }
}

/// `float(x)`: accepts numbers and decimal strings including `inf` and `nan`.
fn float_from_value(value: &Value) -> RunResult<Value> {
    match value {
        Value::Float(_) => Ok(value.clone()),
        Value::Bool(b) => Ok(Value::Float(f64::from(u8::from(*b)))),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::LongInt(i) => i
            .to_f64()
            .filter(|f| f.is_finite())
            .map(Value::Float)
            .ok_or_else(|| ExcType::overflow_error("int too large to convert to float")),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ExcType::value_error(format!("could not convert string to float: {}", value.py_repr()))),
        other => Err(ExcType::type_error(format!(
            "float() argument must be a string or a real number, not '{}'",
            other.py_type()
        ))),
    }
}
