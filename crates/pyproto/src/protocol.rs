//! Capability dispatch: the generic operations behind `len`, `abs`, `pow`, `round`, `next`,
//! attribute access and `str()`.
//!
//! Every operation first tries the native implementation for builtin values, then probes the
//! value's class for the matching dunder with a raw MRO lookup and calls it through
//! [`Runtime::call`]. Absence of both produces the CPython `TypeError` for that operation.

use std::rc::Rc;

use crate::{
    args::ArgValues,
    builtins::Builtins,
    exception::{ExcType, RunError, RunResult},
    runtime::Runtime,
    types::{
        BoundMethod, Dict, NextResult, PyIter, TypeRef,
        number::{abs_value, ndigits_arg, pow_values, round_value},
    },
    value::Value,
};

impl Runtime {
    /// Looks `name` up on the class of `receiver` and calls it with `receiver` prepended.
    ///
    /// Returns `None` when the class does not provide the capability.
    pub(crate) fn call_capability(&self, receiver: &Value, name: &str, args: Vec<Value>) -> Option<RunResult<Value>> {
        self.call_capability_kw(receiver, name, args, None)
    }

    /// [`Runtime::call_capability`] with keyword arguments, which are passed through uncopied.
    pub(crate) fn call_capability_kw(
        &self,
        receiver: &Value,
        name: &str,
        args: Vec<Value>,
        kwargs: Option<&Dict>,
    ) -> Option<RunResult<Value>> {
        let method = receiver.py_type().lookup(name)?;
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(receiver.clone());
        full.extend(args);
        Some(self.call(&method, ArgValues::new(full, kwargs.cloned())))
    }

    /// `len(value)`.
    pub fn py_len(&self, value: &Value) -> RunResult<usize> {
        let native = match value {
            Value::Str(s) => Some(s.chars().count()),
            Value::Bytes(b) => Some(b.len()),
            Value::Tuple(t) => Some(t.len()),
            Value::List(l) => Some(l.borrow().len()),
            Value::Dict(d) => Some(d.len()),
            _ => None,
        };
        if let Some(len) = native {
            return Ok(len);
        }

        let Some(result) = self.call_capability(value, "__len__", Vec::new()) else {
            return Err(ExcType::type_error(format!(
                "object of type '{}' has no len()",
                value.py_type()
            )));
        };
        match result? {
            Value::Bool(b) => Ok(usize::from(b)),
            Value::Int(n) => usize::try_from(n).map_err(|_| ExcType::value_error("__len__() should return >= 0")),
            Value::LongInt(n) if n.sign() == num_bigint::Sign::Minus => {
                Err(ExcType::value_error("__len__() should return >= 0"))
            }
            Value::LongInt(_) => Err(ExcType::overflow_error(
                "cannot fit 'int' into an index-sized integer",
            )),
            other => Err(ExcType::type_error_not_integer(other.py_type().name())),
        }
    }

    /// `abs(value)`.
    pub fn py_abs(&self, value: &Value) -> RunResult<Value> {
        if let Some(result) = abs_value(value) {
            return Ok(result);
        }
        self.call_capability(value, "__abs__", Vec::new()).unwrap_or_else(|| {
            Err(ExcType::type_error(format!(
                "bad operand type for abs(): '{}'",
                value.py_type()
            )))
        })
    }

    /// `pow(base, exp[, modulus])`; `modulus` of `None` is the two-argument form.
    pub fn py_pow(&self, base: &Value, exp: &Value, modulus: Option<&Value>) -> RunResult<Value> {
        if let Some(result) = pow_values(base, exp, modulus, self.limits().max_int_bits) {
            return result;
        }

        let mut args = vec![exp.clone()];
        args.extend(modulus.cloned());
        if let Some(result) = self.call_capability(base, "__pow__", args) {
            return result;
        }
        if modulus.is_none()
            && let Some(result) = self.call_capability(exp, "__rpow__", vec![base.clone()])
        {
            return result;
        }

        Err(ExcType::type_error(match modulus {
            None => format!(
                "unsupported operand type(s) for ** or pow(): '{}' and '{}'",
                base.py_type(),
                exp.py_type()
            ),
            Some(m) => format!(
                "unsupported operand type(s) for ** or pow(): '{}', '{}', '{}'",
                base.py_type(),
                exp.py_type(),
                m.py_type()
            ),
        }))
    }

    /// `round(number, ndigits)`; an `ndigits` of `None` rounds to an integer.
    pub fn py_round(&self, number: &Value, ndigits: &Value) -> RunResult<Value> {
        if matches!(number, Value::Bool(_) | Value::Int(_) | Value::LongInt(_) | Value::Float(_))
            && let Some(result) = round_value(number, ndigits_arg(ndigits)?)
        {
            return result;
        }
        let args = if matches!(ndigits, Value::None) {
            Vec::new()
        } else {
            vec![ndigits.clone()]
        };
        self.call_capability(number, "__round__", args).unwrap_or_else(|| {
            Err(ExcType::type_error(format!(
                "type {} doesn't define __round__ method",
                number.py_type()
            )))
        })
    }

    /// `iter(value)`: builtin sequences give a snapshot iterator; user classes use `__iter__`.
    pub fn py_iter(&self, value: &Value) -> RunResult<Value> {
        let items: Rc<[Value]> = match value {
            Value::Iter(_) => return Ok(value.clone()),
            Value::Tuple(t) => t.clone(),
            Value::List(l) => l.borrow().as_slice().into(),
            Value::Dict(d) => d.keys().into_iter().map(Value::Str).collect(),
            Value::Str(s) => s.chars().map(|c| Value::Str(c.to_string().into())).collect(),
            Value::Bytes(b) => b.iter().map(|byte| Value::Int(i64::from(*byte))).collect(),
            _ => {
                return self
                    .call_capability(value, "__iter__", Vec::new())
                    .unwrap_or_else(|| Err(ExcType::type_error_not_iterable(value.py_type().name())));
            }
        };
        Ok(Value::Iter(Rc::new(std::cell::RefCell::new(PyIter::new(items)))))
    }

    /// Advances an iterator once, separating exhaustion from failure.
    ///
    /// Only an exact `StopIteration` counts as exhaustion; subclasses are failures.
    pub fn py_next(&self, iterator: &Value) -> NextResult {
        if let Value::Iter(iter) = iterator {
            return match iter.borrow_mut().advance() {
                Some(item) => NextResult::Produced(item),
                None => NextResult::Exhausted(None),
            };
        }
        match self.call_capability(iterator, "__next__", Vec::new()) {
            Some(Ok(item)) => NextResult::Produced(item),
            Some(Err(err)) if err.is_exception_type(ExcType::StopIteration) => NextResult::Exhausted(Some(err)),
            Some(Err(err)) => NextResult::Failed(err),
            None => NextResult::Failed(ExcType::type_error(format!(
                "'{}' object is not an iterator",
                iterator.py_type()
            ))),
        }
    }

    /// Drains any iterable into a vector.
    pub fn collect_iterable(&self, value: &Value) -> RunResult<Vec<Value>> {
        match value {
            Value::Tuple(t) => return Ok(t.to_vec()),
            Value::List(l) => return Ok(l.borrow().clone()),
            _ => {}
        }
        let iterator = self.py_iter(value)?;
        let mut items = Vec::new();
        loop {
            match self.py_next(&iterator) {
                NextResult::Produced(item) => items.push(item),
                NextResult::Exhausted(_) => return Ok(items),
                NextResult::Failed(err) => return Err(err),
            }
        }
    }

    /// `str(value)`, consulting `__str__` then `__repr__` on user classes.
    pub fn py_str(&self, value: &Value) -> RunResult<String> {
        if matches!(value, Value::Instance(_)) {
            for name in ["__str__", "__repr__"] {
                if let Some(result) = self.call_capability(value, name, Vec::new()) {
                    return match result? {
                        Value::Str(s) => Ok(s.to_string()),
                        other => Err(ExcType::type_error(format!(
                            "{name} returned non-string (type {})",
                            other.py_type()
                        ))),
                    };
                }
            }
        }
        Ok(value.py_str().into_owned())
    }

    /// `getattr(obj, name)` without a default.
    ///
    /// # Errors
    /// `AttributeError` when the attribute does not exist; errors raised by a
    /// user-defined `__getattr__` propagate unchanged.
    pub fn getattr(&self, obj: &Value, name: &str) -> RunResult<Value> {
        if name == "__class__" {
            return Ok(obj.py_type().into_value());
        }
        match obj {
            Value::Instance(inst) => {
                if name == "__dict__" {
                    return Ok(Value::Dict(inst.dict().clone()));
                }
                if let Some(value) = inst.dict().get(name) {
                    return Ok(value);
                }
                if let Some(value) = inst.class().lookup(name) {
                    return Ok(bind(obj, value));
                }
                if let Some(result) = self.call_capability(obj, "__getattr__", vec![Value::from(name)]) {
                    return result;
                }
                Err(ExcType::attribute_error(inst.class().name(), name))
            }
            Value::Class(cls) => {
                match name {
                    "__name__" => return Ok(Value::from(cls.name())),
                    "__dict__" => return Ok(Value::Dict(cls.namespace().clone())),
                    "__bases__" => {
                        let bases = if cls.bases().is_empty() {
                            vec![TypeRef::Builtin(crate::types::Type::Object).into_value()]
                        } else {
                            cls.bases().iter().cloned().map(TypeRef::into_value).collect()
                        };
                        return Ok(Value::from(bases));
                    }
                    "__mro__" => {
                        let mro: Vec<Value> = obj
                            .as_type()
                            .map(|t| t.mro().into_iter().map(TypeRef::into_value).collect())
                            .unwrap_or_default();
                        return Ok(Value::from(mro));
                    }
                    _ => {}
                }
                if let Some(value) = cls.lookup(name) {
                    return Ok(value);
                }
                if let Some(value) = cls.metaclass().lookup(name) {
                    return Ok(bind(obj, value));
                }
                Err(ExcType::attribute_error_type(cls.name(), name))
            }
            Value::Builtin(Builtins::Type(_) | Builtins::ExcType(_)) => {
                let Some(t) = obj.as_type() else {
                    return Err(RunError::internal("builtin type without a TypeRef"));
                };
                match name {
                    "__name__" => Ok(Value::from(t.name())),
                    "__mro__" => Ok(Value::from(t.mro().into_iter().map(TypeRef::into_value).collect::<Vec<_>>())),
                    _ => Err(ExcType::attribute_error_type(t.name(), name)),
                }
            }
            Value::Builtin(Builtins::Function(f)) if name == "__name__" => Ok(Value::from(f.to_string())),
            Value::Function(f) => match name {
                "__name__" => Ok(Value::from(f.name())),
                "__globals__" => Ok(Value::Dict(f.globals().clone())),
                "__code__" => Ok(Value::Code(f.code().clone())),
                _ => Err(ExcType::attribute_error("function", name)),
            },
            Value::Module(module) => match name {
                "__dict__" => Ok(Value::Dict(module.dict().clone())),
                _ => module
                    .dict()
                    .get(name)
                    .ok_or_else(|| ExcType::attribute_error_module(module.name(), name)),
            },
            Value::Exception(exc) if name == "args" => Ok(Value::from(
                exc.arg().map(Value::from).into_iter().collect::<Vec<_>>(),
            )),
            other => Err(ExcType::attribute_error(other.py_type(), name)),
        }
    }

    /// `setattr(obj, name, value)`.
    ///
    /// Instances, user classes and modules accept new attributes; builtin types are immutable.
    pub fn setattr(&self, obj: &Value, name: &str, value: Value) -> RunResult<()> {
        match obj {
            Value::Instance(inst) => {
                inst.dict().set(name, value);
                Ok(())
            }
            Value::Class(cls) => {
                cls.namespace().set(name, value);
                Ok(())
            }
            Value::Module(module) => {
                module.dict().set(name, value);
                Ok(())
            }
            Value::Builtin(Builtins::Type(_) | Builtins::ExcType(_)) => {
                let type_name = obj.as_type().map(|t| t.name().to_owned()).unwrap_or_default();
                Err(ExcType::attribute_error_immutable_type(&type_name, name))
            }
            other => Err(ExcType::attribute_error(other.py_type(), name)),
        }
    }
}

/// Binds plain functions found on a class to the object they were looked up through.
fn bind(receiver: &Value, value: Value) -> Value {
    match value {
        Value::Function(_) => Value::BoundMethod(Rc::new(BoundMethod::new(receiver.clone(), value))),
        other => other,
    }
}
