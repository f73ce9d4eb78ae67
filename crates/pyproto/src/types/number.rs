//! Native numeric semantics for `abs()`, `pow()` and `round()` on `bool`, `int` and `float`.
//!
//! Each entry point returns `None` when the operands are not native numbers, so the caller can
//! fall back to user-defined capabilities or raise its own operand `TypeError`.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};

use crate::{
    exception::{ExcType, RunError, RunResult, SimpleException},
    value::Value,
};

/// Largest decimal precision for which rounding a float can change it.
const MAX_FLOAT_DIGITS: i64 = 323;

fn as_bigint(value: &Value) -> Option<BigInt> {
    match value {
        Value::Bool(b) => Some(BigInt::from(u8::from(*b))),
        Value::Int(i) => Some(BigInt::from(*i)),
        Value::LongInt(i) => Some(i.as_ref().clone()),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f),
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        Value::Int(i) => Some(*i as f64),
        Value::LongInt(i) => Some(i.to_f64().unwrap_or(f64::INFINITY)),
        _ => None,
    }
}

fn is_number(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Int(_) | Value::LongInt(_) | Value::Float(_))
}

/// `abs(x)` for native numbers. `abs(i64::MIN)` promotes to a long integer.
pub(crate) fn abs_value(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(b) => Some(Value::Int(i64::from(*b))),
        Value::Int(n) => Some(
            n.checked_abs()
                .map_or_else(|| Value::from(BigInt::from(*n).abs()), Value::Int),
        ),
        Value::LongInt(n) => Some(Value::from(n.abs())),
        Value::Float(f) => Some(Value::Float(f.abs())),
        _ => None,
    }
}

/// `pow(base, exp[, modulus])` for native numbers.
///
/// Integer results whose estimated size exceeds `max_bits` raise `MemoryError` before the
/// power is computed.
pub(crate) fn pow_values(
    base: &Value,
    exp: &Value,
    modulus: Option<&Value>,
    max_bits: u64,
) -> Option<RunResult<Value>> {
    if let Some(modulus) = modulus {
        return match (as_bigint(base), as_bigint(exp), as_bigint(modulus)) {
            (Some(b), Some(e), Some(m)) => Some(mod_pow(&b, &e, &m)),
            _ if is_number(base) && is_number(exp) && is_number(modulus) => Some(Err(ExcType::type_error(
                "pow() 3rd argument not allowed unless all arguments are integers",
            ))),
            _ => None,
        };
    }
    if let (Some(b), Some(e)) = (as_bigint(base), as_bigint(exp)) {
        return Some(int_pow(&b, &e, max_bits));
    }
    Some(float_pow(as_f64(base)?, as_f64(exp)?))
}

fn int_pow(base: &BigInt, exp: &BigInt, max_bits: u64) -> RunResult<Value> {
    if exp.is_negative() {
        return float_pow(base.to_f64().unwrap_or(f64::INFINITY), exp.to_f64().unwrap_or(f64::NEG_INFINITY));
    }
    // 0, 1 and -1 stay small for any exponent
    if base.is_zero() {
        return Ok(Value::Int(i64::from(exp.is_zero())));
    }
    if base.is_one() {
        return Ok(Value::Int(1));
    }
    if *base == BigInt::from(-1) {
        return Ok(Value::Int(if exp.is_even() { 1 } else { -1 }));
    }
    let too_large =
        || RunError::from(SimpleException::new_msg(ExcType::MemoryError, "integer power result is too large"));
    let exp = exp.to_u32().ok_or_else(too_large)?;
    if base.bits().saturating_mul(u64::from(exp)) > max_bits {
        return Err(too_large());
    }
    Ok(Value::from(base.pow(exp)))
}

fn mod_pow(base: &BigInt, exp: &BigInt, modulus: &BigInt) -> RunResult<Value> {
    if modulus.is_zero() {
        return Err(ExcType::value_error("pow() 3rd argument cannot be 0"));
    }
    let result = if exp.is_negative() {
        mod_inverse(base, modulus)?.modpow(&-exp, modulus)
    } else {
        base.modpow(exp, modulus)
    };
    Ok(Value::from(result))
}

/// Modular inverse of `base` modulo `|modulus|`, as used by `pow(b, -e, m)`.
fn mod_inverse(base: &BigInt, modulus: &BigInt) -> RunResult<BigInt> {
    let m = modulus.abs();
    let ext = base.mod_floor(&m).extended_gcd(&m);
    if !ext.gcd.is_one() {
        return Err(ExcType::value_error("base is not invertible for the given modulus"));
    }
    Ok(ext.x.mod_floor(&m))
}

fn float_pow(base: f64, exp: f64) -> RunResult<Value> {
    if base == 0.0 && exp < 0.0 {
        return Err(ExcType::zero_negative_power());
    }
    if base < 0.0 && exp.is_finite() && exp.fract() != 0.0 {
        return Err(ExcType::value_error("negative number cannot be raised to a fractional power"));
    }
    let result = base.powf(exp);
    if result.is_infinite() && base.is_finite() && exp.is_finite() {
        return Err(ExcType::overflow_error("(34, 'Numerical result out of range')"));
    }
    Ok(Value::Float(result))
}

/// Interprets the `ndigits` argument of `round()`: `None` or an integer.
///
/// Out-of-range long integers saturate, which rounds to zero or leaves the number unchanged.
pub(crate) fn ndigits_arg(ndigits: &Value) -> RunResult<Option<i64>> {
    match ndigits {
        Value::None => Ok(None),
        Value::Bool(b) => Ok(Some(i64::from(*b))),
        Value::Int(i) => Ok(Some(*i)),
        Value::LongInt(i) => Ok(Some(if i.is_negative() { i64::MIN } else { i64::MAX })),
        other => Err(ExcType::type_error_not_integer(other.py_type().name())),
    }
}

/// `round(number, ndigits)` for native numbers.
///
/// Integers always round to an integer. Floats round to an integer when `ndigits` is `None`
/// and to a float otherwise. Ties go to the even neighbour.
pub(crate) fn round_value(number: &Value, ndigits: Option<i64>) -> Option<RunResult<Value>> {
    if let Some(n) = as_bigint(number) {
        return Some(Ok(round_int(&n, ndigits)));
    }
    match number {
        Value::Float(x) => Some(round_float(*x, ndigits)),
        _ => None,
    }
}

fn round_int(n: &BigInt, ndigits: Option<i64>) -> Value {
    let Some(nd) = ndigits.filter(|nd| *nd < 0) else {
        return Value::from(n.clone());
    };
    let digits = n.magnitude().to_string().len() as u64;
    let k = nd.unsigned_abs();
    let Ok(k) = u32::try_from(k) else {
        return Value::Int(0);
    };
    if u64::from(k) > digits {
        return Value::Int(0);
    }
    let p = BigInt::from(10u32).pow(k);
    let (q, r) = n.div_mod_floor(&p);
    let q = match (&r * 2u32).cmp(&p) {
        Ordering::Greater => q + 1u32,
        Ordering::Equal if q.is_odd() => q + 1u32,
        _ => q,
    };
    Value::from(q * p)
}

fn round_float(x: f64, ndigits: Option<i64>) -> RunResult<Value> {
    let Some(nd) = ndigits else {
        if x.is_nan() {
            return Err(ExcType::value_error("cannot convert float NaN to integer"));
        }
        if x.is_infinite() {
            return Err(ExcType::overflow_error("cannot convert float infinity to integer"));
        }
        let rounded = BigInt::from_f64(x.round_ties_even())
            .ok_or_else(|| RunError::internal("finite float did not convert to an integer"))?;
        return Ok(Value::from(rounded));
    };

    if !x.is_finite() || x == 0.0 || nd > MAX_FLOAT_DIGITS {
        return Ok(Value::Float(x));
    }
    if nd < -MAX_FLOAT_DIGITS {
        return Ok(Value::Float(0.0_f64.copysign(x)));
    }
    let rounded = if let Ok(precision) = usize::try_from(nd) {
        // float formatting rounds the exact binary value half-to-even
        format!("{x:.precision$}")
            .parse::<f64>()
            .map_err(|_| RunError::internal("formatted float failed to parse"))?
    } else {
        let scale = 10f64.powi(i32::try_from(-nd).unwrap_or(i32::MAX));
        (x / scale).round_ties_even() * scale
    };
    if rounded.is_infinite() {
        return Err(ExcType::overflow_error("rounded value too large to represent"));
    }
    Ok(Value::Float(rounded))
}
