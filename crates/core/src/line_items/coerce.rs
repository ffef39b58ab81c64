//! Number coercion for loosely typed client input.
//!
//! Clients send quantities and prices as JSON numbers or numeric strings.
//! Anything else is rejected rather than silently turned into zero.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;

/// Coerces a JSON value into a decimal.
///
/// Accepts JSON numbers and strings holding a plain or scientific decimal
/// literal. Returns `None` for anything else, including empty strings.
#[must_use]
pub fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

/// Coerces a JSON value into a whole-number quantity.
///
/// Values with a fractional part, or outside the `i32` range, are rejected.
#[must_use]
pub fn coerce_quantity(value: &Value) -> Option<i32> {
    let d = coerce_decimal(value)?;
    if !d.fract().is_zero() {
        return None;
    }
    d.trunc().to_i32()
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
        .map(|d| d.normalize())
}
