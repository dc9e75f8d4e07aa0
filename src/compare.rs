//! Coercion rules shared by the built-in condition functions.
//!
//! The rules are deliberately loose, pinned down here so they are testable:
//!
//! - Numeric coercion: numbers pass through, strings must parse as a whole
//!   (surrounding whitespace ignored), everything else has no numeric value.
//! - Loose equality against a number: numbers and numeric strings compare
//!   numerically, booleans count as 0 and 1.
//! - Loose equality against a string: strings compare textually, numbers
//!   compare numerically when the literal parses as a number.
//! - String form: strings are used as-is, anything else serializes to its
//!   JSON text.

use serde_json::Value;

use crate::context::ResolvedArg;

/// The numeric value of a document node, if it has one.
pub(crate) fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The string form of a document node, as used by the substring tests.
pub(crate) fn text_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Loose equality between a document node and a literal argument.
pub(crate) fn loose_eq(value: &Value, literal: &ResolvedArg) -> bool {
    match literal {
        ResolvedArg::String(expected) => match value {
            Value::String(s) => s == expected,
            Value::Number(n) => expected
                .parse::<f64>()
                .is_ok_and(|f| n.as_f64() == Some(f)),
            _ => false,
        },
        ResolvedArg::Integer(_) | ResolvedArg::Float(_) => {
            let expected = literal.as_f64();
            match value {
                Value::Number(n) => n.as_f64() == Some(expected),
                Value::String(s) => s.trim().parse::<f64>().ok() == Some(expected),
                Value::Bool(b) => (*b as i64) as f64 == expected,
                _ => false,
            }
        }
        ResolvedArg::Matches(_) => false,
    }
}
