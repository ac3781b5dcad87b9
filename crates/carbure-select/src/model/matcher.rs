//! Directional structural matching of option values.
//!
//! Option values are compared structurally rather than by identity: a value
//! decoded from a URL and the same value freshly fetched from the backend are
//! distinct objects that must still be recognized as the same option.
//!
//! The comparison is **directional**. Every key of `source` is looked up in
//! `target`; keys present only in `target` are ignored. A key of `source`
//! missing from `target` fails the match only when `strict` is set.
//!
//! An object and an array never match, even an empty object against an
//! array.
//!
//! ```
//! use carbure_select::model::matcher::matches;
//! use serde_json::json;
//!
//! let id = json!({ "id": 1 });
//! let full = json!({ "id": 1, "name": "x" });
//!
//! assert!(matches(&id, &full, false));
//! assert!(matches(&full, &id, false));
//! assert!(!matches(&full, &id, true));
//! ```

use serde::Serialize;
use serde_json::{Number, Value};

use carbure_core::logging::targets;

/// Compare `source` against `target`.
///
/// - two nulls match;
/// - if either side is a scalar, scalar equality applies (numbers compare
///   numerically, so `1` matches `1.0` but never `"1"`);
/// - objects and arrays (arrays keyed by index) match when every entry of
///   `source` matches the entry at the same key in `target`;
/// - an object never matches an array.
pub fn matches(source: &Value, target: &Value, strict: bool) -> bool {
    match (source, target) {
        (Value::Null, Value::Null) => true,
        (Value::Object(source), Value::Object(target)) => source.iter().all(|(key, value)| {
            target
                .get(key)
                .map_or(!strict, |other| matches(value, other, strict))
        }),
        (Value::Array(source), Value::Array(target)) => {
            source.iter().enumerate().all(|(index, value)| {
                target
                    .get(index)
                    .map_or(!strict, |other| matches(value, other, strict))
            })
        }
        (Value::Object(_), Value::Array(_)) | (Value::Array(_), Value::Object(_)) => false,
        (source, target) => scalar_eq(source, target),
    }
}

/// Compare two serializable values with [`matches`].
///
/// A value that fails to serialize matches nothing.
pub fn matches_value<A, B>(source: &A, target: &B, strict: bool) -> bool
where
    A: Serialize + ?Sized,
    B: Serialize + ?Sized,
{
    match (serde_json::to_value(source), serde_json::to_value(target)) {
        (Ok(source), Ok(target)) => matches(&source, &target, strict),
        (Err(err), _) | (_, Err(err)) => {
            tracing::trace!(target: targets::MODEL, error = %err, "value not comparable");
            false
        }
    }
}

/// Returns `true` when the value is null.
pub fn is_nullish(value: &Value) -> bool {
    value.is_null()
}

fn scalar_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => number_eq(a, b),
        _ => a == b,
    }
}

fn number_eq(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
