//! Reusable derivation-function building blocks
//!
//! Each combinator returns a [`Derive`] (or a [`Predicate`]) so they nest
//! freely: `or_drop(if_not_empty(max_length(40, "...")))`.

use serde_json::{Map, Value};
use std::collections::HashSet;

use super::error::{TransformError, TransformResult};
use super::path::kind_name;
use super::spec::{Derive, Field, Predicate};

/// Null, false, zero and empty containers are falsy
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Null, zero-length containers and arrays holding only nulls are empty.
/// Numbers and booleans never are.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(_) | Value::Number(_) => false,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.iter().all(Value::is_null),
        Value::Object(o) => o.is_empty(),
    }
}

/// Omit the field when `f` yields a falsy value
pub fn or_drop(f: Derive) -> Derive {
    Derive::with_omit(move |item| {
        f.call(item)?.and_then(|value| {
            if is_falsy(&value) {
                Ok(Field::Omit)
            } else {
                Ok(Field::Value(value))
            }
        })
    })
}

/// Return `default` whenever `f` fails
pub fn or_default(f: Derive, default: Value) -> Derive {
    Derive::with_omit(move |item| Ok(f.call(item).unwrap_or_else(|_| Field::Value(default.clone()))))
}

/// Yield null for empty input without calling `f`
pub fn if_not_empty(f: Derive) -> Derive {
    Derive::with_omit(move |item| {
        if is_empty(item) {
            Ok(Field::Value(Value::Null))
        } else {
            f.call(item)
        }
    })
}

/// Replace null, zero-length and all-null values with `default`
pub fn value_if_empty(default: Value) -> Derive {
    Derive::infallible(move |item| {
        if is_empty(item) {
            default.clone()
        } else {
            item.clone()
        }
    })
}

/// Truncate strings (by character) and arrays to `length`.
///
/// Truncated strings end in `ellipsis`, which counts toward `length`. When
/// `length` is shorter than the ellipsis itself, only its first `length`
/// characters are kept. Arrays are cut to their first `length` elements
/// with no ellipsis marker.
pub fn max_length(length: usize, ellipsis: &str) -> Derive {
    let ellipsis = ellipsis.to_string();
    Derive::new(move |item| match item {
        Value::Null => Ok(Value::Null),
        Value::String(s) if s.chars().count() > length => {
            let keep = length.saturating_sub(ellipsis.chars().count());
            let truncated: String = s
                .chars()
                .take(keep)
                .chain(ellipsis.chars().take(length - keep))
                .collect();
            Ok(Value::String(truncated))
        }
        Value::Array(a) if a.len() > length => Ok(Value::Array(a[..length].to_vec())),
        Value::String(_) | Value::Array(_) => Ok(item.clone()),
        other => Err(TransformError::derivation(format!(
            "max_length expects a string or array, got {}",
            kind_name(other)
        ))),
    })
}

/// First matching predicate selects its action
pub fn switch(cases: Vec<(Predicate, Derive)>) -> Derive {
    Derive::with_omit(move |item| {
        for (case, action) in &cases {
            if case.test(item) {
                return action.call(item);
            }
        }
        Err(TransformError::UnhandledCase(item.to_string()))
    })
}

pub fn if_else(condition: Predicate, when_true: Derive, when_false: Derive) -> Derive {
    Derive::with_omit(move |item| {
        if condition.test(item) {
            when_true.call(item)
        } else {
            when_false.call(item)
        }
    })
}

/// Call `f` only when `validator` accepts the item; null otherwise
pub fn should_call(validator: Predicate, f: Derive) -> Derive {
    Derive::with_omit(move |item| {
        if validator.test(item) {
            f.call(item)
        } else {
            Ok(Field::Value(Value::Null))
        }
    })
}

pub fn constant(value: Value) -> Derive {
    Derive::infallible(move |_| value.clone())
}

/// Apply `f` to every element of an array; omitted elements are skipped
pub fn for_each(f: Derive) -> Derive {
    Derive::new(move |item| match item {
        Value::Array(items) => {
            let mut output = Vec::with_capacity(items.len());
            for element in items {
                if let Field::Value(value) = f.call(element)? {
                    output.push(value);
                }
            }
            Ok(Value::Array(output))
        }
        other => Err(TransformError::derivation(format!(
            "for_each expects an array, got {}",
            kind_name(other)
        ))),
    })
}

/// Apply `f` to every value of an object; omitted values drop their key
pub fn for_each_key(f: Derive) -> Derive {
    Derive::new(move |item| match item {
        Value::Object(entries) => {
            let mut output = Map::new();
            for (key, value) in entries {
                if let Field::Value(mapped) = f.call(value)? {
                    output.insert(key.clone(), mapped);
                }
            }
            Ok(Value::Object(output))
        }
        other => Err(TransformError::derivation(format!(
            "for_each_key expects an object, got {}",
            kind_name(other)
        ))),
    })
}

/// Remove the listed keys when their value is empty
pub fn drop_key_if_empty<S: AsRef<str>>(keys: &[S]) -> Derive {
    let keys: HashSet<String> = keys.iter().map(|k| k.as_ref().to_string()).collect();
    Derive::new(move |item| {
        let entries = expect_object(item, "drop_key_if_empty")?;
        Ok(Value::Object(
            entries
                .iter()
                .filter(|(k, v)| !(keys.contains(k.as_str()) && is_empty(v)))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ))
    })
}

pub fn without_keys<S: AsRef<str>>(keys: &[S]) -> Derive {
    let keys: HashSet<String> = keys.iter().map(|k| k.as_ref().to_string()).collect();
    Derive::new(move |item| {
        let entries = expect_object(item, "without_keys")?;
        Ok(Value::Object(
            entries
                .iter()
                .filter(|(k, _)| !keys.contains(k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ))
    })
}

/// First non-null element of an array, or null
pub fn first_not_none() -> Derive {
    Derive::infallible(|item| {
        item.as_array()
            .and_then(|items| items.iter().find(|v| !v.is_null()))
            .cloned()
            .unwrap_or(Value::Null)
    })
}

/// Array without its null elements; null stays null
pub fn remove_none() -> Derive {
    Derive::new(|item| match item {
        Value::Null => Ok(Value::Null),
        Value::Array(items) => Ok(Value::Array(
            items.iter().filter(|v| !v.is_null()).cloned().collect(),
        )),
        other => Err(TransformError::derivation(format!(
            "remove_none expects an array, got {}",
            kind_name(other)
        ))),
    })
}

/// Lowercase strings, pass anything else through
pub fn lowercase() -> Derive {
    Derive::infallible(|item| match item {
        Value::String(s) => Value::String(s.to_lowercase()),
        other => other.clone(),
    })
}

fn expect_object<'a>(item: &'a Value, name: &str) -> TransformResult<&'a Map<String, Value>> {
    item.as_object().ok_or_else(|| {
        TransformError::derivation(format!("{} expects an object, got {}", name, kind_name(item)))
    })
}

// Predicates

/// Matches everything; use as the last `switch` case
pub fn always() -> Predicate {
    Predicate::new(|_| true)
}

pub fn is_none() -> Predicate {
    Predicate::new(Value::is_null)
}

pub fn is_list() -> Predicate {
    Predicate::new(Value::is_array)
}

pub fn is_empty_list() -> Predicate {
    Predicate::new(|item| item.as_array().is_some_and(|a| a.is_empty()))
}

/// True when every listed key is present and non-null
pub fn has_keys<S: AsRef<str>>(keys: &[S]) -> Predicate {
    let keys: Vec<String> = keys.iter().map(|k| k.as_ref().to_string()).collect();
    Predicate::new(move |item| keys.iter().all(|k| item.get(k).is_some_and(|v| !v.is_null())))
}

/// True when every listed key is absent or null
pub fn keys_are_none<S: AsRef<str>>(keys: &[S]) -> Predicate {
    let keys: Vec<String> = keys.iter().map(|k| k.as_ref().to_string()).collect();
    Predicate::new(move |item| keys.iter().all(|k| item.get(k).map_or(true, Value::is_null)))
}
