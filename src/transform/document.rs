//! Mapping specifications loaded from JSON or YAML documents
//!
//! Document shapes:
//!
//! ```yaml
//! name: contact.full_name            # string: dot-path
//! phones: [phone.home, phone.work]   # array: list
//! city:
//!   $pipe: [address, {$fn: lowercase}]
//! note:
//!   $fn: or_drop
//!   inner: {$fn: max_length, args: [80, "..."]}
//! ```
//!
//! Field maps for subset projection use `from`, `function` and `method`:
//!
//! ```yaml
//! email: {from: contact.email, function: {$fn: or_drop, inner: {$fn: trim}}}
//! kind: {method: {$fn: constant, args: [customer]}}
//! ```

use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

use super::combinators;
use super::engine::{FieldDescriptor, FieldMap, Transformer};
use super::error::{TransformError, TransformResult};
use super::path::{kind_name, DotPath};
use super::spec::{Derive, Mapping};

const PIPE_KEY: &str = "$pipe";
const FN_KEY: &str = "$fn";

/// Parses mapping documents into [`Mapping`] trees
pub struct MappingDocument;

impl MappingDocument {
    pub fn from_json_str(input: &str) -> TransformResult<Mapping> {
        let doc: Value = serde_json::from_str(input)
            .map_err(|e| TransformError::invalid_spec(format!("mapping is not valid JSON: {}", e)))?;
        Self::parse(&doc)
    }

    pub fn from_yaml_str(input: &str) -> TransformResult<Mapping> {
        let doc: Value = serde_yaml::from_str(input)
            .map_err(|e| TransformError::invalid_spec(format!("mapping is not valid YAML: {}", e)))?;
        Self::parse(&doc)
    }

    /// Load a document, choosing JSON or YAML by file extension
    pub fn from_path(path: &Path) -> TransformResult<Mapping> {
        Self::parse(&read_document(path)?)
    }

    /// Convert an already-decoded document
    pub fn parse(doc: &Value) -> TransformResult<Mapping> {
        match doc {
            Value::String(path) => Mapping::path(path),
            Value::Array(items) => items
                .iter()
                .map(Self::parse)
                .collect::<TransformResult<Vec<_>>>()
                .map(Mapping::List),
            Value::Object(entries) if entries.contains_key(PIPE_KEY) => parse_pipeline(entries),
            Value::Object(entries) if entries.contains_key(FN_KEY) => {
                parse_function(entries).map(Mapping::Derive)
            }
            Value::Object(entries) => entries
                .iter()
                .map(|(key, sub)| Ok((key.clone(), Self::parse(sub)?)))
                .collect::<TransformResult<Vec<_>>>()
                .map(Mapping::Map),
            other => Err(TransformError::invalid_spec(format!(
                "unsupported mapping node of type {}",
                kind_name(other)
            ))),
        }
    }
}

/// Parses field-map documents into [`FieldMap`]s
pub struct FieldMapDocument;

impl FieldMapDocument {
    pub fn from_json_str(input: &str) -> TransformResult<FieldMap> {
        let doc: Value = serde_json::from_str(input).map_err(|e| {
            TransformError::invalid_spec(format!("field map is not valid JSON: {}", e))
        })?;
        Self::parse(&doc)
    }

    pub fn from_yaml_str(input: &str) -> TransformResult<FieldMap> {
        let doc: Value = serde_yaml::from_str(input).map_err(|e| {
            TransformError::invalid_spec(format!("field map is not valid YAML: {}", e))
        })?;
        Self::parse(&doc)
    }

    pub fn from_path(path: &Path) -> TransformResult<FieldMap> {
        Self::parse(&read_document(path)?)
    }

    pub fn parse(doc: &Value) -> TransformResult<FieldMap> {
        let entries = doc.as_object().ok_or_else(|| {
            TransformError::invalid_spec(format!(
                "field map must be an object, got {}",
                kind_name(doc)
            ))
        })?;

        entries
            .iter()
            .map(|(key, descriptor)| Ok((key.clone(), parse_descriptor(key, descriptor)?)))
            .collect()
    }
}

fn parse_descriptor(key: &str, doc: &Value) -> TransformResult<FieldDescriptor> {
    let entry = doc.as_object().ok_or_else(|| {
        TransformError::invalid_spec(format!("descriptor for '{}' must be an object", key))
    })?;

    if let Some(method) = entry.get("method") {
        let transformer = Transformer::new(MappingDocument::parse(method)?);
        return Ok(FieldDescriptor::Method(transformer.into_derive()));
    }

    let source = match entry.get("from") {
        Some(Value::String(path)) => DotPath::parse(path)?,
        Some(other) => {
            return Err(TransformError::invalid_spec(format!(
                "'from' of '{}' must be a string, got {}",
                key,
                kind_name(other)
            )))
        }
        None => {
            return Err(TransformError::invalid_spec(format!(
                "descriptor for '{}' needs either 'method' or 'from'",
                key
            )))
        }
    };

    let derive = entry.get("function").map(parse_function_node).transpose()?;
    Ok(FieldDescriptor::Path { source, derive })
}

fn parse_pipeline(entries: &Map<String, Value>) -> TransformResult<Mapping> {
    if entries.len() != 1 {
        return Err(TransformError::invalid_spec(
            "'$pipe' must be the only key of its object",
        ));
    }
    match &entries[PIPE_KEY] {
        Value::Array(steps) => steps
            .iter()
            .map(MappingDocument::parse)
            .collect::<TransformResult<Vec<_>>>()
            .map(Mapping::Pipeline),
        other => Err(TransformError::invalid_spec(format!(
            "'$pipe' must hold an array, got {}",
            kind_name(other)
        ))),
    }
}

fn parse_function_node(doc: &Value) -> TransformResult<Derive> {
    match doc {
        Value::Object(entries) if entries.contains_key(FN_KEY) => parse_function(entries),
        other => Err(TransformError::invalid_spec(format!(
            "expected a '$fn' object, got {}",
            kind_name(other)
        ))),
    }
}

fn parse_function(entries: &Map<String, Value>) -> TransformResult<Derive> {
    let name = entries[FN_KEY]
        .as_str()
        .ok_or_else(|| TransformError::invalid_spec("'$fn' must name a function"))?;
    let args = match entries.get("args") {
        None => &[][..],
        Some(Value::Array(args)) => args.as_slice(),
        Some(other) => {
            return Err(TransformError::invalid_spec(format!(
                "args of '{}' must be an array, got {}",
                name,
                kind_name(other)
            )))
        }
    };
    let inner = || -> TransformResult<Derive> {
        let node = entries.get("inner").ok_or_else(|| {
            TransformError::invalid_spec(format!("'{}' needs an 'inner' function", name))
        })?;
        parse_function_node(node)
    };

    debug!("Resolving builtin function '{}'", name);
    let derive = match name {
        "constant" => combinators::constant(arg(name, args, 0)?.clone()),
        "lowercase" => combinators::lowercase(),
        "uppercase" => map_string(|s| s.to_uppercase()),
        "trim" => map_string(|s| s.trim().to_string()),
        "is_empty" => Derive::infallible(|v| Value::Bool(combinators::is_empty(v))),
        "first_not_none" => combinators::first_not_none(),
        "remove_none" => combinators::remove_none(),
        "max_length" => {
            let length = arg(name, args, 0)?.as_u64().ok_or_else(|| {
                TransformError::invalid_spec("max_length length must be a non-negative integer")
            })?;
            let ellipsis = match args.get(1) {
                None => "...",
                Some(value) => value.as_str().ok_or_else(|| {
                    TransformError::invalid_spec("max_length ellipsis must be a string")
                })?,
            };
            let length = usize::try_from(length)
                .map_err(|_| TransformError::invalid_spec("max_length length is too large"))?;
            combinators::max_length(length, ellipsis)
        }
        "value_if_empty" => combinators::value_if_empty(arg(name, args, 0)?.clone()),
        "without_keys" => combinators::without_keys(&string_args(name, args)?),
        "drop_key_if_empty" => combinators::drop_key_if_empty(&string_args(name, args)?),
        "or_drop" => combinators::or_drop(inner()?),
        "or_default" => combinators::or_default(inner()?, arg(name, args, 0)?.clone()),
        "if_not_empty" => combinators::if_not_empty(inner()?),
        "for_each" => combinators::for_each(inner()?),
        unknown => {
            return Err(TransformError::invalid_spec(format!(
                "unknown function '{}'",
                unknown
            )))
        }
    };
    Ok(derive)
}

fn arg<'a>(name: &str, args: &'a [Value], index: usize) -> TransformResult<&'a Value> {
    args.get(index).ok_or_else(|| {
        TransformError::invalid_spec(format!("'{}' is missing argument {}", name, index + 1))
    })
}

fn string_args(name: &str, args: &[Value]) -> TransformResult<Vec<String>> {
    args.iter()
        .map(|a| {
            a.as_str().map(str::to_string).ok_or_else(|| {
                TransformError::invalid_spec(format!("arguments of '{}' must be strings", name))
            })
        })
        .collect()
}

fn map_string<F>(f: F) -> Derive
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    Derive::infallible(move |item| match item {
        Value::String(s) => Value::String(f(s)),
        other => other.clone(),
    })
}

fn read_document(path: &Path) -> TransformResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        TransformError::invalid_spec(format!("cannot read {}: {}", path.display(), e))
    })?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| {
            TransformError::invalid_spec(format!("{} is not valid JSON: {}", path.display(), e))
        })
    } else {
        serde_yaml::from_str(&content).map_err(|e| {
            TransformError::invalid_spec(format!("{} is not valid YAML: {}", path.display(), e))
        })
    }
}
