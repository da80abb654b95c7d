//! Dot-path parsing and evaluation
//!
//! A dot-path such as `"contact.addresses.0.city"` walks nested objects and
//! arrays one segment at a time. Segments that parse as integers index into
//! arrays (negative values count from the end), everything else is an object
//! key.

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::error::{LookupReason, TransformError, TransformResult};

/// Compiled dot-path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotPath {
    /// Original expression
    expression: String,
    /// Parsed path segments
    segments: Vec<Segment>,
}

/// A single step of a dot-path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(i64),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(index) => Self::Index(index),
            Err(_) => Self::Key(raw.to_string()),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{}", index),
        }
    }
}

impl DotPath {
    /// Compile a dot-path expression
    pub fn parse(expr: &str) -> TransformResult<Self> {
        if expr.is_empty() {
            return Err(TransformError::invalid_spec("dot-path must not be empty"));
        }

        let segments = expr
            .split('.')
            .map(|raw| {
                if raw.is_empty() {
                    Err(TransformError::invalid_spec(format!(
                        "dot-path '{}' contains an empty segment",
                        expr
                    )))
                } else {
                    Ok(Segment::parse(raw))
                }
            })
            .collect::<TransformResult<Vec<_>>>()?;

        Ok(Self {
            expression: expr.to_string(),
            segments,
        })
    }

    /// The expression this path was compiled from
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Resolve the path, failing on the first segment that cannot be followed
    pub fn strict_get<'a>(&self, root: &'a Value) -> TransformResult<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |current, segment| self.step(current, segment))
    }

    /// Resolve the path, yielding null wherever the strict lookup would fail
    pub fn safe_get(&self, root: &Value) -> Value {
        if root.is_null() {
            return Value::Null;
        }
        self.strict_get(root).cloned().unwrap_or(Value::Null)
    }

    fn step<'a>(&self, current: &'a Value, segment: &Segment) -> TransformResult<&'a Value> {
        let fail = |reason| TransformError::LookupFailure {
            path: self.expression.clone(),
            segment: segment.to_string(),
            reason,
        };

        match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => {
                map.get(key).ok_or_else(|| fail(LookupReason::MissingKey))
            }
            (Segment::Index(index), Value::Array(items)) => resolve_index(*index, items.len())
                .and_then(|i| items.get(i))
                .ok_or_else(|| fail(LookupReason::IndexOutOfRange { len: items.len() })),
            (_, other) => Err(fail(LookupReason::NotIndexable {
                found: kind_name(other),
            })),
        }
    }
}

impl FromStr for DotPath {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DotPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

fn resolve_index(index: i64, len: usize) -> Option<usize> {
    if index >= 0 {
        usize::try_from(index).ok().filter(|i| *i < len)
    } else {
        let back = usize::try_from(index.unsigned_abs()).ok()?;
        len.checked_sub(back)
    }
}

/// Human-readable name of a JSON value kind, used in lookup errors
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Strict dot-path lookup; the path is compiled on every call
pub fn strict_lookup(root: &Value, path: &str) -> TransformResult<Value> {
    DotPath::parse(path)?.strict_get(root).cloned()
}

/// Null-propagating dot-path lookup
pub fn safe_lookup(root: &Value, path: &str) -> TransformResult<Value> {
    Ok(DotPath::parse(path)?.safe_get(root))
}
