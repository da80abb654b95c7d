//! Mapping specification types
//!
//! A [`Mapping`] is a tree describing how to build an output value from an
//! input item. Leaves are dot-paths or derivation functions; inner nodes are
//! keyed maps, lists and pipelines.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::engine::Transformer;
use super::error::TransformResult;
use super::path::DotPath;

/// Outcome of evaluating one node of a mapping
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// A value to place in the output (possibly null)
    Value(Value),
    /// Leave this field out of the output entirely
    Omit,
}

impl Field {
    pub fn is_omit(&self) -> bool {
        matches!(self, Self::Omit)
    }

    /// The value, or `None` when the field is omitted
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Omit => None,
        }
    }

    /// Apply `f` to a present value; omissions pass through untouched
    pub fn and_then<F>(self, f: F) -> TransformResult<Field>
    where
        F: FnOnce(Value) -> TransformResult<Field>,
    {
        match self {
            Self::Value(value) => f(value),
            Self::Omit => Ok(Self::Omit),
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

type DeriveFn = dyn Fn(&Value) -> TransformResult<Field> + Send + Sync;

/// A derivation function from an input item to an output field
#[derive(Clone)]
pub struct Derive(Arc<DeriveFn>);

impl Derive {
    /// Wrap a function that always produces a value
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> TransformResult<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(move |item| f(item).map(Field::Value)))
    }

    /// Wrap a function that may ask for its field to be omitted
    pub fn with_omit<F>(f: F) -> Self
    where
        F: Fn(&Value) -> TransformResult<Field> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap an infallible function
    pub fn infallible<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self::new(move |item| Ok(f(item)))
    }

    pub fn call(&self, item: &Value) -> TransformResult<Field> {
        (self.0)(item)
    }
}

impl fmt::Debug for Derive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Derive(<fn>)")
    }
}

/// A boolean test over an input item, used by `switch` and `if_else`
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl Predicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn test(&self, item: &Value) -> bool {
        (self.0)(item)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(<fn>)")
    }
}

/// Declarative mapping specification
#[derive(Debug, Clone)]
pub enum Mapping {
    /// Null-propagating dot-path lookup into the item
    Path(DotPath),
    /// Function applied to the item
    Derive(Derive),
    /// Output object built key by key
    Map(Vec<(String, Mapping)>),
    /// Output array, one element per sub-mapping
    List(Vec<Mapping>),
    /// Steps applied left to right, each feeding the next
    Pipeline(Vec<Mapping>),
    /// Delegate to another transformer
    Transformer(Arc<Transformer>),
}

impl Mapping {
    /// Dot-path leaf; fails on malformed paths
    pub fn path(expr: &str) -> TransformResult<Self> {
        DotPath::parse(expr).map(Self::Path)
    }

    pub fn derive(derive: Derive) -> Self {
        Self::Derive(derive)
    }

    /// Function leaf from an infallible closure
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self::Derive(Derive::infallible(f))
    }

    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Mapping)>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn list<I: IntoIterator<Item = Mapping>>(items: I) -> Self {
        Self::List(items.into_iter().collect())
    }

    pub fn pipeline<I: IntoIterator<Item = Mapping>>(steps: I) -> Self {
        Self::Pipeline(steps.into_iter().collect())
    }

    /// Short name of the node kind, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::Derive(_) => "function",
            Self::Map(_) => "map",
            Self::List(_) => "list",
            Self::Pipeline(_) => "pipeline",
            Self::Transformer(_) => "transformer",
        }
    }
}

impl From<DotPath> for Mapping {
    fn from(path: DotPath) -> Self {
        Self::Path(path)
    }
}

impl From<Derive> for Mapping {
    fn from(derive: Derive) -> Self {
        Self::Derive(derive)
    }
}

impl From<Transformer> for Mapping {
    fn from(transformer: Transformer) -> Self {
        Self::Transformer(Arc::new(transformer))
    }
}
