//! Mapping evaluation and subset projection

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use super::error::TransformResult;
use super::path::DotPath;
use super::spec::{Derive, Field, Mapping};

/// Reshapes items according to a fixed mapping specification
#[derive(Debug, Clone)]
pub struct Transformer {
    mapping: Mapping,
}

impl Transformer {
    pub fn new(mapping: Mapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Transform an item with this transformer's mapping.
    ///
    /// An omitted root becomes null; use [`Transformer::apply`] to observe it.
    pub fn transform(&self, item: &Value) -> TransformResult<Value> {
        Ok(self.apply(item, &self.mapping)?.into_value().unwrap_or(Value::Null))
    }

    /// Evaluate `mapping` against `item`
    pub fn apply(&self, item: &Value, mapping: &Mapping) -> TransformResult<Field> {
        match mapping {
            Mapping::Path(path) => Ok(Field::Value(path.safe_get(item))),
            Mapping::Derive(derive) => derive.call(item),
            Mapping::Map(entries) => self.apply_map(item, entries),
            Mapping::List(items) => self.apply_list(item, items),
            Mapping::Pipeline(steps) => self.apply_pipeline(item, steps),
            Mapping::Transformer(nested) => nested.apply(item, &nested.mapping),
        }
    }

    fn apply_map(&self, item: &Value, entries: &[(String, Mapping)]) -> TransformResult<Field> {
        let mut output = Map::with_capacity(entries.len());
        for (key, sub) in entries {
            match self.apply(item, sub)? {
                Field::Value(value) => {
                    output.insert(key.clone(), value);
                }
                Field::Omit => trace!("Omitting key '{}'", key),
            }
        }
        Ok(Field::Value(Value::Object(output)))
    }

    fn apply_list(&self, item: &Value, items: &[Mapping]) -> TransformResult<Field> {
        let mut output = Vec::with_capacity(items.len());
        for sub in items {
            if let Field::Value(value) = self.apply(item, sub)? {
                output.push(value);
            }
        }
        Ok(Field::Value(Value::Array(output)))
    }

    fn apply_pipeline(&self, item: &Value, steps: &[Mapping]) -> TransformResult<Field> {
        steps.iter().try_fold(Field::Value(item.clone()), |current, step| {
            current.and_then(|value| self.apply(&value, step))
        })
    }

    /// Use this transformer as a derivation function
    pub fn into_derive(self) -> Derive {
        Derive::with_omit(move |item| self.apply(item, &self.mapping))
    }
}

/// Where a projected field takes its value from
#[derive(Debug, Clone)]
pub enum FieldDescriptor {
    /// Call a function with the whole item, bypassing path lookup
    Method(Derive),
    /// Strict lookup of `source`, optionally post-processed by `derive`
    Path {
        source: DotPath,
        derive: Option<Derive>,
    },
}

impl FieldDescriptor {
    /// Plain strict lookup
    pub fn from_path(source: &str) -> TransformResult<Self> {
        Ok(Self::Path {
            source: DotPath::parse(source)?,
            derive: None,
        })
    }

    /// Strict lookup followed by a derivation
    pub fn from_path_with(source: &str, derive: Derive) -> TransformResult<Self> {
        Ok(Self::Path {
            source: DotPath::parse(source)?,
            derive: Some(derive),
        })
    }

    pub fn method(derive: Derive) -> Self {
        Self::Method(derive)
    }

    fn resolve(&self, item: &Value) -> TransformResult<Field> {
        match self {
            Self::Method(method) => method.call(item),
            Self::Path { source, derive } => {
                let value = source.strict_get(item)?;
                match derive {
                    Some(derive) => derive.call(value),
                    None => Ok(Field::Value(value.clone())),
                }
            }
        }
    }
}

/// Ordered set of output keys and their descriptors for subset projection
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    entries: Vec<(String, FieldDescriptor)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, replacing any earlier entry for the same key
    pub fn with(mut self, key: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.insert(key, descriptor);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, descriptor: FieldDescriptor) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = descriptor,
            None => self.entries.push((key, descriptor)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Project the mapped keys of `item`; any failure propagates
    pub fn project(&self, item: &Value) -> TransformResult<Map<String, Value>> {
        let mut output = Map::new();
        for (key, descriptor) in &self.entries {
            if let Field::Value(value) = descriptor.resolve(item)? {
                output.insert(key.clone(), value);
            }
        }
        Ok(output)
    }

    /// Project the mapped keys of `item`, dropping keys whose lookup fails.
    ///
    /// Only lookup failures are suppressed; other errors still propagate.
    pub fn project_exclusive(&self, item: &Value) -> TransformResult<Map<String, Value>> {
        let mut output = Map::new();
        for (key, descriptor) in &self.entries {
            match descriptor.resolve(item) {
                Ok(Field::Value(value)) => {
                    output.insert(key.clone(), value);
                }
                Ok(Field::Omit) => {}
                Err(e) if e.is_lookup_failure() => {
                    warn!("Dropping key '{}' from projection: {}", key, e);
                }
                Err(e) => return Err(e),
            }
        }
        debug!(
            "Exclusive projection kept {} of {} keys",
            output.len(),
            self.entries.len()
        );
        Ok(output)
    }
}

impl<K: Into<String>> FromIterator<(K, FieldDescriptor)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, FieldDescriptor)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, descriptor) in iter {
            map.insert(key, descriptor);
        }
        map
    }
}
