//! Declarative record transformation
//!
//! Reshapes nested JSON records between the external REST representation and
//! the internal document representation. Two modes are offered:
//!
//! - full transformation ([`transform`]) evaluates a [`Mapping`] tree against
//!   an item and produces a value of the same general shape as the tree;
//! - subset projection ([`project`], [`exclusive_project`]) builds a flat
//!   object from a [`FieldMap`] of per-key descriptors.
//!
//! Fields can ask to be left out of the output with [`Field::Omit`]; an
//! omitted field never appears, not even as null.

pub mod combinators;
pub mod document;
mod engine;
mod error;
mod path;
mod spec;

pub use document::{FieldMapDocument, MappingDocument};
pub use engine::{FieldDescriptor, FieldMap, Transformer};
pub use error::{LookupReason, TransformError, TransformResult};
pub use path::{safe_lookup, strict_lookup, DotPath, Segment};
pub use spec::{Derive, Field, Mapping, Predicate};

use serde_json::{Map, Value};

/// Evaluate `mapping` against `item`; an omitted root yields null
pub fn transform(item: &Value, mapping: &Mapping) -> TransformResult<Value> {
    let transformer = Transformer::new(mapping.clone());
    transformer.transform(item)
}

/// Inclusive subset projection: every failure propagates
pub fn project(item: &Value, fields: &FieldMap) -> TransformResult<Map<String, Value>> {
    fields.project(item)
}

/// Exclusive subset projection: keys whose lookup fails are logged and dropped
pub fn exclusive_project(item: &Value, fields: &FieldMap) -> TransformResult<Map<String, Value>> {
    fields.project_exclusive(item)
}
