//! Extended JSON encoding for decimals and timestamps
//!
//! Decimal numbers and naive timestamps travel as tagged objects:
//!
//! ```json
//! {"_type": "decimal", "value": "12.50"}
//! {"_type": "datetime", "value": "2024-03-01T09:30:00"}
//! ```
//!
//! Struct fields opt in with `#[serde(with = "courier::codec::decimal")]` or
//! `#[serde(with = "courier::codec::datetime")]`.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Timestamp layout inside tagged datetime objects (no fractional seconds)
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A value carried as a `{"_type", "value"}` object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_type", content = "value", rename_all = "lowercase")]
pub enum Tagged {
    Decimal(#[serde(with = "decimal_value")] Decimal),
    Datetime(#[serde(with = "datetime_value")] NaiveDateTime),
}

impl Tagged {
    /// Recognise a tagged object inside an arbitrary JSON value
    pub fn detect(value: &Value) -> Option<Self> {
        match value.get("_type")?.as_str()? {
            "decimal" | "datetime" => serde_json::from_value(value.clone()).ok(),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Decimal(_) => "decimal",
            Self::Datetime(_) => "datetime",
        }
    }
}

impl From<Decimal> for Tagged {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<NaiveDateTime> for Tagged {
    fn from(value: NaiveDateTime) -> Self {
        Self::Datetime(value)
    }
}

/// Serialize to a JSON string with `serde_json`.
///
/// Adds no type tags of its own. Tagged output comes only from [`Tagged`]
/// values and from fields annotated with the [`decimal`] or [`datetime`]
/// adapters.
pub fn serialize<T: Serialize + ?Sized>(item: &T) -> serde_json::Result<String> {
    serde_json::to_string(item)
}

/// Deserialize from a JSON string with `serde_json`.
///
/// Tagged objects are only decoded where the target type asks for them,
/// through [`Tagged`] or the [`decimal`] and [`datetime`] adapters. Into a
/// plain `serde_json::Value` they stay ordinary objects.
pub fn deserialize<T: DeserializeOwned>(input: &str) -> serde_json::Result<T> {
    serde_json::from_str(input)
}

/// Skeleton for a new document of `doc_type` with a fresh id.
///
/// Returns `None` when no (or an empty) document type is given.
pub fn base_document(doc_type: Option<&str>) -> Option<Value> {
    let doc_type = doc_type.filter(|t| !t.is_empty())?;
    Some(json!({
        "doc_type": doc_type,
        "id": Uuid::new_v4().to_string(),
    }))
}

/// Serde adapter for a `Decimal` field stored as a tagged object
pub mod decimal {
    use super::Tagged;
    use rust_decimal::Decimal;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        Tagged::Decimal(*value).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        match Tagged::deserialize(deserializer)? {
            Tagged::Decimal(value) => Ok(value),
            other => Err(D::Error::custom(format!(
                "expected decimal, found {}",
                other.type_name()
            ))),
        }
    }
}

/// Serde adapter for a `NaiveDateTime` field stored as a tagged object
pub mod datetime {
    use super::Tagged;
    use chrono::NaiveDateTime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        Tagged::Datetime(*value).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        match Tagged::deserialize(deserializer)? {
            Tagged::Datetime(value) => Ok(value),
            other => Err(D::Error::custom(format!(
                "expected datetime, found {}",
                other.type_name()
            ))),
        }
    }
}

mod decimal_value {
    use rust_decimal::Decimal;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Decimal::from_str(&raw).map_err(D::Error::custom)
    }
}

mod datetime_value {
    use super::DATE_TIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(DATE_TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, DATE_TIME_FORMAT).map_err(D::Error::custom)
    }
}
