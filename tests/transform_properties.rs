//! Property tests for the transformation engine
//!
//! Verifies:
//! - Determinism and idempotence of subset projection
//! - Omitted fields never appear in output, not even as null
//! - Null propagation of safe lookups
//! - Pipelines compose left to right

use courier::transform::combinators::{max_length, or_drop};
use courier::transform::{
    exclusive_project, project, safe_lookup, strict_lookup, transform, Derive, FieldDescriptor,
    FieldMap, Mapping,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
    ]
}

fn record_strategy() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map(key_strategy(), scalar_strategy(), 0..8)
        .prop_map(|entries| entries.into_iter().collect())
}

fn identity_field_map(record: &Map<String, Value>) -> FieldMap {
    record
        .keys()
        .map(|key| (key.clone(), FieldDescriptor::from_path(key).unwrap()))
        .collect()
}

proptest! {
    #[test]
    fn prop_projection_is_idempotent(record in record_strategy()) {
        let item = Value::Object(record.clone());
        let fields = identity_field_map(&record);

        let once = project(&item, &fields).unwrap();
        let twice = project(&Value::Object(once.clone()), &fields).unwrap();

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once, record);
    }

    #[test]
    fn prop_or_drop_never_leaks_falsy_values(record in record_strategy()) {
        let item = Value::Object(record.clone());
        let fields: FieldMap = record
            .keys()
            .map(|key| {
                let keep = or_drop(Derive::infallible(|v| v.clone()));
                (key.clone(), FieldDescriptor::from_path_with(key, keep).unwrap())
            })
            .collect();

        let output = project(&item, &fields).unwrap();
        for (key, value) in &record {
            let falsy = match value {
                Value::Null => true,
                Value::Bool(b) => !b,
                Value::Number(n) => n.as_f64() == Some(0.0),
                Value::String(s) => s.is_empty(),
                _ => false,
            };
            prop_assert_eq!(output.contains_key(key), !falsy);
        }
        prop_assert!(output.values().all(|v| !v.is_null()));
    }

    #[test]
    fn prop_exclusive_project_keeps_only_resolvable(
        record in record_strategy(),
        missing in "[A-Z]{1,6}",
    ) {
        let item = Value::Object(record.clone());
        let mut fields = identity_field_map(&record);
        fields.insert(missing.clone(), FieldDescriptor::from_path(&missing).unwrap());

        let output = exclusive_project(&item, &fields).unwrap();
        prop_assert!(!output.contains_key(&missing));
        prop_assert_eq!(output, record);
    }

    #[test]
    fn prop_safe_lookup_on_null(path in prop::collection::vec("[a-z0-9]{1,4}", 1..5)) {
        let path = path.join(".");
        prop_assert_eq!(safe_lookup(&Value::Null, &path).unwrap(), Value::Null);
    }

    #[test]
    fn prop_max_length_bounds_output(text in "[a-z]{0,40}", limit in 0usize..20) {
        let truncated = max_length(limit, "...").call(&json!(text)).unwrap().into_value().unwrap();
        let truncated = truncated.as_str().unwrap();
        prop_assert!(truncated.chars().count() <= limit);
        if text.chars().count() <= limit {
            prop_assert_eq!(truncated, text.as_str());
        } else if limit >= 3 {
            prop_assert!(truncated.ends_with("..."));
            prop_assert!(text.starts_with(&truncated[..limit - 3]));
        } else {
            prop_assert_eq!(truncated, &"..."[..limit]);
        }
    }

    #[test]
    fn prop_pipeline_composes_left_to_right(n in -1000i64..1000) {
        let f = |v: &Value| json!(v.as_i64().unwrap_or(0) + 1);
        let g = |v: &Value| json!(v.as_i64().unwrap_or(0) * 3);
        let h = |v: &Value| json!(v.as_i64().unwrap_or(0) - 7);

        let spec = Mapping::pipeline([Mapping::func(f), Mapping::func(g), Mapping::func(h)]);
        let item = json!(n);
        prop_assert_eq!(transform(&item, &spec).unwrap(), h(&g(&f(&item))));
    }
}

#[test]
fn test_strict_lookup_into_scalar_fails() {
    let err = strict_lookup(&json!({"a": 1}), "a.b").unwrap_err();
    assert!(err.is_lookup_failure());
}

#[test]
fn test_max_length_with_ellipsis() {
    let result = max_length(5, "...").call(&json!("abcdefgh")).unwrap();
    assert_eq!(result.into_value(), Some(json!("ab...")));
}

#[test]
fn test_contact_reshaping() {
    let item = json!({
        "contactid": "c-19",
        "fullname": "Grace Hopper",
        "emailaddress1": "",
        "address1": {"city": "Arlington", "lines": ["1 Navy Way"]},
    });
    let spec = Mapping::map([
        ("id", Mapping::path("contactid").unwrap()),
        ("name", Mapping::path("fullname").unwrap()),
        (
            "email",
            Mapping::derive(or_drop(Derive::infallible(|item| item["emailaddress1"].clone()))),
        ),
        (
            "address",
            Mapping::map([
                ("city", Mapping::path("address1.city").unwrap()),
                ("street", Mapping::path("address1.lines.0").unwrap()),
                ("zip", Mapping::path("address1.zip").unwrap()),
            ]),
        ),
    ]);

    assert_eq!(
        transform(&item, &spec).unwrap(),
        json!({
            "id": "c-19",
            "name": "Grace Hopper",
            "address": {"city": "Arlington", "street": "1 Navy Way", "zip": null},
        })
    );
}
