//! Read-with-default access to agent results
//!
//! Agent results are untrusted JSON. Every field is optional and may arrive
//! with the wrong type; every accessor here maps absent or malformed data to an
//! empty default instead of failing. Lists keep their positions: a malformed
//! element decodes to a default element rather than disappearing, because
//! approval keys are positional.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Types that can always be produced from arbitrary JSON
pub trait Lenient: Sized + Default {
    /// Decode, substituting defaults for anything missing or malformed
    fn from_json(value: Value) -> Self;
}

impl Lenient for String {
    fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => s,
            _ => String::new(),
        }
    }
}

impl Lenient for f64 {
    fn from_json(value: Value) -> Self {
        value.as_f64().unwrap_or_default()
    }
}

impl Lenient for u64 {
    fn from_json(value: Value) -> Self {
        as_count(&value).unwrap_or_default()
    }
}

impl Lenient for bool {
    fn from_json(value: Value) -> Self {
        value.as_bool().unwrap_or_default()
    }
}

impl Lenient for Value {
    fn from_json(value: Value) -> Self {
        value
    }
}

impl<T: Lenient> Lenient for Vec<T> {
    fn from_json(value: Value) -> Self {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_json).collect(),
            _ => Vec::new(),
        }
    }
}

impl<T: Lenient> Lenient for BTreeMap<String, T> {
    fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => map.into_iter().map(|(k, v)| (k, T::from_json(v))).collect(),
            _ => BTreeMap::new(),
        }
    }
}

/// Serde adapter: `#[serde(default, deserialize_with = "crate::lenient::field")]`
///
/// # Errors
/// Only fails if the underlying deserializer cannot produce a JSON value at all.
pub fn field<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Lenient,
{
    Value::deserialize(deserializer).map(T::from_json)
}

/// Declare a result record whose every field is decoded leniently.
///
/// Generates the struct with `Debug, Clone, Default, PartialEq, Serialize,
/// Deserialize` and a matching [`Lenient`] impl. A non-object input decodes to
/// `Default::default()`.
macro_rules! lenient_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                pub $field:ident: $ty:ty,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                #[serde(default, deserialize_with = "crate::lenient::field")]
                pub $field: $ty,
            )*
        }

        impl crate::lenient::Lenient for $name {
            fn from_json(value: serde_json::Value) -> Self {
                serde_json::from_value(value).unwrap_or_default()
            }
        }
    };
}
pub(crate) use lenient_record;

/// Follow a key path; `None` if any step is missing or `null`
#[must_use]
pub fn at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    (!current.is_null()).then_some(current)
}

/// Array at `path`, or an empty slice
#[must_use]
pub fn array<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    at(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// String at `path`, or `""`
#[must_use]
pub fn text<'a>(value: &'a Value, path: &[&str]) -> &'a str {
    at(value, path).and_then(Value::as_str).unwrap_or_default()
}

/// Non-negative count at `path`; `None` when absent or not a number
#[must_use]
pub fn count(value: &Value, path: &[&str]) -> Option<u64> {
    at(value, path).and_then(as_count)
}

fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_access_defaults() {
        let v = json!({"a": {"b": [1, 2, 3], "n": 4.0, "s": "x", "z": null}});
        assert_eq!(array(&v, &["a", "b"]).len(), 3);
        assert!(array(&v, &["a", "s"]).is_empty());
        assert!(array(&v, &["missing"]).is_empty());
        assert_eq!(count(&v, &["a", "n"]), Some(4));
        assert_eq!(count(&v, &["a", "s"]), None);
        assert_eq!(text(&v, &["a", "s"]), "x");
        assert_eq!(text(&v, &["a", "b"]), "");
        assert!(at(&v, &["a", "z"]).is_none());
    }

    #[test]
    fn negative_counts_are_rejected() {
        assert_eq!(count(&json!({"n": -3}), &["n"]), None);
    }

    #[test]
    fn lists_preserve_positions() {
        let decoded: Vec<String> = Lenient::from_json(json!(["a", 7, "c"]));
        assert_eq!(decoded, vec!["a".to_string(), String::new(), "c".to_string()]);
    }

    #[test]
    fn wrong_container_types_become_empty() {
        let list: Vec<u64> = Lenient::from_json(json!("nope"));
        assert!(list.is_empty());
        let map: BTreeMap<String, u64> = Lenient::from_json(json!([1, 2]));
        assert!(map.is_empty());
    }
}
