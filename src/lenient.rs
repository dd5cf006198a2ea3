//! Field decoders for server records that must survive sloppy payloads.
//!
//! Each one reads whatever JSON value is present and never fails: numbers
//! and strings are converted where the meaning is clear, anything else
//! becomes the field default.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn as_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_i64().map(|n| n != 0),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

pub(crate) fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(as_text(Value::deserialize(deserializer)?))
}

pub(crate) fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(as_flag(&Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Numeric ids; `"300"` reads as `300`.
pub(crate) fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(as_integer(&Value::deserialize(deserializer)?))
}

/// Numeric codes mapped onto an enum; unknown numbers are kept by the enum itself.
pub(crate) fn code<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<i64>,
{
    Ok(as_integer(&Value::deserialize(deserializer)?).map(T::from))
}

/// A nested object; anything that is not an object reads as `None`.
pub(crate) fn record<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(decode_object(Value::deserialize(deserializer)?))
}

/// An array of nested objects; non-object entries are skipped.
pub(crate) fn records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items.into_iter().filter_map(decode_object).collect()),
        _ => Ok(Vec::new()),
    }
}

pub(crate) fn decode_object<T: DeserializeOwned>(value: Value) -> Option<T> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    #[serde(default)]
    struct Sample {
        #[serde(deserialize_with = "text")]
        name: String,
        #[serde(deserialize_with = "optional_id")]
        id: Option<i64>,
        #[serde(deserialize_with = "flag")]
        active: bool,
        #[serde(deserialize_with = "records")]
        children: Vec<Sample>,
    }

    #[test]
    fn mistyped_scalars_are_converted_or_defaulted() {
        let sample: Sample = serde_json::from_value(json!({
            "name": 5551234,
            "id": " 300 ",
            "active": 1
        }))
        .unwrap();
        assert_eq!(sample.name, "5551234");
        assert_eq!(sample.id, Some(300));
        assert!(sample.active);

        let sample: Sample = serde_json::from_value(json!({
            "name": { "nested": true },
            "id": "abc",
            "active": null,
            "children": "none"
        }))
        .unwrap();
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn record_lists_keep_every_object() {
        let sample: Sample = serde_json::from_value(json!({
            "children": [{ "name": "a" }, 7, { "name": "b", "id": false }]
        }))
        .unwrap();
        let names: Vec<&str> = sample.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(sample.children[1].id, None);
    }
}
