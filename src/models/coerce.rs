//! Lenient field deserializers for stored documents.
//!
//! Documents written by other clients (or by hand in the console) are not
//! consistent about numbers versus numeric strings. These helpers accept
//! either and fall back to a default instead of failing the record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Integer from a number or a numeric string. Floats truncate.
pub fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

/// String fields: strings as-is, numbers and booleans rendered, null as "".
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Optional string fields: null and non-strings become `None`.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Non-negative integer from a number or numeric string, else `None`.
pub fn opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_i64(&value).and_then(|i| u32::try_from(i).ok()))
}

/// Integer from a number or numeric string, else 0.
pub fn i64_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_i64(&value).unwrap_or(0))
}

/// List of strings; a lone string becomes a one-element list and
/// non-string entries are dropped.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) => vec![s],
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_i64_accepts_numbers_and_numeric_strings() {
        assert_eq!(to_i64(&json!(12)), Some(12));
        assert_eq!(to_i64(&json!("12")), Some(12));
        assert_eq!(to_i64(&json!(" 7 ")), Some(7));
        assert_eq!(to_i64(&json!(9.8)), Some(9));
        assert_eq!(to_i64(&json!("4.0")), Some(4));
    }

    #[test]
    fn to_i64_rejects_everything_else() {
        assert_eq!(to_i64(&json!("twelve")), None);
        assert_eq!(to_i64(&json!("")), None);
        assert_eq!(to_i64(&json!(null)), None);
        assert_eq!(to_i64(&json!(["1"])), None);
        assert_eq!(to_i64(&json!("inf")), None);
    }

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "string")]
        text: String,
        #[serde(default, deserialize_with = "opt_u32")]
        age: Option<u32>,
        #[serde(default, deserialize_with = "string_list")]
        days: Vec<String>,
    }

    #[test]
    fn probe_coerces_mixed_shapes() {
        let probe: Probe =
            serde_json::from_value(json!({"text": 5, "age": "34", "days": "Monday"})).unwrap();
        assert_eq!(probe.text, "5");
        assert_eq!(probe.age, Some(34));
        assert_eq!(probe.days, vec!["Monday"]);
    }

    #[test]
    fn probe_defaults_missing_and_bad_fields() {
        let probe: Probe =
            serde_json::from_value(json!({"age": -3, "days": ["Friday", 4, null]})).unwrap();
        assert_eq!(probe.text, "");
        assert_eq!(probe.age, None);
        assert_eq!(probe.days, vec!["Friday"]);
    }
}
