//! Defensive numeric coercion for externally-produced records.
//!
//! Telemetry and sales exports come from upstream systems that are loose
//! about numeric fields: a count may arrive as a number, a numeric string,
//! `null`, or be missing entirely. Everything here degrades to zero instead
//! of surfacing an error; a malformed counter must never abort a report.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce an optional numeric value, treating absent and non-finite as zero.
pub fn safe_number(value: Option<f64>) -> f64 {
    match value {
        Some(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Numeric interpretation of a raw JSON value, if it has one.
fn coerce_opt(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn coerce(value: &Value) -> f64 {
    coerce_opt(value).unwrap_or(0.0)
}

/// Deserialize a numeric field leniently: numbers pass through, numeric
/// strings parse, anything else becomes 0.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce(&value))
}

/// Like [`lenient_f64`] but keeps "no numeric value" distinct from zero,
/// so callers can fall through to a derived count.
pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_opt))
}

/// Deserialize an open-ended dimension map (`{"A": 60, "B": "40"}`),
/// coercing each value. Non-object input yields an empty map.
pub fn lenient_f64_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let mut map = BTreeMap::new();
    if let Some(Value::Object(entries)) = value {
        for (key, raw) in entries {
            map.insert(key, coerce(&raw));
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_f64")]
        count: f64,
        #[serde(default, deserialize_with = "lenient_opt_f64")]
        scalar: Option<f64>,
        #[serde(default, deserialize_with = "lenient_f64_map")]
        by_key: BTreeMap<String, f64>,
    }

    #[test]
    fn safe_number_defaults_to_zero() {
        assert_eq!(safe_number(None), 0.0);
        assert_eq!(safe_number(Some(f64::NAN)), 0.0);
        assert_eq!(safe_number(Some(f64::INFINITY)), 0.0);
        assert_eq!(safe_number(Some(42.5)), 42.5);
    }

    #[test]
    fn numeric_strings_parse() {
        let probe: Probe = serde_json::from_value(json!({"count": " 17.5 "})).unwrap();
        assert_eq!(probe.count, 17.5);
    }

    #[test]
    fn garbage_degrades_to_zero() {
        let probe: Probe =
            serde_json::from_value(json!({"count": "lots", "by_key": {"A": [], "B": "3"}}))
                .unwrap();
        assert_eq!(probe.count, 0.0);
        assert_eq!(probe.by_key["A"], 0.0);
        assert_eq!(probe.by_key["B"], 3.0);
    }

    #[test]
    fn null_scalar_stays_absent() {
        let probe: Probe = serde_json::from_value(json!({"scalar": null})).unwrap();
        assert_eq!(probe.scalar, None);

        let probe: Probe = serde_json::from_value(json!({"scalar": "12"})).unwrap();
        assert_eq!(probe.scalar, Some(12.0));
    }

    #[test]
    fn non_object_map_is_empty() {
        let probe: Probe = serde_json::from_value(json!({"by_key": "oops"})).unwrap();
        assert!(probe.by_key.is_empty());
    }
}
