//! Forgiving deserializers for rendering partially valid model output.
//!
//! The report page must show whatever the model produced, so these never fail:
//! a field of the wrong shape is treated as absent and rendered as a
//! placeholder. Strict checking lives in `validation`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes a 0-100 score.
///
/// # Accepted Formats
///
/// * **Numeric**: integers or floats, rounded and clamped to 0-100
/// * **String numeric**: `"85"` → 85
///
/// Anything else (objects, arrays, booleans, unparsable strings) yields `None`.
pub fn de_option_score_forgiving<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    let val = match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(val
        .filter(|f| f.is_finite())
        .map(|f| f.round().clamp(0.0, 100.0) as u8))
}

/// Deserializes free text. Blank strings and non-string values yield `None`,
/// except numbers, which are rendered as their JSON text.
pub fn de_option_string_forgiving<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Deserializes any nested structure, falling back to `None` on shape mismatch.
pub fn de_option_forgiving<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.and_then(|v| serde_json::from_value(v).ok()))
}

/// Deserializes a list, dropping elements that do not fit and treating a
/// non-array as empty.
pub fn de_vec_forgiving<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
