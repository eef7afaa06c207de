//! Lenient deserializers for API payload fields
//!
//! The API is not consistent about ids (number or string) or amounts
//! (float or decimal string), so typed views accept both.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Deserialize ID that can be number or string
pub fn id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    match value {
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::String(s) => Ok(s),
        _ => Err(D::Error::custom("expected number or string for id")),
    }
}

/// Deserialize optional ID that can be number or string
pub fn optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<JsonValue> = Option::deserialize(deserializer)?;
    match value {
        Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
        Some(JsonValue::String(s)) => Ok(Some(s)),
        Some(JsonValue::Null) | None => Ok(None),
        _ => Err(D::Error::custom("expected number or string for id")),
    }
}

/// Deserialize optional amount that can be number or string
pub fn optional_amount<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<JsonValue> = Option::deserialize(deserializer)?;
    match value {
        Some(JsonValue::Number(n)) => n
            .to_string()
            .parse::<Decimal>()
            .or_else(|_| {
                n.as_f64()
                    .and_then(Decimal::from_f64_retain)
                    .ok_or_else(|| format!("invalid decimal: {}", n))
            })
            .map(Some)
            .map_err(D::Error::custom),
        Some(JsonValue::String(s)) if s.trim().is_empty() => Ok(None),
        Some(JsonValue::String(s)) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid decimal: {}", e))),
        Some(JsonValue::Null) | None => Ok(None),
        _ => Err(D::Error::custom("expected number or string for amount")),
    }
}
