/// Lenient serde helpers for request payloads
///
/// Browser forms send numbers as strings (`"12.5"`) and dates either as
/// `YYYY-MM-DD` or as full RFC 3339 timestamps. These helpers coerce both
/// shapes into the typed model fields.
///
/// # Example
///
/// ```
/// use fieldbook_shared::models::de;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Input {
///     #[serde(default, deserialize_with = "de::lenient_f64")]
///     size: Option<f64>,
/// }
///
/// let input: Input = serde_json::from_str(r#"{"size": "42.5"}"#).unwrap();
/// assert_eq!(input.size, Some(42.5));
/// ```

use chrono::{DateTime, NaiveDate};
use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::Value;

/// Accepts a JSON number, a numeric string, an empty string, or null
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| D::Error::custom("number out of range")),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected a number, got \"{}\"", s))),
        Some(other) => Err(D::Error::custom(format!("expected a number, got {}", other))),
    }
}

/// Accepts `YYYY-MM-DD`, an RFC 3339 timestamp, an empty string, or null
pub fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<String>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(s) if s.trim().is_empty() => return Ok(None),
        Some(s) => s,
    };

    parse_date(raw.trim())
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("invalid date \"{}\"", raw)))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_f64")]
        size: Option<f64>,
        #[serde(default, deserialize_with = "lenient_date")]
        date: Option<NaiveDate>,
    }

    #[test]
    fn test_lenient_f64_accepts_strings_and_numbers() {
        let p: Probe = serde_json::from_str(r#"{"size": "10.5"}"#).unwrap();
        assert_eq!(p.size, Some(10.5));

        let p: Probe = serde_json::from_str(r#"{"size": 3}"#).unwrap();
        assert_eq!(p.size, Some(3.0));

        let p: Probe = serde_json::from_str(r#"{"size": ""}"#).unwrap();
        assert_eq!(p.size, None);

        let p: Probe = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(p.size, None);
    }

    #[test]
    fn test_lenient_f64_rejects_garbage() {
        let result: Result<Probe, _> = serde_json::from_str(r#"{"size": "ten"}"#);
        assert!(result.is_err());

        let result: Result<Probe, _> = serde_json::from_str(r#"{"size": [1]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_lenient_date_formats() {
        let p: Probe = serde_json::from_str(r#"{"date": "2024-03-01"}"#).unwrap();
        assert_eq!(p.date, NaiveDate::from_ymd_opt(2024, 3, 1));

        let p: Probe = serde_json::from_str(r#"{"date": "2024-03-01T10:00:00.000Z"}"#).unwrap();
        assert_eq!(p.date, NaiveDate::from_ymd_opt(2024, 3, 1));

        let p: Probe = serde_json::from_str(r#"{"date": null}"#).unwrap();
        assert_eq!(p.date, None);

        let result: Result<Probe, _> = serde_json::from_str(r#"{"date": "March"}"#);
        assert!(result.is_err());
    }
}
