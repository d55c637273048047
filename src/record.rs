//! Observation records and the upstream `[envelope, records]` response shape.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::FetchError;

/// One observation for one entity in one period.
///
/// `value` stays `None` when the upstream has no observation; zero is only
/// substituted at the chart boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub entity_code: String,
    pub entity_name: String,
    pub period: String,
    pub value: Option<f64>,
}

impl Record {
    pub fn new(
        entity_code: impl Into<String>,
        entity_name: impl Into<String>,
        period: impl Into<String>,
        value: Option<f64>,
    ) -> Self {
        Self {
            entity_code: entity_code.into(),
            entity_name: entity_name.into(),
            period: period.into(),
            value,
        }
    }

    /// The period as a year, or `None` if it does not parse.
    pub fn year(&self) -> Option<i32> {
        self.period.trim().parse().ok()
    }
}

/// Paging metadata sent ahead of every record page.
///
/// Only its presence is validated. The upstream encodes some of these
/// numbers as strings, so every field is read leniently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaginationEnvelope {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub pages: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub per_page: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total: Option<u64>,
    #[serde(default)]
    pub lastupdated: Option<String>,
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Deserialize)]
struct WireCountry {
    value: String,
}

#[derive(Debug, Deserialize)]
struct WireRecord {
    countryiso3code: String,
    country: WireCountry,
    date: String,
    value: Option<f64>,
}

impl From<WireRecord> for Record {
    fn from(w: WireRecord) -> Self {
        Record {
            entity_code: w.countryiso3code,
            entity_name: w.country.value,
            period: w.date,
            value: w.value,
        }
    }
}

/// Decodes one upstream response body.
///
/// The body must be a two-element array `[envelope, records]` whose second
/// element is an array. Records come back in upstream order (newest first).
pub fn decode_response(bytes: &[u8]) -> Result<(PaginationEnvelope, Vec<Record>), FetchError> {
    let root: Value =
        serde_json::from_slice(bytes).map_err(|e| FetchError::Malformed(e.to_string()))?;

    let mut parts = match root {
        Value::Array(parts) if parts.len() == 2 => parts,
        Value::Array(parts) => {
            return Err(FetchError::Malformed(format!(
                "expected 2 elements, got {}",
                parts.len()
            )));
        }
        other => {
            return Err(FetchError::Malformed(format!(
                "expected a JSON array, got {}",
                json_kind(&other)
            )));
        }
    };

    let records = parts.pop().unwrap_or(Value::Null);
    let envelope = parts.pop().unwrap_or(Value::Null);

    let envelope: PaginationEnvelope = serde_json::from_value(envelope)
        .map_err(|e| FetchError::Malformed(format!("pagination envelope: {e}")))?;

    if !records.is_array() {
        return Err(FetchError::MissingRecords);
    }

    let records: Vec<WireRecord> = serde_json::from_value(records)
        .map_err(|e| FetchError::Malformed(format!("record array: {e}")))?;

    Ok((envelope, records.into_iter().map(Record::from).collect()))
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Resolves duplicate `(entity_code, period)` pairs: the later record wins.
///
/// Surviving records keep their relative order.
pub fn dedup_last_write_wins(records: Vec<Record>) -> Vec<Record> {
    let mut last: HashMap<(&str, &str), usize> = HashMap::with_capacity(records.len());
    for (i, r) in records.iter().enumerate() {
        last.insert((r.entity_code.as_str(), r.period.as_str()), i);
    }

    if last.len() == records.len() {
        return records;
    }

    let keep: Vec<bool> = records
        .iter()
        .enumerate()
        .map(|(i, r)| last.get(&(r.entity_code.as_str(), r.period.as_str())) == Some(&i))
        .collect();

    records
        .into_iter()
        .zip(keep)
        .filter_map(|(r, keep)| keep.then_some(r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"[
        {"page":1,"pages":1,"per_page":"50","total":2,"sourceid":"2","lastupdated":"2025-01-28"},
        [
            {"indicator":{"id":"EN.GHG.ALL.MT.CE.AR5","value":"Total GHG"},
             "country":{"id":"US","value":"United States"},
             "countryiso3code":"USA","date":"2023","value":null,
             "unit":"","obs_status":"","decimal":1},
            {"indicator":{"id":"EN.GHG.ALL.MT.CE.AR5","value":"Total GHG"},
             "country":{"id":"US","value":"United States"},
             "countryiso3code":"USA","date":"2022","value":5960.3,
             "unit":"","obs_status":"","decimal":1}
        ]
    ]"#;

    #[test]
    fn test_decode_valid_response() {
        let (envelope, records) = decode_response(BODY.as_bytes()).unwrap();

        assert_eq!(envelope.per_page, Some(50));
        assert_eq!(envelope.total, Some(2));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].entity_code, "USA");
        assert_eq!(records[0].entity_name, "United States");
        assert_eq!(records[0].period, "2023");
        assert_eq!(records[0].value, None);
        assert_eq!(records[1].value, Some(5960.3));
    }

    #[test]
    fn test_decode_rejects_single_element_error_body() {
        let body = r#"[{"message":[{"id":"120","key":"Invalid value"}]}]"#;
        let err = decode_response(body.as_bytes()).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn test_decode_null_record_array() {
        let body = r#"[{"page":0,"pages":0,"per_page":50,"total":0}, null]"#;
        assert_eq!(
            decode_response(body.as_bytes()).unwrap_err(),
            FetchError::MissingRecords
        );
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let err = decode_response(b"<html>busy</html>").unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn test_decode_rejects_object_root() {
        let err = decode_response(br#"{"page":1}"#).unwrap_err();
        assert_eq!(
            err,
            FetchError::Malformed("expected a JSON array, got an object".into())
        );
    }

    #[test]
    fn test_year_parsing() {
        assert_eq!(Record::new("USA", "United States", "1999", None).year(), Some(1999));
        assert_eq!(Record::new("USA", "United States", "n/a", None).year(), None);
    }

    #[test]
    fn test_dedup_keeps_later_record() {
        let records = vec![
            Record::new("USA", "United States", "2000", Some(1.0)),
            Record::new("FRA", "France", "2000", Some(2.0)),
            Record::new("USA", "United States", "2000", Some(3.0)),
        ];

        let deduped = dedup_last_write_wins(records);

        assert_eq!(
            deduped,
            vec![
                Record::new("FRA", "France", "2000", Some(2.0)),
                Record::new("USA", "United States", "2000", Some(3.0)),
            ]
        );
    }

    #[test]
    fn test_dedup_without_duplicates_is_identity() {
        let records = vec![
            Record::new("USA", "United States", "2000", Some(1.0)),
            Record::new("USA", "United States", "2001", None),
        ];
        assert_eq!(dedup_last_write_wins(records.clone()), records);
    }
}
