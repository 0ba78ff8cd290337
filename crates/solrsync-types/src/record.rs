//! Record payloads.

use serde_json::{Map, Value};

/// One row/document: an arbitrary JSON object keyed by field id.
///
/// Values are whatever the data source produced; the index coerces them
/// against the core's schema on ingestion.
pub type Record = Map<String, Value>;

/// Build a `Record` from an iterator of key/value pairs.
///
/// Mostly a test convenience; production records arrive already shaped.
pub fn record_from_pairs<K, V, I>(pairs: I) -> Record
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_pairs() {
        let record = record_from_pairs([("_id", 1), ("age", 42)]);
        assert_eq!(record.get("_id"), Some(&Value::from(1)));
        assert_eq!(record.get("age"), Some(&Value::from(42)));
    }

    #[test]
    fn test_record_serializes_as_object() {
        let record = record_from_pairs([("name", "ada")]);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"name":"ada"}"#);
    }
}
