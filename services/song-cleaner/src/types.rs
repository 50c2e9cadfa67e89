//!
//! src/types.rs
//!
//! Record shapes on either side of the cleaner: the untouched
//! source object and the typed, validated song row
//!

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// Field names the cleaner knows about
pub const TRACK_ID: &str = "track_id";
pub const RELEASE_DATE: &str = "track_album_release_date";
pub const ENERGY: &str = "energy";
pub const TEMPO: &str = "tempo";
pub const TRACK_POPULARITY: &str = "track_popularity";

pub const CRITICAL_FIELDS: [&str; 2] = [TRACK_ID, RELEASE_DATE];

/// A song entry exactly as the source sent it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Map<String, Value>);

impl RawRecord {
    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(fields: Map<String, Value>) -> Self { RawRecord(fields) }
}

/// Non-null track identifier, kept as the source value so numeric
/// ids survive the round trip
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TrackId(Value);

impl TrackId {
    pub fn new(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            v => Some(TrackId(v)),
        }
    }

    /// Key used for de-duplication; distinct JSON values give distinct keys
    pub fn key(&self) -> String {
        self.0.to_string()
    }

    #[cfg(test)]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }
}

///
/// Numeric field after coercion.
///   None          -> field was not on the source record
///   Some(None)    -> field present but not a number, rendered as null
///   Some(Some(n)) -> coerced number
///
pub type NumericField = Option<Option<Number>>;

/// A validated song row, ready to be serialized to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedRecord {
    pub track_id: TrackId,
    #[serde(serialize_with = "iso_date")]
    pub track_album_release_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: NumericField,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo: NumericField,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_popularity: NumericField,
    /// every other source field, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn iso_date<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_track_id_is_rejected() {
        assert!(TrackId::new(Value::Null).is_none());
        assert!(TrackId::new(json!("")).is_some());
    }

    #[test]
    fn string_and_number_ids_do_not_collide() {
        let s = TrackId::new(json!("1")).unwrap();
        let n = TrackId::new(json!(1)).unwrap();
        assert_ne!(s.key(), n.key());
    }

    #[test]
    fn cleaned_record_serializes_flat() {
        let mut extra = Map::new();
        extra.insert("track_name".to_string(), json!("Breathe Deeper"));

        let record = CleanedRecord {
            track_id: TrackId::new(json!("6GtOsEzNUhJghrIf6UTbRV")).unwrap(),
            track_album_release_date: NaiveDate::from_ymd_opt(2020, 2, 14).unwrap(),
            energy: Some(Number::from_f64(0.71)),
            tempo: Some(None),
            track_popularity: None,
            extra,
        };

        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v, json!({
            "track_id": "6GtOsEzNUhJghrIf6UTbRV",
            "track_album_release_date": "2020-02-14",
            "energy": 0.71,
            "tempo": null,
            "track_name": "Breathe Deeper"
        }));
    }
}
