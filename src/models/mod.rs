pub mod coerce;
pub mod doctor;
pub mod enums;
pub mod inventory;
pub mod patient;

pub use doctor::*;
pub use enums::*;
pub use inventory::*;
pub use patient::*;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::{DatabaseError, Document, Fields};

/// Calendar date format used for every stored date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a stored `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Decode a stored document into a model.
pub(crate) fn decode_document<T: DeserializeOwned>(doc: &Document) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::Object(doc.fields.clone())).map_err(|e| {
        DatabaseError::Decode {
            id: doc.id.clone(),
            reason: e.to_string(),
        }
    })
}

/// Encode a model as document fields.
pub(crate) fn encode_fields<T: Serialize>(model: &T) -> Result<Fields, DatabaseError> {
    match serde_json::to_value(model)? {
        serde_json::Value::Object(fields) => Ok(fields),
        other => Err(DatabaseError::Decode {
            id: String::new(),
            reason: format!("expected an object, got {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_dates_only() {
        assert_eq!(parse_date("2024-01-06"), NaiveDate::from_ymd_opt(2024, 1, 6));
        assert_eq!(parse_date("06/01/2024"), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn format_date_zero_pads() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(format_date(date), "2024-03-01");
    }
}
