use serde::{Deserialize, Serialize};

use super::coerce;
use super::enums::Weekday;
use crate::db::{DatabaseError, Document, Fields};

/// Doctor as stored in the `Doctors` collection.
///
/// `slots` stays text exactly as submitted; it is only read as a number
/// when totals are computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(default, deserialize_with = "coerce::string")]
    pub name: String,
    #[serde(default, deserialize_with = "coerce::string")]
    pub qual: String,
    #[serde(default, deserialize_with = "coerce::string")]
    pub specialty: String,
    #[serde(default, deserialize_with = "coerce::string")]
    pub slots: String,
    #[serde(default, deserialize_with = "coerce::string")]
    pub shift_start: String,
    #[serde(default, deserialize_with = "coerce::string")]
    pub shift_end: String,
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub days: Vec<String>,
}

impl Doctor {
    pub fn from_document(doc: &Document) -> Result<Self, DatabaseError> {
        super::decode_document(doc)
    }

    pub fn to_fields(&self) -> Result<Fields, DatabaseError> {
        super::encode_fields(self)
    }

    /// Appointment slots as an integer; 0 when blank or not a number.
    pub fn slot_count(&self) -> i64 {
        coerce::to_i64(&serde_json::Value::String(self.slots.clone())).unwrap_or(0)
    }
}

/// Routine days a doctor works, in the order listed. Unknown names are skipped.
pub fn working_days(doctor: &Doctor) -> impl Iterator<Item = Weekday> + '_ {
    doctor.days.iter().filter_map(|day| match day.parse::<Weekday>() {
        Ok(weekday) => Some(weekday),
        Err(err) => {
            tracing::debug!(doctor = %doctor.name, %err, "Day outside the routine ignored");
            None
        }
    })
}
