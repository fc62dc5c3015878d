use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::coerce;
use crate::db::{DatabaseError, Document, Fields};

/// Admitted patient as stored in the `Patients` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(default, deserialize_with = "coerce::string")]
    pub name: String,
    #[serde(default, deserialize_with = "coerce::opt_u32")]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "coerce::string")]
    pub gender: String,
    #[serde(default, deserialize_with = "coerce::string")]
    pub blood_group: String,
    #[serde(default, deserialize_with = "coerce::string")]
    pub disease: String,
    #[serde(default, deserialize_with = "coerce::string")]
    pub doctor: String,
    #[serde(default, deserialize_with = "coerce::string")]
    pub notes: String,
    #[serde(default, deserialize_with = "coerce::string")]
    pub admission_date: String,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub discharge_date: Option<String>,
}

impl Patient {
    pub fn from_document(doc: &Document) -> Result<Self, DatabaseError> {
        super::decode_document(doc)
    }

    pub fn to_fields(&self) -> Result<Fields, DatabaseError> {
        super::encode_fields(self)
    }

    /// Discharge date, when present and well-formed.
    pub fn discharge_on(&self) -> Option<NaiveDate> {
        self.discharge_date.as_deref().and_then(super::parse_date)
    }
}
