//! Patient and doctor record writers.
//!
//! Each writer turns one submitted form into a single document insert.
//! There is no validation beyond what the stored types require: the
//! admission date must be a real `YYYY-MM-DD` date because the discharge
//! date is derived from it; everything else is stored as given.

use chrono::{Days, NaiveDate};
use serde::Deserialize;

use crate::db::{Collection, DatabaseError, DocumentStore};
use crate::models::{self, Doctor, Patient};

/// Days between admission and the planned discharge.
pub const STAY_LENGTH_DAYS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Invalid {field} '{value}', expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Fields of the "add patient" form. Missing fields arrive empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewPatient {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub blood_group: String,
    pub disease: String,
    pub doctor: String,
    pub notes: String,
    pub admission_date: String,
}

/// Fields of the "add doctor" form. `days` may be empty.
#[derive(Debug, Clone, Default)]
pub struct NewDoctor {
    pub doc_name: String,
    pub qual: String,
    pub specialty: String,
    pub slots: String,
    pub shift_start: String,
    pub shift_end: String,
    pub days: Vec<String>,
}

impl NewDoctor {
    /// Build from raw form pairs. Repeated `days` (or `days[]`) keys
    /// accumulate; for any other repeated key the last value wins.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "doc_name" => form.doc_name = value,
                "qual" => form.qual = value,
                "specialty" => form.specialty = value,
                "slots" => form.slots = value,
                "shift_start" => form.shift_start = value,
                "shift_end" => form.shift_end = value,
                "days" | "days[]" => form.days.push(value),
                _ => {}
            }
        }
        form
    }
}

/// Planned discharge: admission plus the standard stay.
pub fn discharge_date_for(admission: NaiveDate) -> NaiveDate {
    admission
        .checked_add_days(Days::new(STAY_LENGTH_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// Age in whole years. Anything else is dropped (and logged) rather than
/// rejected.
fn parse_age(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<u32>() {
        Ok(age) => Some(age),
        Err(_) => {
            tracing::debug!(age = trimmed, "Non-numeric age stored as null");
            None
        }
    }
}

impl NewPatient {
    /// The document to store, with the discharge date filled in.
    pub fn into_patient(self) -> Result<Patient, RecordError> {
        let admission = models::parse_date(&self.admission_date).ok_or_else(|| {
            RecordError::InvalidDate {
                field: "admission_date",
                value: self.admission_date.clone(),
            }
        })?;
        let discharge = discharge_date_for(admission);

        Ok(Patient {
            name: self.name,
            age: parse_age(&self.age),
            gender: self.gender,
            blood_group: self.blood_group,
            disease: self.disease,
            doctor: self.doctor,
            notes: self.notes,
            admission_date: self.admission_date,
            discharge_date: Some(models::format_date(discharge)),
        })
    }
}

impl NewDoctor {
    pub fn into_doctor(self) -> Doctor {
        Doctor {
            name: self.doc_name,
            qual: self.qual,
            specialty: self.specialty,
            slots: self.slots,
            shift_start: self.shift_start,
            shift_end: self.shift_end,
            days: self.days,
        }
    }
}

/// Insert a patient; returns the new document id.
pub async fn add_patient(store: &dyn DocumentStore, form: NewPatient) -> Result<String, RecordError> {
    let patient = form.into_patient()?;
    let id = store
        .insert(Collection::Patients, patient.to_fields()?)
        .await?;
    tracing::info!(
        %id,
        admission = %patient.admission_date,
        discharge = patient.discharge_date.as_deref().unwrap_or_default(),
        "Patient admitted"
    );
    Ok(id)
}

/// Insert a doctor; returns the new document id.
pub async fn add_doctor(store: &dyn DocumentStore, form: NewDoctor) -> Result<String, RecordError> {
    let doctor = form.into_doctor();
    let id = store.insert(Collection::Doctors, doctor.to_fields()?).await?;
    tracing::info!(%id, days = doctor.days.len(), "Doctor added");
    Ok(id)
}
