//! Dashboard aggregation: bed occupancy, weekly routine, appointment
//! slots and low-stock count.
//!
//! `build_dashboard` is a pure function of the three record lists and the
//! current date. `load_dashboard` fetches everything from the store and
//! feeds it in; nothing is cached between requests.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::db::{Collection, DatabaseError, Document, DocumentStore};
use crate::models::{self, working_days, Doctor, InventoryItem, Patient, Weekday};

/// Fixed bed capacity of the ward.
pub const TOTAL_BEDS: i64 = 50;

/// Items with fewer units than this are low on stock.
pub const LOW_STOCK_THRESHOLD: i64 = 20;

/// Suggested admission date when a bed is free now.
pub const IMMEDIATE: &str = "Immediate";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BedOccupancy {
    pub occupied_beds: i64,
    /// `TOTAL_BEDS - occupied_beds`; negative when over-admitted.
    pub available_beds: i64,
    pub suggested_date: String,
    pub over_capacity: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineDay {
    pub day: Weekday,
    pub doctors: Vec<Doctor>,
}

/// Doctors scheduled per weekday, Monday through Saturday.
#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    pub days: Vec<RoutineDay>,
}

impl Routine {
    fn empty() -> Self {
        Self {
            days: Weekday::ALL
                .iter()
                .map(|&day| RoutineDay {
                    day,
                    doctors: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn doctors_on(&self, day: Weekday) -> &[Doctor] {
        self.days
            .iter()
            .find(|d| d.day == day)
            .map(|d| d.doctors.as_slice())
            .unwrap_or_default()
    }
}

// Serialized as a day-name → doctors object, keeping weekday order.
impl Serialize for Routine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for entry in &self.days {
            map.serialize_entry(entry.day.as_str(), &entry.doctors)?;
        }
        map.end()
    }
}

/// Everything the dashboard page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub patients: Vec<Patient>,
    pub doctors: Vec<Doctor>,
    pub routine: Routine,
    pub inventory: BTreeMap<String, i64>,
    pub low_stock_count: usize,
    pub available_beds: i64,
    pub occupied_beds: i64,
    pub total_beds: i64,
    pub total_appointments: i64,
    pub suggested_date: String,
    pub over_capacity: bool,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Count beds held by patients whose discharge date is today or later.
///
/// Patients with a missing or malformed discharge date hold no bed.
pub fn compute_beds(patients: &[Patient], today: NaiveDate) -> BedOccupancy {
    let upcoming: Vec<NaiveDate> = patients
        .iter()
        .filter_map(Patient::discharge_on)
        .filter(|date| *date >= today)
        .collect();

    let occupied_beds = upcoming.len() as i64;
    let available_beds = TOTAL_BEDS - occupied_beds;

    let suggested_date = match upcoming.iter().min() {
        Some(&earliest) if available_beds <= 0 => models::format_date(earliest),
        _ => IMMEDIATE.to_string(),
    };

    BedOccupancy {
        occupied_beds,
        available_beds,
        suggested_date,
        over_capacity: available_beds < 0,
    }
}

/// Group doctors by the days they work and total their slots.
pub fn compute_routine(doctors: &[Doctor]) -> (Routine, i64) {
    let mut routine = Routine::empty();
    let mut total_slots = 0;

    for doctor in doctors {
        total_slots += doctor.slot_count();
        for day in working_days(doctor) {
            if let Some(entry) = routine.days.iter_mut().find(|d| d.day == day) {
                entry.doctors.push(doctor.clone());
            }
        }
    }

    (routine, total_slots)
}

pub fn count_low_stock<'a>(quantities: impl IntoIterator<Item = &'a i64>) -> usize {
    quantities
        .into_iter()
        .filter(|&&qty| qty < LOW_STOCK_THRESHOLD)
        .count()
}

pub fn build_dashboard(
    patients: Vec<Patient>,
    doctors: Vec<Doctor>,
    inventory: Vec<InventoryItem>,
    today: NaiveDate,
) -> Dashboard {
    let beds = compute_beds(&patients, today);
    let (routine, total_appointments) = compute_routine(&doctors);
    let inventory: BTreeMap<String, i64> = inventory
        .into_iter()
        .map(|item| (item.name, item.quantity))
        .collect();
    let low_stock_count = count_low_stock(inventory.values());

    if beds.over_capacity {
        tracing::warn!(
            occupied = beds.occupied_beds,
            capacity = TOTAL_BEDS,
            "Ward is over capacity"
        );
    }

    Dashboard {
        patients,
        doctors,
        routine,
        inventory,
        low_stock_count,
        available_beds: beds.available_beds,
        occupied_beds: beds.occupied_beds,
        total_beds: TOTAL_BEDS,
        total_appointments,
        suggested_date: beds.suggested_date,
        over_capacity: beds.over_capacity,
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Decode every document, skipping (and logging) the ones that do not fit.
fn decode_all<T>(
    collection: Collection,
    docs: &[Document],
    decode: impl Fn(&Document) -> Result<T, DatabaseError>,
) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| match decode(doc) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(%collection, id = %doc.id, %err, "Skipping malformed record");
                None
            }
        })
        .collect()
}

/// Fetch all records and aggregate them for `today`.
pub async fn load_dashboard(
    store: &dyn DocumentStore,
    today: NaiveDate,
) -> Result<Dashboard, DatabaseError> {
    let patient_docs = store.read_all(Collection::Patients).await?;
    let doctor_docs = store.read_all(Collection::Doctors).await?;
    let inventory_docs = store.read_all(Collection::Inventory).await?;

    let patients = decode_all(Collection::Patients, &patient_docs, Patient::from_document);
    let doctors = decode_all(Collection::Doctors, &doctor_docs, Doctor::from_document);
    let inventory = decode_all(Collection::Inventory, &inventory_docs, InventoryItem::from_document);

    Ok(build_dashboard(patients, doctors, inventory, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Fields, MemoryStore};
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        models::parse_date(s).unwrap()
    }

    fn patient(discharge: Option<&str>) -> Patient {
        Patient {
            name: "P".into(),
            age: Some(40),
            gender: "F".into(),
            blood_group: "O+".into(),
            disease: "Flu".into(),
            doctor: "Dr. Rao".into(),
            notes: String::new(),
            admission_date: "2024-01-01".into(),
            discharge_date: discharge.map(str::to_string),
        }
    }

    fn doctor(name: &str, slots: &str, days: &[&str]) -> Doctor {
        Doctor {
            name: name.into(),
            qual: "MBBS".into(),
            specialty: "General".into(),
            slots: slots.into(),
            shift_start: "09:00".into(),
            shift_end: "17:00".into(),
            days: days.iter().map(|d| d.to_string()).collect(),
        }
    }

    // ── Beds ────────────────────────────────────────────────

    #[test]
    fn occupied_counts_today_and_future_discharges() {
        let today = date("2024-03-10");
        let patients = vec![
            patient(Some("2024-03-09")), // already discharged
            patient(Some("2024-03-10")), // leaves today, still in a bed
            patient(Some("2024-03-15")),
            patient(None),
            patient(Some("soon")),
        ];

        let beds = compute_beds(&patients, today);
        assert_eq!(beds.occupied_beds, 2);
        assert_eq!(beds.available_beds, 48);
        assert_eq!(beds.occupied_beds + beds.available_beds, TOTAL_BEDS);
        assert_eq!(beds.suggested_date, IMMEDIATE);
        assert!(!beds.over_capacity);
    }

    #[test]
    fn full_ward_suggests_earliest_discharge() {
        let today = date("2024-01-01");
        let mut patients: Vec<Patient> = (0..48).map(|_| patient(Some("2024-03-01"))).collect();
        patients.push(patient(Some("2024-02-15")));
        patients.push(patient(Some("2024-03-01")));

        let beds = compute_beds(&patients, today);
        assert_eq!(beds.available_beds, 0);
        assert_eq!(beds.suggested_date, "2024-02-15");
        assert!(!beds.over_capacity);
    }

    #[test]
    fn over_admission_goes_negative_and_is_flagged() {
        let today = date("2024-01-01");
        let patients: Vec<Patient> = (0..53).map(|_| patient(Some("2024-01-05"))).collect();

        let beds = compute_beds(&patients, today);
        assert_eq!(beds.occupied_beds, 53);
        assert_eq!(beds.available_beds, -3);
        assert_eq!(beds.occupied_beds + beds.available_beds, TOTAL_BEDS);
        assert_eq!(beds.suggested_date, "2024-01-05");
        assert!(beds.over_capacity);
    }

    #[test]
    fn no_qualifying_dates_means_immediate() {
        let beds = compute_beds(&[patient(Some("2020-01-01")), patient(None)], date("2024-01-01"));
        assert_eq!(beds.occupied_beds, 0);
        assert_eq!(beds.available_beds, TOTAL_BEDS);
        assert_eq!(beds.suggested_date, IMMEDIATE);
    }

    // ── Routine ─────────────────────────────────────────────

    #[test]
    fn doctor_appears_only_on_listed_days() {
        let doctors = vec![doctor("Dr. Iyer", "10", &["Monday", "Wednesday"])];
        let (routine, total) = compute_routine(&doctors);

        for day in Weekday::ALL {
            let names: Vec<&str> = routine.doctors_on(*day).iter().map(|d| d.name.as_str()).collect();
            match day {
                Weekday::Monday | Weekday::Wednesday => assert_eq!(names, ["Dr. Iyer"]),
                _ => assert!(names.is_empty(), "{} should be empty", day.as_str()),
            }
        }
        assert_eq!(total, 10);
    }

    #[test]
    fn routine_keeps_store_order_within_a_day() {
        let doctors = vec![
            doctor("Dr. A", "2", &["Friday"]),
            doctor("Dr. B", "3", &["Friday", "Saturday"]),
            doctor("Dr. C", "x", &["Friday"]),
        ];
        let (routine, total) = compute_routine(&doctors);

        let friday: Vec<&str> = routine
            .doctors_on(Weekday::Friday)
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(friday, ["Dr. A", "Dr. B", "Dr. C"]);
        assert_eq!(routine.doctors_on(Weekday::Saturday).len(), 1);
        assert_eq!(total, 5);
    }

    #[test]
    fn slots_count_even_without_days() {
        let (routine, total) = compute_routine(&[doctor("Dr. Off", "7", &["Sunday"])]);
        assert_eq!(total, 7);
        assert!(routine.days.iter().all(|d| d.doctors.is_empty()));
        assert_eq!(routine.days.len(), 6);
    }

    #[test]
    fn routine_serializes_in_weekday_order() {
        let (routine, _) = compute_routine(&[doctor("Dr. Z", "1", &["Saturday"])]);
        let text = serde_json::to_string(&routine).unwrap();
        let monday = text.find("\"Monday\"").unwrap();
        let saturday = text.find("\"Saturday\"").unwrap();
        assert!(monday < saturday);
        assert!(!text.contains("Sunday"));
    }

    // ── Stock ───────────────────────────────────────────────

    #[test]
    fn low_stock_is_strictly_below_threshold() {
        let inventory: BTreeMap<String, i64> =
            [("A", 5), ("B", 25), ("C", 19)].into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        assert_eq!(count_low_stock(inventory.values()), 2);
        assert_eq!(count_low_stock(&[20]), 0);
    }

    // ── Whole dashboard ─────────────────────────────────────

    #[test]
    fn build_dashboard_carries_every_figure() {
        let dashboard = build_dashboard(
            vec![patient(Some("2030-01-01"))],
            vec![doctor("Dr. Iyer", "6", &["Tuesday"]), doctor("Dr. Khan", "4", &[])],
            vec![InventoryItem::new("Insulin", 45), InventoryItem::new("Ventilators", 8)],
            date("2024-01-01"),
        );

        assert_eq!(dashboard.patients.len(), 1);
        assert_eq!(dashboard.doctors.len(), 2);
        assert_eq!(dashboard.occupied_beds, 1);
        assert_eq!(dashboard.available_beds, 49);
        assert_eq!(dashboard.total_beds, 50);
        assert_eq!(dashboard.total_appointments, 10);
        assert_eq!(dashboard.low_stock_count, 1);
        assert_eq!(dashboard.inventory["Insulin"], 45);
        assert_eq!(dashboard.suggested_date, IMMEDIATE);
    }

    #[tokio::test]
    async fn load_dashboard_reads_store_and_skips_bad_records() {
        let fields = |v: serde_json::Value| -> Fields { v.as_object().cloned().unwrap() };
        let store = MemoryStore::new()
            .with_documents(
                Collection::Patients,
                vec![
                    Document::new("p1", fields(json!({"name": "Asha", "discharge_date": "2999-01-01"}))),
                    Document::new("p2", fields(json!({"name": "Old", "discharge_date": "2000-01-01"}))),
                ],
            )
            .with_documents(
                Collection::Doctors,
                vec![Document::new(
                    "d1",
                    fields(json!({"name": "Dr. Rao", "slots": "12", "days": ["Monday"]})),
                )],
            )
            .with_documents(
                Collection::Inventory,
                vec![
                    Document::new("A", fields(json!({"quantity": 5}))),
                    Document::new("B", fields(json!({"quantity": 25}))),
                    Document::new("C", fields(json!({"quantity": "19"}))),
                ],
            );

        let dashboard = load_dashboard(&store, date("2024-06-01")).await.unwrap();
        assert_eq!(dashboard.patients.len(), 2);
        assert_eq!(dashboard.occupied_beds, 1);
        assert_eq!(dashboard.total_appointments, 12);
        assert_eq!(dashboard.routine.doctors_on(Weekday::Monday).len(), 1);
        assert_eq!(dashboard.low_stock_count, 2);
        assert_eq!(store.write_count(), 0);
    }
}
