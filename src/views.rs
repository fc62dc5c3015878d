//! Server-rendered pages (askama templates under `templates/`).
//!
//! Templates only format; every figure comes precomputed from the
//! dashboard aggregate.

use askama::Template;
use chrono::NaiveDate;

use crate::config::APP_NAME;
use crate::dashboard::{Dashboard, LOW_STOCK_THRESHOLD};
use crate::models::{Patient, Weekday};

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub app_name: &'static str,
}

impl LoginPage {
    pub fn new() -> Self {
        Self { app_name: APP_NAME }
    }
}

impl Default for LoginPage {
    fn default() -> Self {
        Self::new()
    }
}

/// One patient table row.
pub struct PatientRow {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub blood_group: String,
    pub disease: String,
    pub doctor: String,
    pub notes: String,
    pub admission_date: String,
    pub discharge_date: String,
    pub in_bed: bool,
}

impl PatientRow {
    fn new(patient: &Patient, today: NaiveDate) -> Self {
        Self {
            name: patient.name.clone(),
            age: patient.age.map(|a| a.to_string()).unwrap_or_default(),
            gender: patient.gender.clone(),
            blood_group: patient.blood_group.clone(),
            disease: patient.disease.clone(),
            doctor: patient.doctor.clone(),
            notes: patient.notes.clone(),
            admission_date: patient.admission_date.clone(),
            discharge_date: patient.discharge_date.clone().unwrap_or_default(),
            in_bed: patient.discharge_on().is_some_and(|d| d >= today),
        }
    }
}

/// One inventory table row.
pub struct InventoryRow {
    pub name: String,
    pub quantity: i64,
    pub low_stock: bool,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub app_name: &'static str,
    pub today: String,
    pub dashboard: Dashboard,
    pub patients: Vec<PatientRow>,
    pub inventory: Vec<InventoryRow>,
    pub weekdays: &'static [Weekday],
    pub low_stock_threshold: i64,
}

impl DashboardPage {
    pub fn new(dashboard: Dashboard, today: NaiveDate) -> Self {
        let patients = dashboard
            .patients
            .iter()
            .map(|p| PatientRow::new(p, today))
            .collect();
        let inventory = dashboard
            .inventory
            .iter()
            .map(|(name, &quantity)| InventoryRow {
                name: name.clone(),
                quantity,
                low_stock: quantity < LOW_STOCK_THRESHOLD,
            })
            .collect();

        Self {
            app_name: APP_NAME,
            today: crate::models::format_date(today),
            dashboard,
            patients,
            inventory,
            weekdays: Weekday::ALL,
            low_stock_threshold: LOW_STOCK_THRESHOLD,
        }
    }
}
