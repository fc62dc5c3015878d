//! Endpoint handlers.
//!
//! Each module corresponds to one page or form. Handlers delegate to the
//! aggregation and writer modules and only translate HTTP in and out.

pub mod auth;
pub mod dashboard;
pub mod doctors;
pub mod health;
pub mod patients;
