//! Pure domain logic for the health vitals service.
//!
//! Nothing in this crate touches the network or the database; the `db` and
//! `api` crates feed it plain values and render what it returns.

pub mod analytics;
pub mod api_tokens;
pub mod calculations;
pub mod dashboard;
pub mod ecg;
pub mod error;
pub mod export;
pub mod health;
pub mod pdf;
pub mod report;
pub mod roles;
pub mod types;
pub mod vitals;
