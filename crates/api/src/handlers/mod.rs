//! Request handlers, one module per API resource.

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod device;
pub mod health_vitals;
pub mod mobile;
pub mod profile;
pub mod settings;
pub mod user;

/// Gender stored on patients created without one.
pub(crate) const UNSPECIFIED_GENDER: &str = "Not specified";
