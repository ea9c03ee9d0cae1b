pub mod admin;
pub mod face_scan;
pub mod patient;
pub mod profile;
pub mod session;
pub mod settings;
pub mod user;
pub mod vitals;
