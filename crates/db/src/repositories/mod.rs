//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod face_scan_repo;
pub mod patient_repo;
pub mod profile_repo;
pub mod session_repo;
pub mod settings_repo;
pub mod user_repo;
pub mod vitals_repo;

pub use face_scan_repo::FaceScanRepo;
pub use patient_repo::PatientRepo;
pub use profile_repo::ProfileRepo;
pub use session_repo::SessionRepo;
pub use settings_repo::SettingsRepo;
pub use user_repo::UserRepo;
pub use vitals_repo::VitalsRepo;
