//! Patient entity model and DTOs.

use chrono::NaiveDate;
use healthvitals_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `patients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Patient {
    pub id: DbId,
    pub user_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    /// Centimetres.
    pub height: Option<f64>,
    /// Kilograms.
    pub weight: Option<f64>,
    pub blood_type: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Patient {
    /// `"First Last"`, trimmed when the last name is empty.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// DTO for creating a patient.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePatient {
    pub user_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub blood_type: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
}

/// Partial update of a patient's demographic and contact details.
/// `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdatePatientDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub blood_type: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
}

/// Biometric fields a scan may refresh. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdatePatientBiometrics {
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub gender: Option<String>,
}
