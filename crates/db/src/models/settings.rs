//! User settings model and DTOs.

use healthvitals_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_settings` table (one per user).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSettings {
    pub id: DbId,
    pub user_id: DbId,

    pub email_notifications: bool,
    pub push_notifications: bool,
    pub sms_notifications: bool,
    pub appointment_reminders: bool,
    pub medication_reminders: bool,
    pub lab_result_alerts: bool,
    pub vital_reminders: bool,

    pub theme: String,
    pub language: String,
    pub unit_system: String,
    pub temperature_unit: String,
    pub date_format: String,
    pub time_format: String,

    pub profile_visibility: String,
    pub show_email: bool,
    pub show_phone: bool,
    pub show_location: bool,

    pub export_format: String,
    pub last_export_at: Option<Timestamp>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Partial settings update. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSettings {
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub sms_notifications: Option<bool>,
    pub appointment_reminders: Option<bool>,
    pub medication_reminders: Option<bool>,
    pub lab_result_alerts: Option<bool>,
    pub vital_reminders: Option<bool>,
    pub theme: Option<String>,
    pub language: Option<String>,
    pub unit_system: Option<String>,
    pub temperature_unit: Option<String>,
    pub date_format: Option<String>,
    pub time_format: Option<String>,
    pub profile_visibility: Option<String>,
    pub show_email: Option<bool>,
    pub show_phone: Option<bool>,
    pub show_location: Option<bool>,
    pub export_format: Option<String>,
}
