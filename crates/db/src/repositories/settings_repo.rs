//! Repository for the `user_settings` table.

use healthvitals_core::types::DbId;
use sqlx::PgPool;

use crate::models::settings::{UpdateSettings, UserSettings};

const COLUMNS: &str = "id, user_id, email_notifications, push_notifications, sms_notifications, \
                        appointment_reminders, medication_reminders, lab_result_alerts, \
                        vital_reminders, theme, language, unit_system, temperature_unit, \
                        date_format, time_format, profile_visibility, show_email, show_phone, \
                        show_location, export_format, last_export_at, created_at, updated_at";

/// Provides get/update operations for the one-per-user settings row.
pub struct SettingsRepo;

impl SettingsRepo {
    /// Return the user's settings, creating the defaults on first access.
    pub async fn get_or_create(pool: &PgPool, user_id: DbId) -> Result<UserSettings, sqlx::Error> {
        sqlx::query("INSERT INTO user_settings (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(pool)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM user_settings WHERE user_id = $1");
        sqlx::query_as::<_, UserSettings>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Apply a partial update. Only non-`None` fields are changed; a missing
    /// row is created with defaults first.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &UpdateSettings,
    ) -> Result<UserSettings, sqlx::Error> {
        Self::get_or_create(pool, user_id).await?;

        let query = format!(
            "UPDATE user_settings SET
                email_notifications = COALESCE($2, email_notifications),
                push_notifications = COALESCE($3, push_notifications),
                sms_notifications = COALESCE($4, sms_notifications),
                appointment_reminders = COALESCE($5, appointment_reminders),
                medication_reminders = COALESCE($6, medication_reminders),
                lab_result_alerts = COALESCE($7, lab_result_alerts),
                vital_reminders = COALESCE($8, vital_reminders),
                theme = COALESCE($9, theme),
                language = COALESCE($10, language),
                unit_system = COALESCE($11, unit_system),
                temperature_unit = COALESCE($12, temperature_unit),
                date_format = COALESCE($13, date_format),
                time_format = COALESCE($14, time_format),
                profile_visibility = COALESCE($15, profile_visibility),
                show_email = COALESCE($16, show_email),
                show_phone = COALESCE($17, show_phone),
                show_location = COALESCE($18, show_location),
                export_format = COALESCE($19, export_format)
             WHERE user_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSettings>(&query)
            .bind(user_id)
            .bind(input.email_notifications)
            .bind(input.push_notifications)
            .bind(input.sms_notifications)
            .bind(input.appointment_reminders)
            .bind(input.medication_reminders)
            .bind(input.lab_result_alerts)
            .bind(input.vital_reminders)
            .bind(&input.theme)
            .bind(&input.language)
            .bind(&input.unit_system)
            .bind(&input.temperature_unit)
            .bind(&input.date_format)
            .bind(&input.time_format)
            .bind(&input.profile_visibility)
            .bind(input.show_email)
            .bind(input.show_phone)
            .bind(input.show_location)
            .bind(&input.export_format)
            .fetch_one(pool)
            .await
    }

    /// Stamp `last_export_at` with the current time.
    pub async fn mark_exported(pool: &PgPool, user_id: DbId) -> Result<(), sqlx::Error> {
        Self::get_or_create(pool, user_id).await?;
        sqlx::query("UPDATE user_settings SET last_export_at = NOW() WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
