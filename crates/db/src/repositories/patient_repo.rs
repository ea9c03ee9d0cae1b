//! Repository for the `patients` table.

use healthvitals_core::types::DbId;
use sqlx::PgPool;

use crate::models::patient::{
    CreatePatient, Patient, UpdatePatientBiometrics, UpdatePatientDetails,
};

const COLUMNS: &str = "id, user_id, first_name, last_name, date_of_birth, gender, \
                        height, weight, blood_type, phone_number, address, emergency_contact, \
                        allergies, medications, created_at, updated_at";

/// Provides CRUD operations for patients.
pub struct PatientRepo;

impl PatientRepo {
    pub async fn create(pool: &PgPool, input: &CreatePatient) -> Result<Patient, sqlx::Error> {
        let query = format!(
            "INSERT INTO patients
                (user_id, first_name, last_name, date_of_birth, gender, height, weight, blood_type,
                 phone_number, address, emergency_contact, allergies, medications)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Patient>(&query)
            .bind(input.user_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(input.date_of_birth)
            .bind(&input.gender)
            .bind(input.height)
            .bind(input.weight)
            .bind(&input.blood_type)
            .bind(&input.phone_number)
            .bind(&input.address)
            .bind(&input.emergency_contact)
            .bind(&input.allergies)
            .bind(&input.medications)
            .fetch_one(pool)
            .await
    }

    /// The user's first (oldest) patient record, which their own vitals attach to.
    pub async fn find_primary_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Patient>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM patients WHERE user_id = $1 ORDER BY id LIMIT 1");
        sqlx::query_as::<_, Patient>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a patient only if it belongs to `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Patient>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM patients WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Patient>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Patient>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM patients WHERE id = $1");
        sqlx::query_as::<_, Patient>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Patient>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM patients WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, Patient>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Count patients, optionally only those owned by `user_id`.
    pub async fn count(pool: &PgPool, user_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM patients WHERE $1::BIGINT IS NULL OR user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Apply the non-`None` fields of `input`.
    pub async fn update_details(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePatientDetails,
    ) -> Result<Option<Patient>, sqlx::Error> {
        let query = format!(
            "UPDATE patients SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                date_of_birth = COALESCE($4, date_of_birth),
                gender = COALESCE($5, gender),
                height = COALESCE($6, height),
                weight = COALESCE($7, weight),
                blood_type = COALESCE($8, blood_type),
                phone_number = COALESCE($9, phone_number),
                address = COALESCE($10, address),
                emergency_contact = COALESCE($11, emergency_contact),
                allergies = COALESCE($12, allergies),
                medications = COALESCE($13, medications)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Patient>(&query)
            .bind(id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(input.date_of_birth)
            .bind(&input.gender)
            .bind(input.height)
            .bind(input.weight)
            .bind(&input.blood_type)
            .bind(&input.phone_number)
            .bind(&input.address)
            .bind(&input.emergency_contact)
            .bind(&input.allergies)
            .bind(&input.medications)
            .fetch_optional(pool)
            .await
    }

    /// Refresh biometrics from a scan. Only non-`None` fields are applied.
    pub async fn update_biometrics(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePatientBiometrics,
    ) -> Result<Option<Patient>, sqlx::Error> {
        let query = format!(
            "UPDATE patients SET
                height = COALESCE($2, height),
                weight = COALESCE($3, weight),
                gender = COALESCE($4, gender)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Patient>(&query)
            .bind(id)
            .bind(input.height)
            .bind(input.weight)
            .bind(&input.gender)
            .fetch_optional(pool)
            .await
    }
}
