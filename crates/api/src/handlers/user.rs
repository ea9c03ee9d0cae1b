//! Account-level views: the caller with their primary patient record, and a
//! flat vitals feed.

use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use healthvitals_core::error::CoreError;
use healthvitals_core::roles::ROLE_ADMIN;
use healthvitals_core::types::{DbId, Timestamp};
use healthvitals_db::models::patient::{CreatePatient, Patient, UpdatePatientDetails};
use healthvitals_db::models::user::User;
use healthvitals_db::models::vitals::VitalsWithOwner;
use healthvitals_db::repositories::vitals_repo::VitalsFilter;
use healthvitals_db::repositories::{PatientRepo, UserRepo, VitalsRepo};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Cap on the `/user/vitals` feed.
const VITALS_FEED_LIMIT: i64 = 500;

const GENDERS: &[&str] = &["Male", "Female", "Other"];
const BLOOD_TYPES: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

#[derive(Debug, Serialize)]
pub struct AccountProfile {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
    pub created_at: Timestamp,
    /// The primary patient record, if one exists.
    pub patient: Option<Patient>,
}

impl AccountProfile {
    fn new(user: &User, patient: Option<Patient>) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: user.created_at,
            patient,
        }
    }
}

/// Partial update of the account name and patient details. Omitted fields
/// keep their stored value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAccountProfile {
    #[validate(length(min = 2))]
    pub name: Option<String>,
    #[validate(length(min = 2))]
    pub first_name: Option<String>,
    #[validate(length(min = 2))]
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(custom(function = "validate_gender"))]
    pub gender: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    pub height: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub weight: Option<f64>,
    #[validate(custom(function = "validate_blood_type"))]
    pub blood_type: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
}

impl UpdateAccountProfile {
    /// A new patient needs a full name, birth date and gender.
    fn into_new_patient(self, user_id: DbId) -> Option<CreatePatient> {
        Some(CreatePatient {
            user_id,
            first_name: self.first_name?,
            last_name: self.last_name?,
            date_of_birth: Some(self.date_of_birth?),
            gender: Some(self.gender?),
            height: self.height,
            weight: self.weight,
            blood_type: self.blood_type,
            phone_number: self.phone_number,
            address: self.address,
            emergency_contact: self.emergency_contact,
            allergies: self.allergies,
            medications: self.medications,
        })
    }

    fn into_details(self) -> UpdatePatientDetails {
        UpdatePatientDetails {
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            height: self.height,
            weight: self.weight,
            blood_type: self.blood_type,
            phone_number: self.phone_number,
            address: self.address,
            emergency_contact: self.emergency_contact,
            allergies: self.allergies,
            medications: self.medications,
        }
    }
}

fn one_of(value: &str, allowed: &[&str], code: &'static str) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        let mut err = ValidationError::new(code);
        err.message = Some(format!("must be one of {}", allowed.join(", ")).into());
        Err(err)
    }
}

fn validate_gender(value: &str) -> Result<(), ValidationError> {
    one_of(value, GENDERS, "gender")
}

fn validate_blood_type(value: &str) -> Result<(), ValidationError> {
    one_of(value, BLOOD_TYPES, "blood_type")
}

async fn load_user(state: &AppState, user_id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))
}

/// GET /api/user/profile
pub async fn get_account(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<AccountProfile>>> {
    let (user, patient) = tokio::try_join!(
        load_user(&state, auth_user.user_id),
        async {
            PatientRepo::find_primary_for_user(&state.pool, auth_user.user_id)
                .await
                .map_err(AppError::from)
        },
    )?;
    Ok(Json(DataResponse {
        data: AccountProfile::new(&user, patient),
    }))
}

/// PUT /api/user/profile
///
/// Updates the primary patient in place. Without one, a patient is created
/// only when the body carries a full name, birth date and gender.
pub async fn update_account(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<UpdateAccountProfile>,
) -> AppResult<Json<DataResponse<AccountProfile>>> {
    input.validate()?;
    let user_id = auth_user.user_id;

    let user = match input.name.as_deref() {
        Some(name) => UserRepo::update_name(&state.pool, user_id, name.trim())
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "User",
                id: user_id,
            }))?,
        None => load_user(&state, user_id).await?,
    };

    let patient = match PatientRepo::find_primary_for_user(&state.pool, user_id).await? {
        Some(existing) => {
            PatientRepo::update_details(&state.pool, existing.id, &input.into_details()).await?
        }
        None => match input.into_new_patient(user_id) {
            Some(create) => Some(PatientRepo::create(&state.pool, &create).await?),
            None => None,
        },
    };

    tracing::info!(user_id, has_patient = patient.is_some(), "Account profile updated");
    Ok(Json(DataResponse {
        data: AccountProfile::new(&user, patient),
    }))
}

/// GET /api/user/vitals
///
/// Newest records with owner and patient names. Admins see every record;
/// other callers see the ones filed under their account.
pub async fn list_vitals(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<VitalsWithOwner>>>> {
    let filter = VitalsFilter {
        user_id: (auth_user.role != ROLE_ADMIN).then_some(auth_user.user_id),
        ..Default::default()
    };
    let vitals = VitalsRepo::list_with_owner(&state.pool, &filter, VITALS_FEED_LIMIT).await?;
    tracing::debug!(user_id = auth_user.user_id, count = vitals.len(), "Vitals feed loaded");
    Ok(Json(DataResponse { data: vitals }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_patient_requires_identity_fields() {
        let partial = UpdateAccountProfile {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            gender: Some("Female".into()),
            ..Default::default()
        };
        assert!(partial.into_new_patient(1).is_none());

        let full = UpdateAccountProfile {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            gender: Some("Female".into()),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 12, 10),
            allergies: Some("Penicillin".into()),
            ..Default::default()
        };
        let create = full.into_new_patient(1).unwrap();
        assert_eq!(create.first_name, "Ada");
        assert_eq!(create.allergies.as_deref(), Some("Penicillin"));
    }

    #[test]
    fn enumerated_fields_are_checked() {
        let bad = UpdateAccountProfile {
            gender: Some("male".into()),
            blood_type: Some("C+".into()),
            ..Default::default()
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("gender"));
        assert!(fields.contains_key("blood_type"));

        let good = UpdateAccountProfile {
            gender: Some("Other".into()),
            blood_type: Some("AB-".into()),
            ..Default::default()
        };
        assert!(good.validate().is_ok());
    }
}
