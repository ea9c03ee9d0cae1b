//! Role checks layered on top of [`AuthUser`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use healthvitals_core::error::CoreError;
use healthvitals_core::roles::ROLE_ADMIN;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// A session user holding the `admin` role. 401 without a session, 403 for
/// any other role.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require_role(&user, ROLE_ADMIN)?;
        Ok(RequireAdmin(user))
    }
}

fn require_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role == role {
        return Ok(());
    }
    tracing::warn!(user_id = user.user_id, role = %user.role, required = role, "Role check failed");
    Err(AppError::Core(CoreError::Forbidden(format!(
        "{role} role required"
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use healthvitals_core::roles::{ROLE_DEVICE, ROLE_USER};

    fn user(role: &str) -> AuthUser {
        AuthUser {
            user_id: 1,
            role: role.to_string(),
        }
    }

    #[test]
    fn admin_passes() {
        assert!(require_role(&user(ROLE_ADMIN), ROLE_ADMIN).is_ok());
    }

    #[test]
    fn other_roles_are_forbidden() {
        for role in [ROLE_USER, ROLE_DEVICE] {
            assert_matches!(
                require_role(&user(role), ROLE_ADMIN),
                Err(AppError::Core(CoreError::Forbidden(_)))
            );
        }
    }
}
