//! Well-known role name constants.
//!
//! These must match the `ck_users_role` check constraint in
//! `20250101000001_create_users.sql`.

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_DEVICE: &str = "device";

/// All roles an account may hold.
pub const ALL_ROLES: &[&str] = &[ROLE_USER, ROLE_ADMIN, ROLE_DEVICE];

/// Returns `true` if `role` is one of [`ALL_ROLES`].
pub fn is_valid_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_are_valid() {
        assert!(is_valid_role("user"));
        assert!(is_valid_role("admin"));
        assert!(is_valid_role("device"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(!is_valid_role("creator"));
        assert!(!is_valid_role("Admin"));
        assert!(!is_valid_role(""));
    }
}
