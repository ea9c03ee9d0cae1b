//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the session user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`device::DeviceUser`] -- Resolves a mobile / device API token to its user.
//! - [`device::OptionalDeviceUser`] -- Same, but tolerates anonymous callers.

pub mod auth;
pub mod device;
pub mod rbac;
