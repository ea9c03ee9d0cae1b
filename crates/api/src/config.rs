use std::fmt::Debug;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// | Env Var                   | Default                 |
/// |---------------------------|-------------------------|
/// | `HOST`                    | `0.0.0.0`               |
/// | `PORT`                    | `3000`                  |
/// | `CORS_ORIGINS`            | `http://localhost:3000` |
/// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
/// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                    |
/// | `DATABASE_URL`            | required                |
/// | `JWT_SECRET`              | required                |
/// | `JWT_ACCESS_EXPIRY_MINS`  | `60`                    |
/// | `JWT_REFRESH_EXPIRY_DAYS` | `30`                    |
/// | `PDF_RENDERER_BIN`        | `chromium`              |
/// | `PDF_RENDER_TIMEOUT_SECS` | `30`                    |
/// | `UPLOAD_DIR`              | `uploads`               |
/// | `UPLOAD_MAX_BYTES`        | `2097152`               |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated in `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub shutdown_timeout_secs: u64,
    pub database_url: String,
    pub jwt: JwtConfig,
    pub pdf: PdfConfig,
    pub uploads: UploadConfig,
}

/// Where profile images are written. Served read-only under `/uploads`.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    /// Per-file cap. Request bodies are also bounded by axum's 2 MiB default.
    pub max_bytes: usize,
}

/// Headless browser used to print HTML reports to PDF.
#[derive(Debug, Clone)]
pub struct PdfConfig {
    pub renderer_bin: String,
    pub timeout_secs: u64,
}

impl PdfConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ServerConfig {
    /// # Panics
    ///
    /// Panics on a missing required variable or a malformed value, so a bad
    /// deployment fails at startup.
    pub fn from_env() -> Self {
        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let jwt = JwtConfig {
            secret: required("JWT_SECRET"),
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", 60),
            refresh_token_expiry_days: env_or("JWT_REFRESH_EXPIRY_DAYS", 30),
        };

        let pdf = PdfConfig {
            renderer_bin: env_or("PDF_RENDERER_BIN", "chromium".to_string()),
            timeout_secs: env_or("PDF_RENDER_TIMEOUT_SECS", 30),
        };

        let uploads = UploadConfig {
            dir: env_or("UPLOAD_DIR", PathBuf::from("uploads")),
            max_bytes: env_or("UPLOAD_MAX_BYTES", 2 * 1024 * 1024),
        };

        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            database_url: required("DATABASE_URL"),
            jwt,
            pdf,
            uploads,
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value {raw:?}: {e:?}")),
        Err(_) => default,
    }
}

fn required(key: &str) -> String {
    let value = std::env::var(key).unwrap_or_else(|_| panic!("{key} must be set"));
    assert!(!value.trim().is_empty(), "{key} must not be empty");
    value
}
