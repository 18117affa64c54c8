//! Runtime configuration, loaded once from the environment at startup.

use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    /// Directory holding the persisted catalog collections.
    pub data_dir: PathBuf,
    /// Directory uploaded images are written into; references are served
    /// as `/uploads/<name>` by whatever fronts this service.
    pub uploads_dir: PathBuf,
    pub admin_token: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        Self {
            port,
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()).into(),
            uploads_dir: env::var("UPLOADS_DIR")
                .unwrap_or_else(|_| "uploads".to_string())
                .into(),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "admin-token-123".to_string()),
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@boutique.local".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()),
        }
    }
}
