/// Runtime configuration, read from the environment (and `.env` if present).

use std::path::PathBuf;

pub const APPOINTMENTS_FILE_VAR: &str = "SCANBOOK_APPOINTMENTS_FILE";
pub const CANCELLATIONS_FILE_VAR: &str = "SCANBOOK_CANCELLATIONS_FILE";
pub const ADMIN_PASSPHRASE_VAR: &str = "SCANBOOK_ADMIN_PASSPHRASE";

const DEFAULT_APPOINTMENTS_FILE: &str = "appointments.csv";
const DEFAULT_CANCELLATIONS_FILE: &str = "cancellation_requests.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicConfig {
    pub appointments_file: PathBuf,
    pub cancellations_file: PathBuf,
    pub admin_passphrase: Option<String>,
}

impl ClinicConfig {
    pub fn from_env() -> Self {
        if dotenv::dotenv().is_err() {
            tracing::debug!("No .env file loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        ClinicConfig {
            appointments_file: non_empty(APPOINTMENTS_FILE_VAR)
                .unwrap_or_else(|| DEFAULT_APPOINTMENTS_FILE.to_string())
                .into(),
            cancellations_file: non_empty(CANCELLATIONS_FILE_VAR)
                .unwrap_or_else(|| DEFAULT_CANCELLATIONS_FILE.to_string())
                .into(),
            admin_passphrase: non_empty(ADMIN_PASSPHRASE_VAR),
        }
    }
}
