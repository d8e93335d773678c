//! Destination configuration, resolved once at startup.

use std::path::{Path, PathBuf};

/// Environment variable naming the destination spreadsheet.
pub const SPREADSHEET_ID_ENV: &str = "GOOGLE_SPREADSHEET_ID";
/// Environment variable naming a service-account key file.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
/// Key location relative to the home directory.
pub const DEFAULT_CREDENTIALS_PATH: &str = ".config/gspread/service_account.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub spreadsheet_id: String,
    pub credentials_path: PathBuf,
}

impl RemoteConfig {
    pub fn new(spreadsheet_id: impl Into<String>, credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            credentials_path: credentials_path.into(),
        }
    }

    /// Resolve the destination from flags and the environment.
    ///
    /// Returns `None` when no spreadsheet id is configured. `env` looks up
    /// environment variables; `home` is the user's home directory.
    pub fn resolve(
        spreadsheet_id: Option<&str>,
        credentials: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
        home: Option<&Path>,
    ) -> Option<Self> {
        let spreadsheet_id = spreadsheet_id
            .map(str::to_string)
            .or_else(|| env(SPREADSHEET_ID_ENV))
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())?;
        let credentials_path = credentials_path(credentials, &env, home);
        Some(Self {
            spreadsheet_id,
            credentials_path,
        })
    }

    /// [`RemoteConfig::resolve`] against the process environment.
    pub fn from_env(spreadsheet_id: Option<&str>, credentials: Option<&Path>) -> Option<Self> {
        Self::resolve(
            spreadsheet_id,
            credentials,
            |name| std::env::var(name).ok(),
            dirs::home_dir().as_deref(),
        )
    }
}

/// Key file precedence: explicit path, then `GOOGLE_APPLICATION_CREDENTIALS`,
/// then `~/.config/gspread/service_account.json`.
pub fn credentials_path(
    explicit: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
    home: Option<&Path>,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = env(CREDENTIALS_ENV).filter(|value| !value.trim().is_empty()) {
        return PathBuf::from(path);
    }
    home.unwrap_or_else(|| Path::new("."))
        .join(DEFAULT_CREDENTIALS_PATH)
}
