//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local use.

use std::env;
use std::path::PathBuf;

/// Display name of the dedicated training calendar.
pub const DEFAULT_CALENDAR_NAME: &str = "Marathon Training";

/// Marathon goal time shown on the dashboard.
pub const DEFAULT_GOAL_TIME: &str = "4:30";

/// OAuth client credentials for calendar access.
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Long-lived grant exchanged for access tokens on demand
    pub refresh_token: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Backend-as-a-service ---
    /// Firebase / GCP project hosting the run collection
    pub firebase_project_id: String,
    /// Web API key for the Identity Toolkit
    pub firebase_api_key: String,
    /// Account credentials used by the CLI
    pub email: Option<String>,
    pub password: Option<String>,

    // --- Calendar sync ---
    /// Present only when calendar sync is enabled
    pub calendar: Option<GoogleOAuthConfig>,
    pub calendar_name: String,

    // --- Dashboard ---
    /// Optional override for the embedded training plan
    pub training_plan_path: Option<PathBuf>,
    pub goal_time: String,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            firebase_project_id: "test-project".to_string(),
            firebase_api_key: "test-api-key".to_string(),
            email: Some("runner@example.com".to_string()),
            password: Some("hunter22".to_string()),
            calendar: None,
            calendar_name: DEFAULT_CALENDAR_NAME.to_string(),
            training_plan_path: None,
            goal_time: DEFAULT_GOAL_TIME.to_string(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let calendar = if parse_flag("CALENDAR_SYNC")? {
            Some(GoogleOAuthConfig {
                client_id: required("GOOGLE_CLIENT_ID")?,
                client_secret: required("GOOGLE_CLIENT_SECRET")?,
                refresh_token: required("GOOGLE_REFRESH_TOKEN")?,
            })
        } else {
            None
        };

        Ok(Self {
            firebase_project_id: required("FIREBASE_PROJECT_ID")?,
            firebase_api_key: required("FIREBASE_API_KEY")?,
            email: optional("MARATHON_EMAIL"),
            password: optional("MARATHON_PASSWORD"),
            calendar,
            calendar_name: optional("CALENDAR_NAME")
                .unwrap_or_else(|| DEFAULT_CALENDAR_NAME.to_string()),
            training_plan_path: optional("TRAINING_PLAN_PATH").map(PathBuf::from),
            goal_time: optional("GOAL_TIME").unwrap_or_else(|| DEFAULT_GOAL_TIME.to_string()),
        })
    }

    pub fn calendar_sync_enabled(&self) -> bool {
        self.calendar.is_some()
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(name: &'static str) -> Result<bool, ConfigError> {
    match optional(name).as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("0") | Some("false") | Some("no") | Some("off") => Ok(false),
        Some("1") | Some("true") | Some("yes") | Some("on") => Ok(true),
        Some(other) => Err(ConfigError::Invalid(name, other.to_string())),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
