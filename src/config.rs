use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

use crate::errors::ServerError;

pub const DEFAULT_CONFIG_PATH: &str = "cheema.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub agency: AgencyConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            workers: default_workers(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_workers() -> usize {
    8
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    #[serde(default = "default_schema_path")]
    pub schema: String,
    /// Emails, SMS and inquiries older than this many days are pruned at startup.
    /// `0` disables the startup cleanup.
    #[serde(default = "default_cleanup_days")]
    pub cleanup_days: i64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            schema: default_schema_path(),
            cleanup_days: default_cleanup_days(),
        }
    }
}

fn default_cleanup_days() -> i64 {
    30
}

fn default_db_path() -> String {
    "cheema.sqlite3".to_string()
}

fn default_schema_path() -> String {
    "sql/schema.sql".to_string()
}

/// The admin gate is a single shared secret compared as plain text.
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    #[serde(default = "default_admin_password")]
    pub password: String,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password: default_admin_password(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

fn default_admin_password() -> String {
    "cheema2024admin".to_string()
}

fn default_session_ttl() -> i64 {
    60 * 60 * 24 * 7
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgencyConfig {
    #[serde(default = "default_agency_name")]
    pub name: String,
    #[serde(default = "default_agent_name")]
    pub agent_name: String,
    #[serde(default = "default_notify_email")]
    pub notify_email: String,
    #[serde(default = "default_agency_numbers")]
    pub whatsapp_numbers: Vec<String>,
    #[serde(default = "default_agency_numbers")]
    pub phone_numbers: Vec<String>,
}

impl Default for AgencyConfig {
    fn default() -> Self {
        Self {
            name: default_agency_name(),
            agent_name: default_agent_name(),
            notify_email: default_notify_email(),
            whatsapp_numbers: default_agency_numbers(),
            phone_numbers: default_agency_numbers(),
        }
    }
}

fn default_agency_name() -> String {
    "CHEEMA PROPERTIES".to_string()
}

fn default_agent_name() -> String {
    "Balvir Cheema".to_string()
}

fn default_notify_email() -> String {
    "balvircheema2016@gmail.com".to_string()
}

fn default_agency_numbers() -> Vec<String> {
    vec!["+91 9056330000".to_string(), "+91 9056361000".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    #[serde(default)]
    pub brevo_api_key: Option<String>,
    #[serde(default = "default_notify_email")]
    pub sender_email: String,
    #[serde(default = "default_agency_name")]
    pub sender_name: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            brevo_api_key: None,
            sender_email: default_notify_email(),
            sender_name: default_agency_name(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub measurement_id: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
}

/// Zone used for the business-hours and weekday bonuses.
/// `None` means the process's local zone.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScoringConfig {
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|e| {
            ServerError::ConfigError(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ServerError> {
        toml::from_str(raw).map_err(|e| ServerError::ConfigError(format!("invalid config: {e}")))
    }

    /// Resolve the config path from `CHEEMA_CONFIG`, load it, then apply env overrides.
    pub fn from_env() -> Result<Self, ServerError> {
        let path = env::var("CHEEMA_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = Self::load(Path::new(&path))?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(bind) = env::var("CHEEMA_BIND") {
            self.server.bind = bind;
        }
        if let Ok(path) = env::var("CHEEMA_DB_PATH") {
            self.database.path = path;
        }
        if let Ok(password) = env::var("CHEEMA_ADMIN_PASSWORD") {
            self.admin.password = password;
        }
        if let Ok(key) = env::var("CHEEMA_BREVO_API_KEY") {
            if !key.trim().is_empty() {
                self.mail.brevo_api_key = Some(key);
            }
        }
    }
}
