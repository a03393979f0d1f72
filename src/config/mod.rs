use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub portal: PortalConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
    /// Upper bound for the user record kept with a session. Logins fall
    /// back to smaller snapshots when the full record does not fit.
    pub session_snapshot_limit_bytes: usize,
    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub max_document_bytes: usize,
    pub max_receipt_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: 5 * 1024 * 1024,
            max_receipt_bytes: 2 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PortalMode {
    #[default]
    Local,
    Remote,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PortalConfig {
    pub mode: PortalMode,
    pub remote_base_url: String,
    pub poll_interval_ms: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            mode: PortalMode::Local,
            remote_base_url: "http://127.0.0.1:8080".to_string(),
            poll_interval_ms: 3000,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("database.url", "sqlite://memberhub.db")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("auth.session_snapshot_limit_bytes", 5 * 1024 * 1024)?
            .set_default("auth.secure_cookies", false)?
            .set_default("uploads.max_document_bytes", 5 * 1024 * 1024)?
            .set_default("uploads.max_receipt_bytes", 2 * 1024 * 1024)?
            .set_default("portal.mode", "local")?
            .set_default("portal.remote_base_url", "http://127.0.0.1:8080")?
            .set_default("portal.poll_interval_ms", 3000)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with MEMBERHUB__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("MEMBERHUB").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://memberhub.db".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_duration_hours: 24,
                session_snapshot_limit_bytes: 5 * 1024 * 1024,
                secure_cookies: false,
            },
            uploads: UploadConfig::default(),
            portal: PortalConfig::default(),
        }
    }
}
