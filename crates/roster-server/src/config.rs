//! Server configuration loading from file and environment variables.

use roster_db::DbRuntimeSettings;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// The shared address book this server exposes.
    #[serde(default)]
    pub addressbook: AddressBookConfig,

    /// Local accounts created at startup if they do not exist yet.
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "roster_federation=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// The address book served to local users and federation peers.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressBookConfig {
    /// URI segment the address book is served under.
    #[serde(default = "default_addressbook_uri")]
    pub uri: String,

    /// Principal that owns the address book.
    #[serde(default = "default_principal_uri")]
    pub principal_uri: String,

    /// Display name used when the address book is first created.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl DatabaseConfig {
    /// Pool settings for [`roster_db::create_pool`], adjusted for `path`.
    pub fn runtime_settings(&self) -> DbRuntimeSettings {
        DbRuntimeSettings {
            busy_timeout_ms: self.busy_timeout_ms,
            pool_max_size: self.pool_max_size,
        }
        .for_path(&self.path)
    }
}

impl AddressBookConfig {
    fn check(&self) -> Result<(), ConfigError> {
        if self.uri.trim().is_empty() || self.uri.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "addressbook.uri must be a single path segment, got {:?}",
                self.uri
            )));
        }
        if !self.principal_uri.starts_with("principals/") {
            return Err(ConfigError::Invalid(format!(
                "addressbook.principal_uri must start with \"principals/\", got {:?}",
                self.principal_uri
            )));
        }
        Ok(())
    }
}

/// A local account to provision.
#[derive(Clone, Deserialize)]
pub struct UserConfig {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserConfig")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "roster.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_addressbook_uri() -> String {
    "system".to_string()
}

fn default_principal_uri() -> String {
    "principals/system/system".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AddressBookConfig {
    fn default() -> Self {
        Self {
            uri: default_addressbook_uri(),
            principal_uri: default_principal_uri(),
            display_name: None,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but cannot be served.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `ROSTER_HOST` overrides `server.host`
/// - `ROSTER_PORT` overrides `server.port`
/// - `ROSTER_DB_PATH` overrides `database.path`
/// - `ROSTER_DB_POOL_MAX_SIZE` overrides `database.pool_max_size`
/// - `ROSTER_LOG_LEVEL` overrides `logging.level`
/// - `ROSTER_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `ROSTER_ADDRESSBOOK_URI` overrides `addressbook.uri`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed,
/// or if the address book settings cannot be served.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    if let Ok(host) = std::env::var("ROSTER_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("ROSTER_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(db_path) = std::env::var("ROSTER_DB_PATH") {
        config.database.path = db_path;
    }
    if let Ok(size) = std::env::var("ROSTER_DB_POOL_MAX_SIZE") {
        if let Ok(parsed) = size.parse() {
            config.database.pool_max_size = parsed;
        }
    }
    if let Ok(level) = std::env::var("ROSTER_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("ROSTER_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Ok(uri) = std::env::var("ROSTER_ADDRESSBOOK_URI") {
        if !uri.trim().is_empty() {
            config.addressbook.uri = uri;
        }
    }

    config.addressbook.check()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8080

            [addressbook]
            display_name = "Company directory"

            [[users]]
            username = "alice"
            password = "pw"
            "#,
        )
        .unwrap();

        assert_eq!(config.users.len(), 1);
        assert_eq!(config.users[0].username, "alice");
        assert!(!format!("{:?}", config.users[0]).contains("pw"));

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, default_host());
        assert_eq!(config.database.path, "roster.db");
        assert_eq!(config.database.pool_max_size, 8);
        assert_eq!(config.addressbook.uri, "system");
        assert_eq!(config.addressbook.principal_uri, "principals/system/system");
        assert_eq!(
            config.addressbook.display_name.as_deref(),
            Some("Company directory")
        );
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn database_settings_follow_the_configured_path() {
        let mut database = DatabaseConfig {
            busy_timeout_ms: 250,
            pool_max_size: 4,
            ..DatabaseConfig::default()
        };
        let settings = database.runtime_settings();
        assert_eq!(settings.busy_timeout_ms, 250);
        assert_eq!(settings.pool_max_size, 4);

        database.path = roster_db::IN_MEMORY_PATH.to_string();
        assert_eq!(database.runtime_settings().pool_max_size, 1);
    }

    #[test]
    fn unservable_address_book_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "[addressbook]\nuri = \"a/b\"\n").unwrap();
        assert!(matches!(
            load_config(path.to_str()),
            Err(ConfigError::Invalid(_))
        ));

        std::fs::write(&path, "[addressbook]\nprincipal_uri = \"system\"\n").unwrap();
        assert!(matches!(
            load_config(path.to_str()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(matches!(
            load_config(path.to_str()),
            Err(ConfigError::Parse(_))
        ));
    }
}
