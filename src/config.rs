//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub notifications: NotificationsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which record store to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Remote PocketBase server
    #[default]
    Pocketbase,
    /// In-process store, lost on exit
    Memory,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pocketbase" | "pb" => Ok(BackendKind::Pocketbase),
            "memory" | "mem" => Ok(BackendKind::Memory),
            other => Err(format!("unknown backend kind: {}", other)),
        }
    }
}

/// Record backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Service token sent with backend requests
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_backend_timeout")]
    pub request_timeout_ms: u64,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8090".to_string()
}

fn default_backend_timeout() -> u64 {
    10_000
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            url: default_backend_url(),
            token: None,
            request_timeout_ms: default_backend_timeout(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Loads fetched per list query
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Reject status changes outside the load lifecycle
    #[serde(default)]
    pub strict_transitions: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

fn default_request_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    crate::repository::DEFAULT_PAGE_SIZE
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout(),
            page_size: default_page_size(),
            strict_transitions: false,
        }
    }
}

impl ApiConfig {
    /// Socket address string to bind
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Route protection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Path prefixes that require a signed-in user
    #[serde(default = "default_protected_prefixes")]
    pub protected_prefixes: Vec<String>,

    /// Where unauthenticated requests are sent
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

fn default_protected_prefixes() -> Vec<String> {
    ["/dashboard", "/carrier-dashboard", "/clearing-agents", "/truck-owner"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

fn default_login_path() -> String {
    "/login".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            protected_prefixes: default_protected_prefixes(),
            login_path: default_login_path(),
        }
    }
}

/// Outbound email notification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_notify_enabled")]
    pub enabled: bool,

    #[serde(default = "default_load_endpoint")]
    pub load_endpoint: String,

    #[serde(default = "default_welcome_endpoint")]
    pub welcome_endpoint: String,

    /// Only notify carriers with verified accounts
    #[serde(default = "default_verified_only")]
    pub verified_only: bool,

    #[serde(default = "default_notify_timeout")]
    pub request_timeout_ms: u64,
}

fn default_notify_enabled() -> bool {
    true
}

fn default_load_endpoint() -> String {
    "http://localhost:3000/api/send-notification".to_string()
}

fn default_welcome_endpoint() -> String {
    "http://localhost:3000/api/send-welcome".to_string()
}

fn default_verified_only() -> bool {
    true
}

fn default_notify_timeout() -> u64 {
    5000
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_notify_enabled(),
            load_endpoint: default_load_endpoint(),
            welcome_endpoint: default_welcome_endpoint(),
            verified_only: default_verified_only(),
            request_timeout_ms: default_notify_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("loadboard").join("config.toml")),
            Some(PathBuf::from("/etc/loadboard/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; unparseable values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Backend overrides
        if let Some(url) = lookup("LOADBOARD_BACKEND_URL") {
            self.backend.url = url;
        }
        if let Some(kind) = lookup("LOADBOARD_BACKEND_KIND").and_then(|k| k.parse().ok()) {
            self.backend.kind = kind;
        }
        if let Some(token) = lookup("LOADBOARD_BACKEND_TOKEN") {
            self.backend.token = Some(token).filter(|t| !t.is_empty());
        }

        // API overrides
        if let Some(host) = lookup("LOADBOARD_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("LOADBOARD_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        // Notification overrides
        if let Some(enabled) = lookup("LOADBOARD_NOTIFY_ENABLED").and_then(|v| parse_flag(&v)) {
            self.notifications.enabled = enabled;
        }

        // Logging overrides
        if let Some(level) = lookup("LOADBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOADBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Loadboard Configuration
#
# Environment variables override these settings:
# - LOADBOARD_BACKEND_URL
# - LOADBOARD_BACKEND_KIND
# - LOADBOARD_BACKEND_TOKEN
# - LOADBOARD_API_HOST
# - LOADBOARD_API_PORT
# - LOADBOARD_NOTIFY_ENABLED
# - LOADBOARD_LOG_LEVEL
# - LOADBOARD_LOG_FORMAT

[backend]
# Record store: "pocketbase" or "memory" (local development only)
kind = "pocketbase"

# PocketBase server URL
url = "http://127.0.0.1:8090"

# Optional service token sent with every backend request
# token = ""

# Backend request timeout (ms)
request_timeout_ms = 10000

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8082

# Allowed CORS origins
cors_origins = ["http://localhost:3000", "http://127.0.0.1:3000"]

# Request timeout in seconds
request_timeout_secs = 30

# Loads fetched per list query; later pages are never shown
page_size = 50

# Reject status changes outside draft -> posted -> assigned -> in_transit -> delivered
strict_transitions = false

[auth]
# Paths that redirect to the login page without a valid session
protected_prefixes = ["/dashboard", "/carrier-dashboard", "/clearing-agents", "/truck-owner"]

# Login page
login_path = "/login"

[notifications]
# Send emails for new loads and sign-ups
enabled = true

# Email endpoints
load_endpoint = "http://localhost:3000/api/send-notification"
welcome_endpoint = "http://localhost:3000/api/send-welcome"

# Only notify verified carriers about new loads
verified_only = true

# Per-request timeout (ms)
request_timeout_ms = 5000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/loadboard/loadboard.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.kind, BackendKind::Pocketbase);
        assert_eq!(config.api.port, 8082);
        assert_eq!(config.api.page_size, 50);
        assert!(!config.api.strict_transitions);
        assert_eq!(config.auth.login_path, "/login");
        assert!(config.notifications.verified_only);
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.backend.url, "http://127.0.0.1:8090");
        assert_eq!(config.auth.protected_prefixes.len(), 4);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend]\nkind = \"memory\"\n\n[api]\nport = 9000").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.backend.kind, BackendKind::Memory);
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert!(config.notifications.enabled);
    }

    #[test]
    fn test_load_errors() {
        let missing = Config::load(Path::new("/nonexistent/loadboard.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nport = ").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("LOADBOARD_BACKEND_KIND", "memory"),
            ("LOADBOARD_API_PORT", "not-a-port"),
            ("LOADBOARD_NOTIFY_ENABLED", "false"),
            ("LOADBOARD_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.kind, BackendKind::Memory);
        assert_eq!(config.api.port, 8082);
        assert!(!config.notifications.enabled);
        assert_eq!(config.logging.format, "json");
    }
}
