// Configuration management

use crate::core::constants::defaults;
use crate::core::errors::GatewayError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Security policy for one gateway instance.
///
/// Immutable once the pipeline is built; shared read-only by every
/// request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Require a principal token on non-exempt paths
    pub auth_enable: bool,
    /// Verify `x-sign` on authenticated requests (needs `auth_enable`)
    pub sign_enable: bool,
    /// Decrypt marked requests and encrypt responses
    pub enc_enable: bool,
    /// Never authenticated, never response-encrypted
    pub login_prefix: String,
    /// Additional path prefixes that skip authentication
    pub exempt_prefixes: Vec<String>,
    /// Map bare transport errors (404/405/401) into messages
    pub translate_errors: bool,
    /// Largest body a stage or resolver will buffer
    pub body_limit_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            auth_enable: true,
            sign_enable: true,
            enc_enable: true,
            login_prefix: defaults::LOGIN_PREFIX.to_string(),
            exempt_prefixes: Vec::new(),
            translate_errors: true,
            body_limit_bytes: defaults::BODY_LIMIT_BYTES,
        }
    }
}

impl GatewayConfig {
    /// Whether `path` is under the login prefix
    pub fn is_login_path(&self, path: &str) -> bool {
        !self.login_prefix.is_empty() && path.starts_with(&self.login_prefix)
    }

    /// Whether `path` skips authentication
    pub fn is_exempt(&self, path: &str) -> bool {
        self.is_login_path(path)
            || self
                .exempt_prefixes
                .iter()
                .any(|prefix| !prefix.is_empty() && path.starts_with(prefix.as_str()))
    }

    /// Replace the exempt prefixes, dropping blank entries
    pub fn with_exempt_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exempt_prefixes = prefixes
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| !p.trim().is_empty())
            .collect();
        self
    }

    /// Check the flag combination and prefixes
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.sign_enable && !self.auth_enable {
            return Err(GatewayError::Configuration(
                "SIGN_ENABLE requires AUTH_ENABLE".to_string(),
            ));
        }
        if !self.login_prefix.starts_with('/') {
            return Err(GatewayError::Configuration(format!(
                "Invalid LOGIN_PREFIX '{}': must start with '/'",
                self.login_prefix
            )));
        }
        if let Some(bad) = self.exempt_prefixes.iter().find(|p| !p.starts_with('/')) {
            return Err(GatewayError::Configuration(format!(
                "Invalid EXEMPT_PREFIXES entry '{}': must start with '/'",
                bad
            )));
        }
        if self.body_limit_bytes == 0 {
            return Err(GatewayError::Configuration(
                "BODY_SIZE_LIMIT_BYTES must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Application configuration loaded from environment variables
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub bind_address: String,
    pub port: u16,

    // Security policy
    pub gateway: GatewayConfig,

    // Deployment-wide token key (16, 24 or 32 bytes)
    #[serde(skip_serializing)]
    pub token_key: String,

    // Logging configuration
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("port", &self.port)
            .field("gateway", &self.gateway)
            .field("token_key", &"<REDACTED>")
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Supports `.env` file loading in development (via dotenv crate).
    pub fn from_env() -> Result<Self, GatewayError> {
        #[cfg(not(test))]
        {
            dotenv::dotenv().ok();
        }

        let gateway = GatewayConfig {
            auth_enable: Self::parse_bool_or_default("AUTH_ENABLE", true)?,
            sign_enable: Self::parse_bool_or_default("SIGN_ENABLE", true)?,
            enc_enable: Self::parse_bool_or_default("ENC_ENABLE", true)?,
            login_prefix: Self::get_env_or_default("LOGIN_PREFIX", defaults::LOGIN_PREFIX)?,
            exempt_prefixes: Self::parse_list("EXEMPT_PREFIXES"),
            translate_errors: Self::parse_bool_or_default("TRANSLATE_ERRORS", true)?,
            body_limit_bytes: Self::parse_usize_or_default(
                "BODY_SIZE_LIMIT_BYTES",
                defaults::BODY_LIMIT_BYTES,
            )?,
        };

        let config = Self {
            bind_address: Self::get_env_or_default("BIND_ADDRESS", "0.0.0.0")?,
            port: Self::parse_port()?,
            gateway,
            token_key: Self::get_required("TOKEN_KEY")?,
            log_level: Self::get_env_or_default("LOG_LEVEL", "info")?,
            log_format: Self::get_env_or_default("LOG_FORMAT", "json")?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Get environment variable or return default value
    fn get_env_or_default(key: &str, default: &str) -> Result<String, GatewayError> {
        Ok(env::var(key).unwrap_or_else(|_| default.to_string()))
    }

    /// Get required environment variable
    fn get_required(key: &str) -> Result<String, GatewayError> {
        let value = env::var(key)
            .map_err(|_| GatewayError::Configuration(format!("{} not set", key)))?;

        if value.is_empty() {
            return Err(GatewayError::Configuration(format!("{} is empty", key)));
        }

        Ok(value)
    }

    /// Parse comma-separated list; blank entries are dropped
    fn parse_list(key: &str) -> Vec<String> {
        env::var(key)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parse boolean from environment variable or return default
    fn parse_bool_or_default(key: &str, default: bool) -> Result<bool, GatewayError> {
        match env::var(key) {
            Ok(value) => Self::parse_bool(&value).ok_or_else(|| {
                GatewayError::Configuration(format!(
                    "Invalid {} value '{}': expected true/false",
                    key, value
                ))
            }),
            _ => Ok(default),
        }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }

    /// Parse port from PORT environment variable
    fn parse_port() -> Result<u16, GatewayError> {
        let port_str = env::var("PORT").unwrap_or_else(|_| "8000".to_string());
        let port = port_str.parse::<u16>().map_err(|e| {
            GatewayError::Configuration(format!("Invalid PORT value '{}': {}", port_str, e))
        })?;

        if port == 0 {
            return Err(GatewayError::Configuration(
                "PORT must be between 1 and 65535".to_string(),
            ));
        }

        Ok(port)
    }

    /// Parse usize from environment variable or return default
    fn parse_usize_or_default(key: &str, default: usize) -> Result<usize, GatewayError> {
        match env::var(key) {
            Ok(value) => {
                let parsed = value.parse::<usize>().map_err(|e| {
                    GatewayError::Configuration(format!(
                        "Invalid {} value '{}': {}",
                        key, value, e
                    ))
                })?;

                if parsed == 0 {
                    return Err(GatewayError::Configuration(format!(
                        "{} must be greater than 0",
                        key
                    )));
                }

                Ok(parsed)
            }
            _ => Ok(default),
        }
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.port == 0 {
            return Err(GatewayError::Configuration(format!(
                "Invalid PORT value '{}': must be between 1 and 65535",
                self.port
            )));
        }

        Self::validate_token_key(&self.token_key)?;
        self.gateway.validate()?;
        Self::validate_log_level(&self.log_level)?;
        Self::validate_log_format(&self.log_format)?;

        Ok(())
    }

    /// Validate token key length
    fn validate_token_key(key: &str) -> Result<(), GatewayError> {
        match key.len() {
            16 | 24 | 32 => Ok(()),
            other => Err(GatewayError::Configuration(format!(
                "Invalid TOKEN_KEY: expected 16, 24 or 32 bytes, got {}",
                other
            ))),
        }
    }

    /// Validate log level
    fn validate_log_level(level: &str) -> Result<(), GatewayError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&level.to_lowercase().as_str()) {
            return Err(GatewayError::Configuration(format!(
                "Invalid LOG_LEVEL '{}': must be one of {}",
                level,
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }

    /// Validate log format
    fn validate_log_format(format: &str) -> Result<(), GatewayError> {
        if format != "json" && format != "text" {
            return Err(GatewayError::Configuration(format!(
                "Invalid LOG_FORMAT '{}': must be 'json' or 'text'",
                format
            )));
        }
        Ok(())
    }

    /// Security policy for the pipeline
    pub fn gateway(&self) -> GatewayConfig {
        self.gateway.clone()
    }

    /// Create a test configuration for unit tests
    ///
    /// Bypasses environment variable loading.
    pub fn test_config() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            gateway: GatewayConfig::default(),
            token_key: "1234567890123456".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}
