//! Configuration management
//!
//! Configuration is resolved in the following order:
//! 1. Environment variables
//! 2. `shamba.toml` configuration file
//! 3. Default values
//!
//! `${VAR_NAME}` inside the config file is expanded from the environment.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// Farm-Intelligence API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelConfig {
    /// Base URL of the Farm-Intelligence backend
    #[serde(default = "default_intel_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IntelConfig {
    fn default() -> Self {
        Self {
            base_url: default_intel_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Farmer Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmerServiceConfig {
    /// Base URL of the external Farmer Service (None = demo roster only)
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FarmerServiceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Twilio credentials for the WhatsApp channel
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TwilioConfig {
    /// Twilio account SID
    #[serde(default)]
    pub account_sid: String,

    /// Twilio auth token
    #[serde(default)]
    pub auth_token: String,

    /// WhatsApp-enabled sender number (E.164)
    #[serde(default)]
    pub phone_number: String,
}

/// Webhook server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Listen port for the webhook server
    #[serde(default = "default_webhook_port")]
    pub port: u16,

    /// Allowed sender numbers; empty = open to all
    #[serde(default)]
    pub admin_numbers: Vec<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            port: default_webhook_port(),
            admin_numbers: Vec::new(),
        }
    }
}

/// Points ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Path to the SQLite ledger database
    #[serde(default = "default_ledger_db_path")]
    pub db_path: String,

    /// Maximum points a farmer can earn per day
    #[serde(default = "default_daily_cap")]
    pub daily_cap: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            db_path: default_ledger_db_path(),
            daily_cap: default_daily_cap(),
        }
    }
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle sessions are evicted after this many hours
    #[serde(default = "default_session_ttl_hours")]
    pub ttl_hours: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_session_ttl_hours(),
        }
    }
}

/// Main configuration for shamba-gateway
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Farm-Intelligence API
    #[serde(default)]
    pub intel: IntelConfig,

    /// External Farmer Service
    #[serde(default)]
    pub farmer_service: FarmerServiceConfig,

    /// Twilio credentials
    #[serde(default)]
    pub twilio: TwilioConfig,

    /// Webhook server
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Points ledger
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Session store
    #[serde(default)]
    pub session: SessionConfig,
}

fn default_intel_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_webhook_port() -> u16 {
    3001
}

fn default_ledger_db_path() -> String {
    "data/shamba-ledger.db".to_string()
}

fn default_daily_cap() -> u32 {
    500
}

fn default_session_ttl_hours() -> u64 {
    24
}

impl Config {
    /// Expand `${VAR_NAME}` references from the environment.
    ///
    /// Unknown variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // consume '{'

                let mut var_name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '}' {
                        chars.next(); // consume '}'
                        break;
                    }
                    var_name.push(chars.next().unwrap());
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file, then apply env overrides.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let toml_content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let expanded_content = Self::expand_env_vars(&toml_content);

        let mut config: Config = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from the default locations.
    ///
    /// Looks for `./shamba.toml`, otherwise falls back to environment
    /// variables over defaults.
    pub fn load() -> crate::Result<Self> {
        if Path::new("shamba.toml").exists() {
            return Self::from_toml_file("shamba.toml");
        }
        Self::from_env()
    }

    /// Build configuration from environment variables only.
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment variables always win over file values.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("API_BASE_URL") {
            if !url.is_empty() {
                self.intel.base_url = url;
            }
        }
        if let Ok(url) = std::env::var("FARMER_SERVICE_URL") {
            if !url.is_empty() {
                self.farmer_service.base_url = Some(url);
            }
        }
        if let Ok(sid) = std::env::var("TWILIO_ACCOUNT_SID") {
            self.twilio.account_sid = sid;
        }
        if let Ok(token) = std::env::var("TWILIO_AUTH_TOKEN") {
            self.twilio.auth_token = token;
        }
        if let Ok(number) = std::env::var("TWILIO_PHONE_NUMBER") {
            self.twilio.phone_number = number;
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                self.webhook.port = port;
            }
        }
        if let Ok(numbers) = std::env::var("ADMIN_NUMBERS") {
            self.webhook.admin_numbers = numbers
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(path) = std::env::var("LEDGER_DB_PATH") {
            if !path.is_empty() {
                self.ledger.db_path = path;
            }
        }
    }
}
