use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:7545";
pub const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONFIRM_POLL_MS: u64 = 1_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Env(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Config I/O error: {}", e),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Env(msg) => write!(f, "Config environment error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

fn default_confirm_timeout_secs() -> u64 {
    DEFAULT_CONFIRM_TIMEOUT_SECS
}

fn default_confirm_poll_ms() -> u64 {
    DEFAULT_CONFIRM_POLL_MS
}

fn default_strict_single_group() -> bool {
    true
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Client settings: where the ledger gateway lives, which pool to talk to,
/// and which account sends transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Savings pool contract
    pub pool_address: Address,
    /// Sending account; the gateway's node holds its key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_address: Option<Address>,
    #[serde(default = "default_confirm_timeout_secs")]
    pub confirm_timeout_secs: u64,
    #[serde(default = "default_confirm_poll_ms")]
    pub confirm_poll_ms: u64,
    /// Fail revocation planning when the pool votes for more than one group
    /// instead of falling back to the last voted group.
    #[serde(default = "default_strict_single_group")]
    pub strict_single_group: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ClientConfig {
    pub fn new(rpc_url: &str, pool_address: Address) -> Self {
        Self {
            rpc_url: rpc_url.to_string(),
            pool_address,
            from_address: None,
            confirm_timeout_secs: DEFAULT_CONFIRM_TIMEOUT_SECS,
            confirm_poll_ms: DEFAULT_CONFIRM_POLL_MS,
            strict_single_group: true,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    /// Load client config from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load client config from environment variables
    /// Useful for scripted/containerized runs
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let pool_address = std::env::var("SAV_POOL_ADDRESS")
            .map_err(|_| ConfigError::Env("SAV_POOL_ADDRESS not set".to_string()))?;
        let pool_address = parse_address("SAV_POOL_ADDRESS", &pool_address)?;

        let rpc_url = std::env::var("SAV_RPC_URL").unwrap_or_else(|_| default_rpc_url());

        let from_address = match std::env::var("SAV_FROM") {
            Ok(v) if !v.is_empty() => Some(parse_address("SAV_FROM", &v)?),
            _ => None,
        };

        let confirm_timeout_secs = parse_env_u64("SAV_CONFIRM_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_CONFIRM_TIMEOUT_SECS);
        let confirm_poll_ms =
            parse_env_u64("SAV_CONFIRM_POLL_MS")?.unwrap_or(DEFAULT_CONFIRM_POLL_MS);

        let strict_single_group = match std::env::var("SAV_STRICT_SINGLE_GROUP") {
            Ok(v) => v
                .parse::<bool>()
                .map_err(|_| ConfigError::Env(format!("SAV_STRICT_SINGLE_GROUP: {}", v)))?,
            Err(_) => true,
        };

        let log_level = std::env::var("SAV_LOG").unwrap_or_else(|_| default_log_level());

        Ok(Self {
            rpc_url,
            pool_address,
            from_address,
            confirm_timeout_secs,
            confirm_poll_ms,
            strict_single_group,
            log_level,
        })
    }

    /// Save client config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "rpc_url must be http(s): {}",
                self.rpc_url
            )));
        }
        if self.pool_address == Address::ZERO {
            return Err(ConfigError::Invalid(
                "pool_address cannot be the zero address".to_string(),
            ));
        }
        if self.from_address == Some(Address::ZERO) {
            return Err(ConfigError::Invalid(
                "from_address cannot be the zero address".to_string(),
            ));
        }
        if self.confirm_poll_ms == 0 {
            return Err(ConfigError::Invalid("confirm_poll_ms must be > 0".to_string()));
        }
        if self.confirm_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "confirm_timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_address(var: &str, value: &str) -> Result<Address, ConfigError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|e| ConfigError::Env(format!("{}: invalid address '{}': {}", var, value, e)))
}

fn parse_env_u64(var: &str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(var) {
        Ok(v) => v
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::Env(format!("{}: not a number: {}", var, v))),
        Err(_) => Ok(None),
    }
}
