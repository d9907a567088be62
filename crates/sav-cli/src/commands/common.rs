use crate::gateway::{HttpLedger, HttpSubmitter};
use sav_core::client_config::{ClientConfig, DEFAULT_RPC_URL};
use sav_core::{format_units, parse_units, Address, U256, UNIT_DECIMALS};
use sav_sdk::{VGroupCoordinator, VoteCoordinator, WithdrawalCoordinator};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "config.toml";

/// Decimal places shown for token amounts.
pub const DISPLAY_DECIMALS: usize = 6;

/// Command-line values that take precedence over env and the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub rpc: Option<String>,
    pub pool: Option<String>,
    pub from: Option<String>,
    pub log_level: Option<String>,
}

pub fn config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE)
}

pub fn parse_address(label: &str, value: &str) -> Result<Address, Box<dyn std::error::Error>> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|e| format!("Invalid {} address '{}': {}", label, value, e).into())
}

/// Token amount ("1.5") to base units.
pub fn parse_amount(value: &str) -> Result<U256, Box<dyn std::error::Error>> {
    parse_units(value, UNIT_DECIMALS).map_err(|e| format!("Invalid amount '{}': {}", value, e).into())
}

pub fn fmt_amount(value: U256) -> String {
    format_units(value, UNIT_DECIMALS, DISPLAY_DECIMALS)
}

pub fn now_secs() -> Result<u64, Box<dyn std::error::Error>> {
    Ok(std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs())
}

/// Flags > env (`SAV_POOL_ADDRESS` & co.) > `<config_dir>/config.toml` > defaults.
pub fn resolve_config(
    overrides: &Overrides,
    config_dir: &Path,
) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let path = config_path(config_dir);
    let mut config = if std::env::var_os("SAV_POOL_ADDRESS").is_some() {
        ClientConfig::load_from_env()?
    } else if path.exists() {
        log::debug!("Loading config from {}", path.display());
        ClientConfig::load_from_file(&path)?
    } else {
        let pool = overrides.pool.as_deref().ok_or(
            "Pool address not configured: pass --pool, set SAV_POOL_ADDRESS or run `sav-cli config init`",
        )?;
        ClientConfig::new(DEFAULT_RPC_URL, parse_address("pool", pool)?)
    };

    if let Some(rpc) = &overrides.rpc {
        config.rpc_url = rpc.clone();
    }
    if let Some(pool) = &overrides.pool {
        config.pool_address = parse_address("pool", pool)?;
    }
    if let Some(from) = &overrides.from {
        config.from_address = Some(parse_address("from", from)?);
    }
    if let Some(level) = &overrides.log_level {
        config.log_level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Resolved config plus the gateway clients every command talks through.
pub struct Context {
    pub config: ClientConfig,
    pub ledger: HttpLedger,
    pub submitter: HttpSubmitter,
}

impl Context {
    pub fn new(config: ClientConfig) -> Self {
        let ledger = HttpLedger::new(&config.rpc_url);
        let submitter = HttpSubmitter::new(
            &config.rpc_url,
            config.from_address,
            Duration::from_secs(config.confirm_timeout_secs),
            Duration::from_millis(config.confirm_poll_ms),
        );
        Self {
            config,
            ledger,
            submitter,
        }
    }

    pub fn withdrawals(&self) -> WithdrawalCoordinator<'_, HttpLedger, HttpSubmitter> {
        WithdrawalCoordinator::new(&self.ledger, &self.submitter, self.config.pool_address)
            .strict_single_group(self.config.strict_single_group)
    }

    pub async fn voter(
        &self,
    ) -> Result<VoteCoordinator<'_, HttpLedger, HttpSubmitter>, Box<dyn std::error::Error>> {
        Ok(VoteCoordinator::connect(&self.ledger, &self.submitter, self.config.pool_address).await?)
    }

    pub fn vgroup(&self, vgroup: Address) -> VGroupCoordinator<'_, HttpLedger, HttpSubmitter> {
        VGroupCoordinator::new(&self.ledger, &self.submitter, vgroup)
    }

    /// The account a command acts for: `explicit`, else the configured sender.
    pub fn account(&self, explicit: Option<&str>) -> Result<Address, Box<dyn std::error::Error>> {
        match explicit {
            Some(a) => parse_address("account", a),
            None => self
                .config
                .from_address
                .ok_or_else(|| "No account: pass --from or set from_address in the config".into()),
        }
    }
}
