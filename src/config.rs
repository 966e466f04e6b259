//! Settings loaded from the environment (optionally via a `.env` file)

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::dispatcher::{BASE_FEE, DEFAULT_TIMEOUT};

pub const ENV_NETWORK: &str = "GATEWAY_NETWORK";
pub const ENV_RPC_URL: &str = "GATEWAY_RPC_URL";
pub const ENV_PASSPHRASE: &str = "GATEWAY_NETWORK_PASSPHRASE";
pub const ENV_SECRET_KEY: &str = "GATEWAY_SECRET_KEY";
pub const ENV_GATEWAY_CONTRACT: &str = "GATEWAY_CONTRACT_ID";
pub const ENV_TOKEN_CONTRACT: &str = "TOKEN_CONTRACT_ID";
pub const ENV_BASE_FEE: &str = "GATEWAY_BASE_FEE";
pub const ENV_TIMEOUT: &str = "GATEWAY_TX_TIMEOUT_SECS";
pub const ENV_PREFLIGHT: &str = "GATEWAY_PREFLIGHT";
pub const ENV_RUN_DEMO: &str = "GATEWAY_RUN_DEMO";
pub const ENV_DEMO_MERCHANT: &str = "GATEWAY_DEMO_MERCHANT";
pub const ENV_DEMO_SUBSCRIBER: &str = "GATEWAY_DEMO_SUBSCRIBER";

/// Known networks with their passphrase and public RPC endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkPreset {
    Futurenet,
    Testnet,
    Mainnet,
}

impl NetworkPreset {
    pub fn passphrase(self) -> &'static str {
        match self {
            NetworkPreset::Futurenet => "Test SDF Future Network ; October 2022",
            NetworkPreset::Testnet => "Test SDF Network ; September 2015",
            NetworkPreset::Mainnet => "Public Global Stellar Network ; September 2015",
        }
    }

    /// There is no SDF-operated mainnet RPC, so mainnet has no default endpoint
    pub fn rpc_url(self) -> Option<&'static str> {
        match self {
            NetworkPreset::Futurenet => Some("https://rpc-futurenet.stellar.org"),
            NetworkPreset::Testnet => Some("https://soroban-testnet.stellar.org"),
            NetworkPreset::Mainnet => None,
        }
    }
}

impl FromStr for NetworkPreset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "futurenet" => Ok(NetworkPreset::Futurenet),
            "testnet" => Ok(NetworkPreset::Testnet),
            "mainnet" | "public" => Ok(NetworkPreset::Mainnet),
            other => anyhow::bail!("Unknown network '{}'", other),
        }
    }
}

/// Secret seed that never shows up in logs
#[derive(Clone)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoSettings {
    pub merchant: String,
    pub subscriber: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub network: NetworkPreset,
    pub rpc_url: String,
    pub network_passphrase: String,
    pub secret_key: SecretKey,
    pub gateway_contract_id: String,
    pub token_contract_id: String,
    pub base_fee: u32,
    pub tx_timeout: Duration,
    pub preflight: bool,
    /// `None` leaves the demo sequence disabled
    pub demo: Option<DemoSettings>,
}

impl Settings {
    /// Load settings from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let require = |key: &str| get(key).with_context(|| format!("{} must be set", key));

        let network = match get(ENV_NETWORK) {
            Some(value) => value.parse()?,
            None => NetworkPreset::Futurenet,
        };

        let rpc_url = match get(ENV_RPC_URL) {
            Some(url) => url,
            None => network
                .rpc_url()
                .map(str::to_string)
                .with_context(|| format!("{} must be set for {:?}", ENV_RPC_URL, network))?,
        };

        let network_passphrase =
            get(ENV_PASSPHRASE).unwrap_or_else(|| network.passphrase().to_string());

        let base_fee = match get(ENV_BASE_FEE) {
            Some(value) => value
                .parse()
                .with_context(|| format!("Invalid {}: {}", ENV_BASE_FEE, value))?,
            None => BASE_FEE,
        };

        let tx_timeout = match get(ENV_TIMEOUT) {
            Some(value) => Duration::from_secs(
                value
                    .parse()
                    .with_context(|| format!("Invalid {}: {}", ENV_TIMEOUT, value))?,
            ),
            None => DEFAULT_TIMEOUT,
        };

        let preflight = parse_flag(ENV_PREFLIGHT, get(ENV_PREFLIGHT))?;

        let demo = if parse_flag(ENV_RUN_DEMO, get(ENV_RUN_DEMO))? {
            Some(DemoSettings {
                merchant: require(ENV_DEMO_MERCHANT)?,
                subscriber: require(ENV_DEMO_SUBSCRIBER)?,
            })
        } else {
            None
        };

        Ok(Self {
            network,
            rpc_url,
            network_passphrase,
            secret_key: SecretKey(require(ENV_SECRET_KEY)?),
            gateway_contract_id: require(ENV_GATEWAY_CONTRACT)?,
            token_contract_id: require(ENV_TOKEN_CONTRACT)?,
            base_fee,
            tx_timeout,
            preflight,
            demo,
        })
    }
}

fn parse_flag(key: &str, value: Option<String>) -> Result<bool> {
    let Some(value) = value else {
        return Ok(false);
    };

    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("Invalid {}: {}", key, value),
    }
}
