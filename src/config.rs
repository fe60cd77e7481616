//! Configuration for the construction core
//!
//! Settings live in TOML. The core only ever sees already-validated funding
//! parameters; [`Config::validate`] is the gate between a parsed file and a
//! [`BuilderParams`](crate::builders::BuilderParams) instance.

use bitcoin::Network;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{config_error, BuilderResult};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub funding: FundingConfig,

    #[serde(default)]
    pub rpc: RpcConfig,
}

/// Funding parameters for every builder created from this configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingConfig {
    /// Network name: mainnet, testnet, signet, or regtest
    #[serde(default = "default_network")]
    pub network: String,

    /// Flat fee in satoshis
    #[serde(default = "default_fee")]
    pub fee: u64,

    /// Dust threshold in satoshis
    #[serde(default = "default_dust")]
    pub dust_threshold: u64,

    /// Target input amount in satoshis
    #[serde(default = "default_in_target")]
    pub in_target: u64,
}

impl Default for FundingConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            fee: default_fee(),
            dust_threshold: default_dust(),
            in_target: default_in_target(),
        }
    }
}

/// Node RPC endpoint settings, consumed by the wallet collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            user: String::new(),
            password: String::new(),
        }
    }
}

fn default_network() -> String {
    "testnet".to_string()
}

fn default_fee() -> u64 {
    crate::builders::DEFAULT_FEE
}

fn default_dust() -> u64 {
    crate::builders::DEFAULT_DUST
}

fn default_in_target() -> u64 {
    crate::builders::DEFAULT_IN_TARGET
}

fn default_host() -> String {
    "localhost:18332".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> BuilderResult<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the core relies on
    pub fn validate(&self) -> BuilderResult<()> {
        self.network()?;
        if self.funding.dust_threshold == 0 {
            return Err(config_error("dust threshold must be positive"));
        }
        if self.funding.in_target <= self.funding.fee {
            return Err(config_error(format!(
                "input target {} does not cover the fee {}",
                self.funding.in_target, self.funding.fee
            )));
        }
        Ok(())
    }

    /// The configured network
    pub fn network(&self) -> BuilderResult<Network> {
        match self.funding.network.as_str() {
            "mainnet" | "bitcoin" => Ok(Network::Bitcoin),
            "testnet" => Ok(Network::Testnet),
            "signet" => Ok(Network::Signet),
            "regtest" => Ok(Network::Regtest),
            other => Err(config_error(format!("unknown network: {}", other))),
        }
    }
}
