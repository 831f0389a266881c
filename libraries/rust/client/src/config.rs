use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use thiserror::Error;

use ticketwave_wallet_client::{Address, ChainDescriptor};

use crate::catalog::{default_tiers, TicketTier, TierId};

/// Native units (wei) charged per cent of listed price
pub const DEFAULT_NATIVE_UNITS_PER_MINOR_UNIT: u128 = 4_000_000_000_000;

/// The small fixed value the event page historically sent when no tier was chosen
pub const NOMINAL_FALLBACK_AMOUNT: u128 = 100_000_000_000_000;

/// Description of errors that occur when reading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed while trying I/O on {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("failed while parsing json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed while parsing toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// What to pay when a purchase is started without choosing a tier
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum FallbackPayment {
    /// Pay the listed price of this tier
    DefaultTier(TierId),

    /// Pay a fixed amount in native units
    Fixed(#[serde_as(as = "DisplayFromStr")] u128),
}

impl Default for FallbackPayment {
    fn default() -> Self {
        FallbackPayment::DefaultTier(TierId::Standard)
    }
}

/// Configuration for the ticket purchase flow
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TicketwaveConfig {
    /// The chain the ticket contract lives on
    pub target_chain: ChainDescriptor,

    /// The ticket contract
    pub contract_address: Address,

    /// Base url for transaction links, defaults to the chain's first block explorer
    #[serde(default)]
    pub explorer_base_url: Option<String>,

    /// The tiers on sale, in display order
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TicketTier>,

    /// How many native units one cent of listed price costs
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_conversion")]
    pub native_units_per_minor_unit: u128,

    #[serde(default)]
    pub fallback_payment: FallbackPayment,

    /// Limit on how long any single wallet prompt may stay unanswered. The mint
    /// prompt is always waited on, since the wallet may still sign it.
    #[serde(default)]
    pub prompt_timeout_ms: Option<u64>,
}

fn default_conversion() -> u128 {
    DEFAULT_NATIVE_UNITS_PER_MINOR_UNIT
}

impl TicketwaveConfig {
    /// Config for a contract deployed on the Sepolia test network, with the standard tiers
    pub fn new(contract_address: Address) -> Self {
        Self {
            target_chain: ChainDescriptor::sepolia(),
            contract_address,
            explorer_base_url: None,
            tiers: default_tiers(),
            native_units_per_minor_unit: DEFAULT_NATIVE_UNITS_PER_MINOR_UNIT,
            fallback_payment: FallbackPayment::default(),
            prompt_timeout_ms: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;

        Ok(config)
    }

    /// Read a config file, choosing the format from the file extension
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|error| ConfigError::IoError {
            path: path.to_path_buf(),
            error,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&content),
            _ => Self::from_json(&content),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tiers.is_empty() {
            return Err(ConfigError::Invalid("no ticket tiers configured".to_owned()));
        }

        let mut seen = HashSet::new();
        for tier in &self.tiers {
            if !seen.insert(tier.id) {
                return Err(ConfigError::Invalid(format!("duplicate tier {}", tier.id)));
            }
        }

        if let FallbackPayment::DefaultTier(id) = self.fallback_payment {
            if self.tier(id).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "fallback tier {id} is not in the catalog"
                )));
            }
        }

        if self.explorer_base_url().is_none() {
            log::warn!(
                "no block explorer configured for chain {}",
                self.target_chain.chain_name
            );
        }

        Ok(())
    }

    pub fn tier(&self, id: TierId) -> Option<&TicketTier> {
        self.tiers.iter().find(|tier| tier.id == id)
    }

    pub fn prompt_timeout(&self) -> Option<Duration> {
        self.prompt_timeout_ms.map(Duration::from_millis)
    }

    pub fn explorer_base_url(&self) -> Option<&str> {
        self.explorer_base_url
            .as_deref()
            .or_else(|| self.target_chain.explorer_url())
            .map(|url| url.trim_end_matches('/'))
    }
}
