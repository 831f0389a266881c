use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// Identifier for an EVM chain
///
/// Displayed and serialized in the `0x`-prefixed hex form wallets expect.
#[derive(SerializeDisplay, DeserializeFromStr, Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const MAINNET: ChainId = ChainId(1);
    pub const POLYGON: ChainId = ChainId(137);
    pub const SEPOLIA: ChainId = ChainId(11_155_111);
    pub const POLYGON_AMOY: ChainId = ChainId(80_002);

    pub fn to_hex(self) -> String {
        format!("{:#x}", self.0)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = ParseIntError;

    /// Accepts either hex with a `0x` prefix, or plain decimal
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).map(ChainId),
            None => s.parse().map(ChainId),
        }
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        ChainId(id)
    }
}

/// Description for the kind of network a wallet may be connected to
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    /// A public network where value is real
    Mainnet,

    /// A public network for development testing
    Testnet,

    /// Anything else, such as a local development node
    Unknown,
}

impl NetworkKind {
    /// Determine the network type based on its chain id
    pub fn from_chain_id(chain_id: ChainId) -> Self {
        match chain_id {
            ChainId::MAINNET | ChainId::POLYGON => NetworkKind::Mainnet,
            ChainId::SEPOLIA | ChainId::POLYGON_AMOY => NetworkKind::Testnet,
            _ => NetworkKind::Unknown,
        }
    }
}

/// The currency used to pay fees on a chain
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Everything a wallet needs to register a chain
///
/// Serializes to the parameter shape of `wallet_addEthereumChain`.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    pub chain_id: ChainId,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,

    #[serde(default)]
    pub block_explorer_urls: Vec<String>,
}

impl ChainDescriptor {
    /// The Sepolia test network
    pub fn sepolia() -> Self {
        Self {
            chain_id: ChainId::SEPOLIA,
            chain_name: "Sepolia".to_owned(),
            native_currency: NativeCurrency {
                name: "Sepolia Ether".to_owned(),
                symbol: "ETH".to_owned(),
                decimals: 18,
            },
            rpc_urls: vec!["https://rpc.sepolia.org".to_owned()],
            block_explorer_urls: vec!["https://sepolia.etherscan.io".to_owned()],
        }
    }

    /// The Polygon Amoy test network
    pub fn polygon_amoy() -> Self {
        Self {
            chain_id: ChainId::POLYGON_AMOY,
            chain_name: "Polygon Amoy".to_owned(),
            native_currency: NativeCurrency {
                name: "POL".to_owned(),
                symbol: "POL".to_owned(),
                decimals: 18,
            },
            rpc_urls: vec!["https://rpc-amoy.polygon.technology".to_owned()],
            block_explorer_urls: vec!["https://amoy.polygonscan.com".to_owned()],
        }
    }

    pub fn network_kind(&self) -> NetworkKind {
        NetworkKind::from_chain_id(self.chain_id)
    }

    /// The first listed block explorer, if any
    pub fn explorer_url(&self) -> Option<&str> {
        self.block_explorer_urls.first().map(String::as_str)
    }
}
