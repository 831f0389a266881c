use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kinds of ticket on sale
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TierId {
    Standard,
    Vip,
    Metaverse,
}

impl TierId {
    pub fn as_str(self) -> &'static str {
        match self {
            TierId::Standard => "standard",
            TierId::Vip => "vip",
            TierId::Metaverse => "metaverse",
        }
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown ticket tier: {0}")]
pub struct ParseTierError(pub String);

impl FromStr for TierId {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(TierId::Standard),
            "vip" => Ok(TierId::Vip),
            "metaverse" => Ok(TierId::Metaverse),
            _ => Err(ParseTierError(s.to_owned())),
        }
    }
}

/// A ticket option as presented to buyers
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TicketTier {
    pub id: TierId,
    pub display_name: String,
    pub description: String,

    /// Listed price, in cents
    pub price_in_minor_units: u64,

    #[serde(default)]
    pub is_popular: bool,
}

impl TicketTier {
    /// The listed price converted into the chain's native unit
    ///
    /// Returns `None` if the conversion overflows.
    pub fn native_price(&self, native_units_per_minor_unit: u128) -> Option<u128> {
        u128::from(self.price_in_minor_units).checked_mul(native_units_per_minor_unit)
    }
}

/// The tiers offered on the event page, in display order
pub fn default_tiers() -> Vec<TicketTier> {
    vec![
        TicketTier {
            id: TierId::Standard,
            display_name: "Standard Access".to_owned(),
            description: "General admission with NFT ticket".to_owned(),
            price_in_minor_units: 15_000,
            is_popular: false,
        },
        TicketTier {
            id: TierId::Vip,
            display_name: "VIP Access".to_owned(),
            description: "Premium seating, meet & greet, exclusive NFT".to_owned(),
            price_in_minor_units: 35_000,
            is_popular: true,
        },
        TicketTier {
            id: TierId::Metaverse,
            display_name: "Metaverse Access".to_owned(),
            description: "Virtual attendance with interactive features".to_owned(),
            price_in_minor_units: 7_500,
            is_popular: false,
        },
    ]
}
