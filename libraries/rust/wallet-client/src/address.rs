use std::{fmt, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAddressError {
    #[error("address is missing the 0x prefix: {0}")]
    MissingPrefix(String),

    #[error("address must be 40 hex digits, got {0}")]
    InvalidLength(usize),

    #[error("address contains a non-hex character: {0}")]
    InvalidDigit(String),
}

/// A 20-byte account or contract address
#[derive(SerializeDisplay, DeserializeFromStr, Default, Eq, PartialEq, Hash, Clone, Copy)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;

        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }

        Ok(())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| ParseAddressError::MissingPrefix(s.to_owned()))?;

        if digits.len() != 40 {
            return Err(ParseAddressError::InvalidLength(digits.len()));
        }

        let mut bytes = [0u8; 20];

        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = digits
                .get(i * 2..i * 2 + 2)
                .ok_or_else(|| ParseAddressError::InvalidDigit(s.to_owned()))?;

            *byte = u8::from_str_radix(pair, 16)
                .map_err(|_| ParseAddressError::InvalidDigit(s.to_owned()))?;
        }

        Ok(Address(bytes))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

/// The hash identifying a transaction once it has been accepted by the network
///
/// Kept as the string the provider returned, since it is only ever displayed or
/// used to build explorer links.
#[derive(SerializeDisplay, DeserializeFromStr, Debug, Eq, PartialEq, Hash, Clone)]
pub struct TransactionHash(String);

impl TransactionHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TransactionHash {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl From<&str> for TransactionHash {
    fn from(hash: &str) -> Self {
        Self::new(hash)
    }
}
