use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ticketwave_wallet_client::{Address, ChainId, ProviderError, TransactionHash};

use crate::catalog::TierId;

/// Where a purchase attempt is in its lifecycle
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum PurchaseStatus {
    #[default]
    Idle,
    AwaitingWallet,
    SwitchingNetwork,
    Submitting,
    Submitted,
    Failed,
}

impl PurchaseStatus {
    /// True while the attempt is waiting on the wallet
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            PurchaseStatus::AwaitingWallet
                | PurchaseStatus::SwitchingNetwork
                | PurchaseStatus::Submitting
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PurchaseStatus::Submitted | PurchaseStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PurchaseStatus::Idle => "idle",
            PurchaseStatus::AwaitingWallet => "awaitingWallet",
            PurchaseStatus::SwitchingNetwork => "switchingNetwork",
            PurchaseStatus::Submitting => "submitting",
            PurchaseStatus::Submitted => "submitted",
            PurchaseStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Hash, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum PurchaseErrorKind {
    /// There is no wallet to talk to, or it won't provide an account
    WalletUnavailable,

    /// The user declined a wallet prompt
    UserRejected,

    /// The wallet could not be moved onto the target chain
    ChainSwitchFailed,

    /// The mint transaction failed after being handed to the wallet
    TransactionError,

    /// The ticket price could not be read. Never fails a purchase.
    PriceFetchFailed,

    /// The selected tier isn't in the catalog
    InvalidTier,

    /// The tier price doesn't fit in the native amount type
    AmountOverflow,

    /// A wallet prompt was not answered within the configured limit
    Timeout,
}

/// An error recorded on a purchase attempt, with the message to show the user
#[derive(Error, Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
#[error("{message}")]
pub struct PurchaseError {
    pub kind: PurchaseErrorKind,
    pub message: String,
}

impl PurchaseError {
    pub fn new(kind: PurchaseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn wallet_unavailable() -> Self {
        Self::new(
            PurchaseErrorKind::WalletUnavailable,
            "no wallet found, install a browser wallet extension to purchase tickets",
        )
    }

    pub fn timeout(step: WalletStep, limit: Duration) -> Self {
        Self::new(
            PurchaseErrorKind::Timeout,
            format!("{step} timed out after {}ms", limit.as_millis()),
        )
    }

    /// Map an error reported by the wallet during some step of the flow
    pub fn from_provider(step: WalletStep, error: &ProviderError) -> Self {
        if error.is_user_rejection() {
            return Self::new(
                PurchaseErrorKind::UserRejected,
                format!("{step} rejected by user"),
            );
        }

        let kind = match step {
            WalletStep::AccountAccess => PurchaseErrorKind::WalletUnavailable,
            WalletStep::ChainQuery | WalletStep::ChainSwitch | WalletStep::ChainAdd => {
                PurchaseErrorKind::ChainSwitchFailed
            }
            WalletStep::MintTicket => PurchaseErrorKind::TransactionError,
            WalletStep::PriceRead => PurchaseErrorKind::PriceFetchFailed,
        };

        Self::new(kind, format!("{step} failed: {}", error.message))
    }
}

/// The requests made to the wallet over the course of a purchase
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum WalletStep {
    AccountAccess,
    ChainQuery,
    ChainSwitch,
    ChainAdd,
    MintTicket,
    PriceRead,
}

impl WalletStep {
    /// False for the mint, which the wallet may still sign after we stop waiting
    pub fn can_time_out(self) -> bool {
        self != WalletStep::MintTicket
    }
}

impl fmt::Display for WalletStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WalletStep::AccountAccess => "account access",
            WalletStep::ChainQuery => "network check",
            WalletStep::ChainSwitch => "network switch",
            WalletStep::ChainAdd => "adding network",
            WalletStep::MintTicket => "transaction",
            WalletStep::PriceRead => "ticket price lookup",
        })
    }
}

/// The connection to the user's wallet, as established by the latest attempt
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WalletSession {
    pub connected: bool,
    pub account_address: Option<Address>,
    pub chain_id: Option<ChainId>,
}

/// A single user-initiated ticket purchase
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseAttempt {
    pub status: PurchaseStatus,
    pub transaction_hash: Option<TransactionHash>,
    pub error: Option<PurchaseError>,
    pub selected_tier: Option<TierId>,
}

impl PurchaseAttempt {
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    pub fn error_kind(&self) -> Option<PurchaseErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}
