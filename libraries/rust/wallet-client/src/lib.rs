use async_trait::async_trait;
use thiserror::Error;

pub mod address;
pub mod network;

pub use address::{Address, ParseAddressError, TransactionHash};
pub use network::{ChainDescriptor, ChainId, NativeCurrency, NetworkKind};

/// Provider error code used when the user declines a wallet prompt
pub const USER_REJECTED_CODE: i64 = 4001;

/// Provider error code used when a chain switch targets a chain the wallet doesn't know
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// A type that provides access to a user's wallet, and the network that wallet is
/// currently pointed at.
///
/// Every method maps to exactly one request made to the wallet. Implementations are
/// not required to be `Send`, as browser wallets are only reachable from the thread
/// running the page.
#[async_trait(?Send)]
pub trait WalletProvider: Clone + 'static {
    type Contract: TicketContract;

    /// Ask the wallet for access to the user's accounts
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// The chain the wallet is currently connected to
    async fn chain_id(&self) -> Result<ChainId, ProviderError>;

    /// Ask the wallet to switch over to a different chain
    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), ProviderError>;

    /// Ask the wallet to register a chain it doesn't yet know about
    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<(), ProviderError>;

    /// Get a client for the ticket contract at the given address, which sends
    /// transactions through this wallet
    fn contract(&self, address: &Address) -> Self::Contract;
}

/// The interface to the ticket contract
#[async_trait(?Send)]
pub trait TicketContract {
    /// Read the price of a ticket, in the native unit of the chain
    async fn ticket_price(&self) -> Result<u128, ProviderError>;

    /// Mint a ticket to the recipient, paying `value` in native units
    ///
    /// Once accepted by the network this is irreversible.
    async fn mint_ticket(
        &self,
        recipient: &Address,
        value: u128,
    ) -> Result<TransactionHash, ProviderError>;
}

/// An error returned by the wallet, or by the network through the wallet
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}{}", fmt_code(.code))]
pub struct ProviderError {
    /// The numeric code reported by the provider, if there was one
    pub code: Option<i64>,

    /// The message reported by the provider
    pub message: String,
}

fn fmt_code(code: &Option<i64>) -> String {
    match code {
        Some(code) => format!(" (code {code})"),
        None => String::new(),
    }
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    /// An error without any code attached
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn user_rejected() -> Self {
        Self::new(USER_REJECTED_CODE, "user rejected the request")
    }

    pub fn unrecognized_chain(chain_id: ChainId) -> Self {
        Self::new(
            UNRECOGNIZED_CHAIN_CODE,
            format!("unrecognized chain id {}", chain_id.to_hex()),
        )
    }

    /// True if the user declined the prompt that produced this error
    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(USER_REJECTED_CODE)
    }

    /// True if the wallet doesn't know the chain it was asked to switch to
    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == Some(UNRECOGNIZED_CHAIN_CODE)
    }
}
