//! Ticket purchase flow for the Ticketwave event page
//!
//! A [`PurchaseController`] takes a ticket purchase from the click on "buy" through
//! wallet connection, network switching and the `mintTicket` contract call, recording
//! each step in an observable [`PurchaseAttempt`].

mod client;
pub mod catalog;
pub mod config;
pub mod purchase;
pub mod state;

pub use catalog::{ParseTierError, TicketTier, TierId};
pub use config::{ConfigError, FallbackPayment, TicketwaveConfig};
pub use purchase::PurchaseController;
pub use state::{
    PurchaseAttempt, PurchaseError, PurchaseErrorKind, PurchaseStatus, WalletSession, WalletStep,
};

pub use ticketwave_wallet_client as wallet;
