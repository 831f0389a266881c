use std::sync::Arc;

use ticketwave_wallet_client::{
    Address, NetworkKind, TicketContract, TransactionHash, WalletProvider,
};

use crate::{
    catalog::{TicketTier, TierId},
    client::ClientState,
    config::{FallbackPayment, TicketwaveConfig},
    state::{
        PurchaseAttempt, PurchaseError, PurchaseErrorKind, PurchaseStatus, WalletSession,
        WalletStep,
    },
};

/// Drives ticket purchases through the user's wallet
///
/// Only one purchase can be in flight at a time. Progress and results are observed
/// through [`PurchaseController::attempt`] and the accessors around it.
#[derive(Clone)]
pub struct PurchaseController<W> {
    client: Arc<ClientState<W>>,
}

/// What a new attempt needs once it has been accepted
struct AcceptedAttempt<W> {
    wallet: W,
    value: u128,
}

impl<W: WalletProvider> PurchaseController<W> {
    /// Create a controller for the given wallet, where `None` means no wallet
    /// could be found in the environment
    pub fn new(wallet: Option<W>, config: TicketwaveConfig) -> Self {
        if wallet.is_none() {
            log::info!("no wallet provider available, purchases are disabled");
        }

        Self {
            client: Arc::new(ClientState::new(wallet, config)),
        }
    }

    pub fn config(&self) -> &TicketwaveConfig {
        &self.client.config
    }

    pub fn tiers(&self) -> &[TicketTier] {
        &self.client.config.tiers
    }

    pub fn has_wallet(&self) -> bool {
        self.client.wallet.is_some()
    }

    /// The current (or most recent) purchase attempt
    pub fn attempt(&self) -> PurchaseAttempt {
        self.client.snapshot().attempt
    }

    pub fn status(&self) -> PurchaseStatus {
        self.client.update(|flow| flow.attempt.status)
    }

    pub fn transaction_hash(&self) -> Option<TransactionHash> {
        self.client.update(|flow| flow.attempt.transaction_hash.clone())
    }

    pub fn error_message(&self) -> Option<String> {
        self.client
            .update(|flow| flow.attempt.error_message().map(str::to_owned))
    }

    pub fn session(&self) -> WalletSession {
        self.client.snapshot().session
    }

    /// The block explorer page for the submitted transaction
    pub fn explorer_link(&self) -> Option<String> {
        let hash = self.transaction_hash()?;
        let base = self.client.config.explorer_base_url()?;

        Some(format!("{base}/tx/{hash}"))
    }

    /// The last ticket price read from the contract
    pub fn ticket_price(&self) -> Option<u128> {
        self.client.update(|flow| flow.ticket_price)
    }

    /// The reason the last price lookup failed, if it did
    pub fn price_error(&self) -> Option<PurchaseError> {
        self.client.update(|flow| flow.price_error.clone())
    }

    /// The native amount a purchase would pay, with `None` using the fallback payment
    pub fn tier_price(&self, tier: Option<TierId>) -> Result<u128, PurchaseError> {
        let config = &self.client.config;

        let tier = match (tier, config.fallback_payment) {
            (Some(id), _) | (None, FallbackPayment::DefaultTier(id)) => id,
            (None, FallbackPayment::Fixed(amount)) => return Ok(amount),
        };

        let listing = config.tier(tier).ok_or_else(|| {
            PurchaseError::new(
                PurchaseErrorKind::InvalidTier,
                format!("ticket tier {tier} is not on sale"),
            )
        })?;

        listing
            .native_price(config.native_units_per_minor_unit)
            .ok_or_else(|| {
                PurchaseError::new(
                    PurchaseErrorKind::AmountOverflow,
                    format!("price of ticket tier {tier} is too large"),
                )
            })
    }

    /// Record the tier the user has picked, without starting a purchase
    ///
    /// Ignored while a purchase is in flight.
    pub fn select_tier(&self, tier: TierId) {
        self.client.update(|flow| {
            if !flow.attempt.status.is_in_flight() {
                flow.attempt.selected_tier = Some(tier);
            }
        })
    }

    /// Forget the wallet session and reset to idle
    ///
    /// Returns false, doing nothing, if a purchase is in flight.
    pub fn disconnect(&self) -> bool {
        self.client.update(|flow| {
            if flow.attempt.status.is_in_flight() {
                log::warn!("cannot disconnect while a purchase is in flight");
                return false;
            }

            flow.session = WalletSession::default();
            flow.attempt = PurchaseAttempt {
                selected_tier: flow.attempt.selected_tier,
                ..Default::default()
            };

            true
        })
    }

    /// Buy a ticket of the given tier, minting it to the user's wallet account
    ///
    /// When `tier` is `None` the previously selected tier is used, or failing that the
    /// configured fallback payment. The outcome is recorded on the attempt rather than
    /// returned. Calling this while another purchase is in flight has no effect.
    pub async fn submit_purchase(&self, tier: Option<TierId>) {
        let Some(accepted) = self.begin_attempt(tier) else {
            return;
        };

        let outcome = self.run_purchase(&accepted.wallet, accepted.value).await;

        self.client.update(|flow| match outcome {
            Ok(hash) => {
                log::info!("ticket purchase submitted: {hash}");
                flow.attempt.status = PurchaseStatus::Submitted;
                flow.attempt.transaction_hash = Some(hash);
            }
            Err(e) => {
                log::error!("ticket purchase failed: {e}");
                flow.attempt.status = PurchaseStatus::Failed;
                flow.attempt.error = Some(e);
            }
        });
    }

    /// Check the preconditions for a new attempt and, if they hold, move it to
    /// `AwaitingWallet`.
    fn begin_attempt(&self, tier: Option<TierId>) -> Option<AcceptedAttempt<W>> {
        self.client.update(|flow| {
            if flow.attempt.status.is_in_flight() {
                log::warn!(
                    "ignoring purchase request, another is {}",
                    flow.attempt.status
                );
                return None;
            }

            let selected_tier = tier.or(flow.attempt.selected_tier);
            let idle_with = |error: PurchaseError| PurchaseAttempt {
                status: PurchaseStatus::Idle,
                transaction_hash: None,
                error: Some(error),
                selected_tier,
            };

            let Some(wallet) = self.client.wallet.clone() else {
                log::error!("cannot purchase without a wallet provider");
                flow.attempt = idle_with(PurchaseError::wallet_unavailable());
                return None;
            };

            let value = match self.tier_price(selected_tier) {
                Ok(value) => value,
                Err(e) => {
                    log::error!("cannot purchase: {e}");
                    flow.attempt = idle_with(e);
                    return None;
                }
            };

            log::info!(
                "starting purchase of {} ticket for {value}",
                selected_tier.map_or("fallback", TierId::as_str)
            );

            flow.session = WalletSession::default();
            flow.attempt = PurchaseAttempt {
                status: PurchaseStatus::AwaitingWallet,
                transaction_hash: None,
                error: None,
                selected_tier,
            };

            Some(AcceptedAttempt { wallet, value })
        })
    }

    async fn run_purchase(&self, wallet: &W, value: u128) -> Result<TransactionHash, PurchaseError> {
        let accounts = self
            .client
            .step(WalletStep::AccountAccess, wallet.request_accounts())
            .await?;

        let account = accounts.first().copied().ok_or_else(|| {
            PurchaseError::new(
                PurchaseErrorKind::WalletUnavailable,
                "wallet did not provide any accounts",
            )
        })?;
        log::debug!("wallet connected with account {account}");

        self.client.update(|flow| {
            flow.session = WalletSession {
                connected: true,
                account_address: Some(account),
                chain_id: None,
            };
        });

        let chain_id = self
            .client
            .step(WalletStep::ChainQuery, wallet.chain_id())
            .await?;

        self.client
            .update(|flow| flow.session.chain_id = Some(chain_id));

        let target = &self.client.config.target_chain;
        if chain_id != target.chain_id {
            log::info!(
                "wallet is on chain {chain_id} ({:?}), switching to {} ({:?})",
                NetworkKind::from_chain_id(chain_id),
                target.chain_id,
                target.network_kind()
            );

            self.set_status(PurchaseStatus::SwitchingNetwork);
            self.switch_network(wallet).await?;

            self.client
                .update(|flow| flow.session.chain_id = Some(target.chain_id));
        }

        self.set_status(PurchaseStatus::Submitting);
        self.mint(wallet, &account, value).await
    }

    /// Move the wallet onto the target chain, registering the chain with the wallet
    /// if it doesn't know it yet
    async fn switch_network(&self, wallet: &W) -> Result<(), PurchaseError> {
        let target = &self.client.config.target_chain;

        match self
            .client
            .request(WalletStep::ChainSwitch, wallet.switch_chain(target.chain_id))
            .await?
        {
            Ok(()) => return Ok(()),
            Err(e) if e.is_unrecognized_chain() => {
                log::info!("wallet does not know {}, adding it", target.chain_name);
            }
            Err(e) => return Err(PurchaseError::from_provider(WalletStep::ChainSwitch, &e)),
        }

        self.client
            .step(WalletStep::ChainAdd, wallet.add_chain(target))
            .await?;

        // only one retry after adding
        self.client
            .step(WalletStep::ChainSwitch, wallet.switch_chain(target.chain_id))
            .await
    }

    async fn mint(
        &self,
        wallet: &W,
        recipient: &Address,
        value: u128,
    ) -> Result<TransactionHash, PurchaseError> {
        let contract = wallet.contract(&self.client.config.contract_address);

        log::debug!(
            "minting ticket to {recipient} on {} with value {value}",
            self.client.config.contract_address
        );

        self.client
            .step(WalletStep::MintTicket, contract.mint_ticket(recipient, value))
            .await
    }

    /// Read the current ticket price from the contract, for display
    ///
    /// Failure is recorded separately from the purchase attempt and never blocks a
    /// purchase. Skipped while a purchase is in flight.
    pub async fn refresh_ticket_price(&self) -> Option<u128> {
        if self.status().is_in_flight() {
            log::debug!("skipping price refresh while a purchase is in flight");
            return self.ticket_price();
        }

        let result = match &self.client.wallet {
            None => Err(PurchaseError::new(
                PurchaseErrorKind::PriceFetchFailed,
                "no wallet found to read the ticket price through",
            )),
            Some(wallet) => {
                let contract = wallet.contract(&self.client.config.contract_address);

                self.client
                    .step(WalletStep::PriceRead, contract.ticket_price())
                    .await
                    .map_err(|e| PurchaseError::new(PurchaseErrorKind::PriceFetchFailed, e.message))
            }
        };

        self.client.update(|flow| match result {
            Ok(price) => {
                flow.ticket_price = Some(price);
                flow.price_error = None;
                Some(price)
            }
            Err(e) => {
                log::warn!("ticket price unavailable: {e}");
                flow.ticket_price = None;
                flow.price_error = Some(e);
                None
            }
        })
    }

    fn set_status(&self, status: PurchaseStatus) {
        log::debug!("purchase status: {status}");
        self.client.update(|flow| flow.attempt.status = status);
    }
}
