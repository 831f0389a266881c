use std::future::Future;

use futures::future::{self, Either};
use futures_timer::Delay;
use parking_lot::Mutex;

use ticketwave_wallet_client::ProviderError;

use crate::{
    config::TicketwaveConfig,
    state::{PurchaseAttempt, PurchaseError, WalletSession, WalletStep},
};

/// Everything the controller tracks between wallet requests
#[derive(Debug, Default, Clone)]
pub(crate) struct FlowState {
    pub attempt: PurchaseAttempt,
    pub session: WalletSession,
    pub ticket_price: Option<u128>,
    pub price_error: Option<PurchaseError>,
}

/// Central object for the purchase flow, holding the wallet handle, the configuration
/// and the observable flow state.
///
/// The state lock is only ever taken between wallet requests, never across one.
pub(crate) struct ClientState<W> {
    pub(crate) wallet: Option<W>,
    pub(crate) config: TicketwaveConfig,
    flow: Mutex<FlowState>,
}

impl<W> ClientState<W> {
    pub fn new(wallet: Option<W>, config: TicketwaveConfig) -> Self {
        Self {
            wallet,
            config,
            flow: Mutex::new(FlowState::default()),
        }
    }

    pub fn snapshot(&self) -> FlowState {
        self.flow.lock().clone()
    }

    pub fn update<T>(&self, f: impl FnOnce(&mut FlowState) -> T) -> T {
        f(&mut self.flow.lock())
    }

    /// Make one request to the wallet, applying the configured prompt timeout to
    /// steps that can be abandoned
    ///
    /// The outer error is a timeout, the inner one is whatever the wallet reported.
    pub async fn request<T>(
        &self,
        step: WalletStep,
        request: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<Result<T, ProviderError>, PurchaseError> {
        log::debug!("wallet request: {step}");

        let limit = self
            .config
            .prompt_timeout()
            .filter(|_| step.can_time_out());

        let result = match limit {
            None => request.await,
            Some(limit) => {
                futures::pin_mut!(request);

                match future::select(request, Delay::new(limit)).await {
                    Either::Left((result, _)) => result,
                    Either::Right(_) => {
                        log::warn!("{step} got no answer within {limit:?}");
                        return Err(PurchaseError::timeout(step, limit));
                    }
                }
            }
        };

        if let Err(e) = &result {
            log::warn!("{step} failed: {e}");
        }

        Ok(result)
    }

    /// Make one request to the wallet, mapping any failure into a purchase error
    pub async fn step<T>(
        &self,
        step: WalletStep,
        request: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, PurchaseError> {
        self.request(step, request)
            .await?
            .map_err(|e| PurchaseError::from_provider(step, &e))
    }
}
