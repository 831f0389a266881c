use std::str::FromStr;

use thiserror::Error;
use wasm_bindgen::prelude::*;

use ticketwave_client::{
    ConfigError, ParseTierError, PurchaseController, TicketwaveConfig, TierId,
};

mod network_adapter;

pub use network_adapter::{Eip1193Provider, JsWalletAdapter, TicketContractAdapter};

/// Purchase flow handle for the event page
#[wasm_bindgen]
pub struct TicketwaveWebClient {
    controller: PurchaseController<JsWalletAdapter>,
}

#[wasm_bindgen]
impl TicketwaveWebClient {
    /// Create the client. `provider` is the injected wallet, which may be missing
    /// when the user has no wallet extension installed.
    #[wasm_bindgen(constructor)]
    pub fn new(
        provider: Option<Eip1193Provider>,
        contracts: TicketContractAdapter,
        config_json: &str,
    ) -> Result<TicketwaveWebClient, ClientError> {
        let config = TicketwaveConfig::from_json(config_json)?;
        let wallet = provider.map(|provider| JsWalletAdapter::new(provider, contracts));

        Ok(Self {
            controller: PurchaseController::new(wallet, config),
        })
    }

    #[wasm_bindgen(js_name = hasWallet)]
    pub fn has_wallet(&self) -> bool {
        self.controller.has_wallet()
    }

    pub fn status(&self) -> String {
        self.controller.status().to_string()
    }

    #[wasm_bindgen(js_name = transactionHash)]
    pub fn transaction_hash(&self) -> Option<String> {
        self.controller.transaction_hash().map(|hash| hash.to_string())
    }

    #[wasm_bindgen(js_name = errorMessage)]
    pub fn error_message(&self) -> Option<String> {
        self.controller.error_message()
    }

    #[wasm_bindgen(js_name = explorerLink)]
    pub fn explorer_link(&self) -> Option<String> {
        self.controller.explorer_link()
    }

    /// The full attempt, with status, hash, error and selected tier
    pub fn attempt(&self) -> Result<JsValue, ClientError> {
        Ok(serde_wasm_bindgen::to_value(&self.controller.attempt())?)
    }

    pub fn session(&self) -> Result<JsValue, ClientError> {
        Ok(serde_wasm_bindgen::to_value(&self.controller.session())?)
    }

    pub fn tiers(&self) -> Result<JsValue, ClientError> {
        Ok(serde_wasm_bindgen::to_value(self.controller.tiers())?)
    }

    #[wasm_bindgen(js_name = selectTier)]
    pub fn select_tier(&self, tier: &str) -> Result<(), ClientError> {
        self.controller.select_tier(TierId::from_str(tier)?);
        Ok(())
    }

    /// Native amount for a tier, as a decimal string
    #[wasm_bindgen(js_name = tierPrice)]
    pub fn tier_price(&self, tier: Option<String>) -> Result<String, ClientError> {
        let tier = tier.as_deref().map(TierId::from_str).transpose()?;

        self.controller
            .tier_price(tier)
            .map(|value| value.to_string())
            .map_err(|e| ClientError::from_message(&e.message))
    }

    /// Start a purchase. Resolves once the attempt has finished, with the outcome
    /// available from `status`, `transactionHash` and `errorMessage`.
    #[wasm_bindgen(js_name = submitPurchase)]
    pub async fn submit_purchase(&self, tier: Option<String>) -> Result<(), ClientError> {
        let tier = tier.as_deref().map(TierId::from_str).transpose()?;
        self.controller.submit_purchase(tier).await;

        Ok(())
    }

    #[wasm_bindgen(js_name = refreshTicketPrice)]
    pub async fn refresh_ticket_price(&self) -> Option<String> {
        self.controller
            .refresh_ticket_price()
            .await
            .map(|price| price.to_string())
    }

    #[wasm_bindgen(js_name = ticketPrice)]
    pub fn ticket_price(&self) -> Option<String> {
        self.controller.ticket_price().map(|price| price.to_string())
    }

    #[wasm_bindgen(js_name = priceError)]
    pub fn price_error(&self) -> Option<String> {
        self.controller.price_error().map(|e| e.message)
    }

    pub fn disconnect(&self) -> bool {
        self.controller.disconnect()
    }
}

#[derive(Error, Debug)]
pub(crate) enum WebError {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tier(#[from] ParseTierError),

    #[error("could not convert value for js: {0}")]
    Conversion(#[from] serde_wasm_bindgen::Error),
}

#[derive(Clone)]
pub struct ClientError {
    value: js_sys::Error,
}

impl ClientError {
    fn from_message(message: &str) -> Self {
        Self {
            value: js_sys::Error::new(message),
        }
    }
}

impl From<ClientError> for JsValue {
    fn from(this: ClientError) -> Self {
        this.value.into()
    }
}

impl From<WebError> for ClientError {
    fn from(err: WebError) -> Self {
        log::error!("{err}");
        Self::from_message(&err.to_string())
    }
}

impl From<ConfigError> for ClientError {
    fn from(err: ConfigError) -> Self {
        WebError::from(err).into()
    }
}

impl From<ParseTierError> for ClientError {
    fn from(err: ParseTierError) -> Self {
        WebError::from(err).into()
    }
}

impl From<serde_wasm_bindgen::Error> for ClientError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        WebError::from(err).into()
    }
}

#[wasm_bindgen(start, js_name = initModule)]
pub fn init_module() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).ok();
}
