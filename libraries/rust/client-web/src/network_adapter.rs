use std::str::FromStr;

use async_trait::async_trait;
use js_sys::{Array, BigInt, Object, Reflect};
use wasm_bindgen::{prelude::*, JsCast};

use ticketwave_wallet_client::{
    Address, ChainDescriptor, ChainId, ProviderError, TicketContract, TransactionHash,
    WalletProvider, USER_REJECTED_CODE,
};

/// Code used by ethers.js for errors where the user declined to sign
const ETHERS_ACTION_REJECTED: &str = "ACTION_REJECTED";

#[wasm_bindgen]
extern "C" {
    /// A wallet provider injected into the page, such as `window.ethereum`
    #[derive(Clone)]
    pub type Eip1193Provider;

    #[wasm_bindgen(method, catch)]
    pub async fn request(this: &Eip1193Provider, args: JsValue) -> Result<JsValue, JsValue>;

    /// Page-side helper that encodes and sends calls to the ticket contract
    #[derive(Clone)]
    pub type TicketContractAdapter;

    #[wasm_bindgen(method, catch, js_name = ticketPrice)]
    pub async fn ticket_price(
        this: &TicketContractAdapter,
        contract: String,
    ) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = mintTicket)]
    pub async fn mint_ticket(
        this: &TicketContractAdapter,
        contract: String,
        recipient: String,
        value: String,
    ) -> Result<JsValue, JsValue>;
}

#[derive(Clone)]
pub struct JsWalletAdapter {
    provider: Eip1193Provider,
    contracts: TicketContractAdapter,
}

impl std::fmt::Debug for JsWalletAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsWalletAdapter").finish()
    }
}

impl JsWalletAdapter {
    pub fn new(provider: Eip1193Provider, contracts: TicketContractAdapter) -> Self {
        Self {
            provider,
            contracts,
        }
    }

    async fn rpc(&self, method: &str, params: Option<Array>) -> Result<JsValue, ProviderError> {
        let args = Object::new();
        js_reflect_set(&args, "method", &JsValue::from_str(method))?;

        if let Some(params) = params {
            js_reflect_set(&args, "params", &params)?;
        }

        self.provider
            .request(args.into())
            .await
            .map_err(provider_error)
    }
}

#[async_trait(?Send)]
impl WalletProvider for JsWalletAdapter {
    type Contract = JsTicketContract;

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let js_accounts = self.rpc("eth_requestAccounts", None).await?;
        let js_accounts = js_accounts
            .dyn_ref::<Array>()
            .ok_or_else(|| ProviderError::other("eth_requestAccounts did not return an array"))?;

        js_accounts
            .iter()
            .map(|value| {
                let string = value
                    .as_string()
                    .ok_or_else(|| ProviderError::other("account is not a string"))?;

                Address::from_str(&string).map_err(|e| ProviderError::other(e.to_string()))
            })
            .collect()
    }

    async fn chain_id(&self) -> Result<ChainId, ProviderError> {
        let js_chain_id = self.rpc("eth_chainId", None).await?;
        let Some(chain_id) = js_chain_id.as_string() else {
            return Err(ProviderError::other("eth_chainId returned non-string result"));
        };

        ChainId::from_str(&chain_id)
            .map_err(|_| ProviderError::other(format!("could not parse chain id: {chain_id}")))
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), ProviderError> {
        let param = Object::new();
        js_reflect_set(&param, "chainId", &JsValue::from_str(&chain_id.to_hex()))?;

        self.rpc("wallet_switchEthereumChain", Some(Array::of1(&param)))
            .await?;

        Ok(())
    }

    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<(), ProviderError> {
        let param = serde_wasm_bindgen::to_value(chain)
            .map_err(|e| ProviderError::other(format!("could not encode chain: {e}")))?;

        self.rpc("wallet_addEthereumChain", Some(Array::of1(&param)))
            .await?;

        Ok(())
    }

    fn contract(&self, address: &Address) -> Self::Contract {
        JsTicketContract {
            adapter: self.contracts.clone(),
            address: *address,
        }
    }
}

pub struct JsTicketContract {
    adapter: TicketContractAdapter,
    address: Address,
}

#[async_trait(?Send)]
impl TicketContract for JsTicketContract {
    async fn ticket_price(&self) -> Result<u128, ProviderError> {
        let js_price = self
            .adapter
            .ticket_price(self.address.to_string())
            .await
            .map_err(provider_error)?;

        js_to_u128(&js_price)
    }

    async fn mint_ticket(
        &self,
        recipient: &Address,
        value: u128,
    ) -> Result<TransactionHash, ProviderError> {
        let js_hash = self
            .adapter
            .mint_ticket(
                self.address.to_string(),
                recipient.to_string(),
                value.to_string(),
            )
            .await
            .map_err(provider_error)?;

        js_hash
            .as_string()
            .map(TransactionHash::new)
            .ok_or_else(|| ProviderError::other("mintTicket did not return a transaction hash"))
    }
}

/// Translate whatever the wallet threw into a provider error
///
/// Wallets throw plain `{ code, message }` objects, while ethers.js wraps them and
/// uses its own string codes, keeping the wallet's error under `error` or `info.error`.
fn provider_error(value: JsValue) -> ProviderError {
    let code = js_error_code(&value)
        .or_else(|| js_reflect_get(&value, "error").and_then(|e| js_error_code(&e)))
        .or_else(|| {
            js_reflect_get(&value, "info")
                .and_then(|info| js_reflect_get(&info, "error"))
                .and_then(|e| js_error_code(&e))
        });

    let message = js_reflect_get(&value, "message")
        .and_then(|m| m.as_string())
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"));

    ProviderError { code, message }
}

fn js_error_code(value: &JsValue) -> Option<i64> {
    let code = js_reflect_get(value, "code")?;

    if let Some(number) = code.as_f64() {
        Some(number as i64)
    } else if code.as_string().as_deref() == Some(ETHERS_ACTION_REJECTED) {
        Some(USER_REJECTED_CODE)
    } else {
        None
    }
}

fn js_to_u128(value: &JsValue) -> Result<u128, ProviderError> {
    let text = if value.is_bigint() {
        let integer = value
            .clone()
            .dyn_into::<BigInt>()
            .map_err(|_| ProviderError::other("price is not a bigint"))?;

        String::from(
            integer
                .to_string(10)
                .map_err(|_| ProviderError::other("price bigint not printable"))?,
        )
    } else if let Some(string) = value.as_string() {
        string
    } else if let Some(number) = value.as_f64() {
        return Ok(number as u128);
    } else {
        return Err(ProviderError::other("price is not a number"));
    };

    text.parse()
        .map_err(|_| ProviderError::other(format!("could not parse price: {text}")))
}

fn js_reflect_get(obj: &JsValue, key: &str) -> Option<JsValue> {
    if !obj.is_object() {
        return None;
    }

    Reflect::get(obj, &JsValue::from_str(key))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

fn js_reflect_set(obj: &Object, key: &str, value: &JsValue) -> Result<(), ProviderError> {
    Reflect::set(obj, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|_| ProviderError::other(format!("could not set '{key}' on request")))
}
