use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
};

use async_trait::async_trait;
use futures::channel::oneshot;
use parking_lot::Mutex;

use ticketwave_wallet_client::{
    Address, ChainDescriptor, ChainId, ProviderError, TicketContract, TransactionHash,
    WalletProvider,
};

/// The requests a wallet can receive
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub enum WalletMethod {
    RequestAccounts,
    ChainId,
    SwitchChain,
    AddChain,
    TicketPrice,
    MintTicket,
}

/// A request received by the simulated wallet
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum WalletCall {
    RequestAccounts,
    ChainId,
    SwitchChain(ChainId),
    AddChain(ChainId),
    TicketPrice {
        contract: Address,
    },
    MintTicket {
        contract: Address,
        recipient: Address,
        value: u128,
    },
}

impl WalletCall {
    pub fn method(&self) -> WalletMethod {
        match self {
            WalletCall::RequestAccounts => WalletMethod::RequestAccounts,
            WalletCall::ChainId => WalletMethod::ChainId,
            WalletCall::SwitchChain(_) => WalletMethod::SwitchChain,
            WalletCall::AddChain(_) => WalletMethod::AddChain,
            WalletCall::TicketPrice { .. } => WalletMethod::TicketPrice,
            WalletCall::MintTicket { .. } => WalletMethod::MintTicket,
        }
    }
}

/// Holds a wallet request open until released or dropped
pub struct PauseHandle(oneshot::Sender<()>);

impl PauseHandle {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

struct WalletState {
    accounts: Vec<Address>,
    current_chain: ChainId,
    known_chains: HashSet<ChainId>,
    ticket_price: u128,
    calls: Vec<WalletCall>,
    failures: HashMap<WalletMethod, VecDeque<ProviderError>>,
    pauses: HashMap<WalletMethod, oneshot::Receiver<()>>,
    mint_hashes: VecDeque<TransactionHash>,
    minted: u64,
}

/// An in-memory wallet that behaves like a browser wallet extension, and records
/// every request it receives
///
/// By default every request succeeds. Switching chains only succeeds for chains the
/// wallet knows, which starts out as only the chain it is connected to; adding a
/// chain makes it known without switching to it.
#[derive(Clone)]
pub struct SimulatedWallet {
    state: Arc<Mutex<WalletState>>,
}

impl SimulatedWallet {
    pub fn new(account: Address, chain_id: ChainId) -> Self {
        Self {
            state: Arc::new(Mutex::new(WalletState {
                accounts: vec![account],
                current_chain: chain_id,
                known_chains: HashSet::from([chain_id]),
                ticket_price: 0,
                calls: vec![],
                failures: HashMap::new(),
                pauses: HashMap::new(),
                mint_hashes: VecDeque::new(),
                minted: 0,
            })),
        }
    }

    /// Replace the accounts returned when access is requested
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.state.lock().accounts = accounts;
    }

    /// Make a chain known to the wallet, so it can be switched to
    pub fn add_known_chain(&self, chain_id: ChainId) {
        self.state.lock().known_chains.insert(chain_id);
    }

    pub fn set_ticket_price(&self, price: u128) {
        self.state.lock().ticket_price = price;
    }

    /// Queue an error to be returned by the next request of this kind
    pub fn fail_next(&self, method: WalletMethod, error: ProviderError) {
        self.state
            .lock()
            .failures
            .entry(method)
            .or_default()
            .push_back(error);
    }

    /// Queue the hash to return from the next successful mint
    pub fn push_mint_hash(&self, hash: impl Into<TransactionHash>) {
        self.state.lock().mint_hashes.push_back(hash.into());
    }

    /// Hold the next request of this kind open until the handle is released
    pub fn pause(&self, method: WalletMethod) -> PauseHandle {
        let (sender, receiver) = oneshot::channel();
        self.state.lock().pauses.insert(method, receiver);

        PauseHandle(sender)
    }

    /// Every request received so far, in order
    pub fn calls(&self) -> Vec<WalletCall> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self, method: WalletMethod) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.method() == method)
            .count()
    }

    /// The `(recipient, value)` of every mint request received
    pub fn mints(&self) -> Vec<(Address, u128)> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                WalletCall::MintTicket {
                    recipient, value, ..
                } => Some((*recipient, *value)),
                _ => None,
            })
            .collect()
    }

    pub fn current_chain(&self) -> ChainId {
        self.state.lock().current_chain
    }

    pub fn knows_chain(&self, chain_id: ChainId) -> bool {
        self.state.lock().known_chains.contains(&chain_id)
    }

    /// Record a request, then wait out any pause before returning the scripted failure
    async fn receive(&self, call: WalletCall) -> Result<(), ProviderError> {
        let method = call.method();
        log::trace!("simulated wallet received {call:?}");

        let pause = {
            let mut state = self.state.lock();
            state.calls.push(call);
            state.pauses.remove(&method)
        };

        if let Some(pause) = pause {
            let _ = pause.await;
        }

        let failure = self
            .state
            .lock()
            .failures
            .get_mut(&method)
            .and_then(VecDeque::pop_front);

        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for SimulatedWallet {
    type Contract = SimulatedContract;

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.receive(WalletCall::RequestAccounts).await?;

        Ok(self.state.lock().accounts.clone())
    }

    async fn chain_id(&self) -> Result<ChainId, ProviderError> {
        self.receive(WalletCall::ChainId).await?;

        Ok(self.state.lock().current_chain)
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), ProviderError> {
        self.receive(WalletCall::SwitchChain(chain_id)).await?;

        let mut state = self.state.lock();
        if !state.known_chains.contains(&chain_id) {
            return Err(ProviderError::unrecognized_chain(chain_id));
        }

        state.current_chain = chain_id;
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<(), ProviderError> {
        self.receive(WalletCall::AddChain(chain.chain_id)).await?;

        self.state.lock().known_chains.insert(chain.chain_id);
        Ok(())
    }

    fn contract(&self, address: &Address) -> Self::Contract {
        SimulatedContract {
            wallet: self.clone(),
            address: *address,
        }
    }
}

/// The ticket contract as seen through a [`SimulatedWallet`]
pub struct SimulatedContract {
    wallet: SimulatedWallet,
    address: Address,
}

#[async_trait(?Send)]
impl TicketContract for SimulatedContract {
    async fn ticket_price(&self) -> Result<u128, ProviderError> {
        self.wallet
            .receive(WalletCall::TicketPrice {
                contract: self.address,
            })
            .await?;

        Ok(self.wallet.state.lock().ticket_price)
    }

    async fn mint_ticket(
        &self,
        recipient: &Address,
        value: u128,
    ) -> Result<TransactionHash, ProviderError> {
        self.wallet
            .receive(WalletCall::MintTicket {
                contract: self.address,
                recipient: *recipient,
                value,
            })
            .await?;

        let mut state = self.wallet.state.lock();
        state.minted += 1;

        let hash = match state.mint_hashes.pop_front() {
            Some(hash) => hash,
            None => TransactionHash::new(format!("{:#066x}", state.minted)),
        };

        Ok(hash)
    }
}
