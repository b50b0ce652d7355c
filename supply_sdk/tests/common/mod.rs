// Shared fakes for the integration tests: an in-memory contract and a
// JSON-RPC node that serves it through the real ABI encoding.
#![allow(dead_code)]

use alloy_primitives::{hex, Address, TxHash, U256};
use alloy_sol_types::{SolCall, SolInterface};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use supply_sdk::contract::{ISupplyChain, ProductRecord, TrackingRecord};
use supply_sdk::provider::{Provider, METHOD_NOT_FOUND, USER_REJECTED};
use supply_sdk::units::parse_ether;
use supply_sdk::{Product, Result, SdkError, SupplyChainApi, TrackingEvent};

pub const CREATED_AT: u64 = 1_700_000_000;

pub fn address(n: u8) -> Address {
    Address::with_last_byte(n)
}

fn revert(message: &str) -> SdkError {
    SdkError::Rpc {
        code: -32000,
        message: message.to_string(),
    }
}

#[derive(Default)]
struct ChainState {
    products: Vec<Product>,
    histories: Vec<Vec<TrackingEvent>>,
    calls: Vec<String>,
    tx_counter: u8,
    failing_read: Option<u64>,
    failing_update: Option<String>,
    failing_transfer: Option<String>,
}

impl ChainState {
    fn index(&self, id: u64) -> Result<usize> {
        let index = (id as usize).wrapping_sub(1);
        if index < self.products.len() {
            Ok(index)
        } else {
            Err(revert("revert Product does not exist"))
        }
    }

    fn next_tx(&mut self) -> TxHash {
        self.tx_counter += 1;
        TxHash::with_last_byte(self.tx_counter)
    }
}

/// In-memory SupplyChain contract
#[derive(Default)]
pub struct FakeChain {
    state: Mutex<ChainState>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an available, unverified product with the given history
    pub fn add_product(&self, manufacturer: Address, name: &str, price_eth: &str, statuses: &[&str]) -> u64 {
        let mut state = self.state.lock().unwrap();
        let id = state.products.len() as u64 + 1;
        state.products.push(Product {
            id,
            name: name.to_string(),
            description: format!("{} description", name),
            price: parse_ether(price_eth).unwrap(),
            manufacturer,
            current_owner: manufacturer,
            timestamp: CREATED_AT + id,
            is_available: true,
            is_verified: false,
            verifiers: Vec::new(),
        });
        state.histories.push(
            statuses
                .iter()
                .enumerate()
                .map(|(i, status)| TrackingEvent {
                    status: status.to_string(),
                    location: "Warehouse".to_string(),
                    verification_note: String::new(),
                    timestamp: CREATED_AT + 100 + i as u64,
                })
                .collect(),
        );
        id
    }

    pub fn set_flags(&self, id: u64, available: bool, verified: bool) {
        let mut state = self.state.lock().unwrap();
        let index = state.index(id).unwrap();
        state.products[index].is_available = available;
        state.products[index].is_verified = verified;
    }

    pub fn set_owner(&self, id: u64, owner: Address) {
        let mut state = self.state.lock().unwrap();
        let index = state.index(id).unwrap();
        state.products[index].current_owner = owner;
    }

    pub fn owner(&self, id: u64) -> Address {
        let state = self.state.lock().unwrap();
        state.products[state.index(id).unwrap()].current_owner
    }

    pub fn statuses(&self, id: u64) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.histories[state.index(id).unwrap()]
            .iter()
            .map(|event| event.status.clone())
            .collect()
    }

    pub fn product_len(&self) -> usize {
        self.state.lock().unwrap().products.len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn fail_reads_of(&self, id: u64) {
        self.state.lock().unwrap().failing_read = Some(id);
    }

    pub fn fail_updates_with(&self, message: &str) {
        self.state.lock().unwrap().failing_update = Some(message.to_string());
    }

    pub fn fail_transfers_with(&self, message: &str) {
        self.state.lock().unwrap().failing_transfer = Some(message.to_string());
    }
}

#[async_trait]
impl SupplyChainApi for FakeChain {
    async fn product_count(&self) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("productCount".to_string());
        Ok(state.products.len() as u64)
    }

    async fn get_product(&self, id: u64) -> Result<Product> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("getProduct({})", id));
        if state.failing_read == Some(id) {
            return Err(revert("header not found"));
        }
        let index = state.index(id)?;
        Ok(state.products[index].clone())
    }

    async fn get_tracking_history(&self, id: u64) -> Result<Vec<TrackingEvent>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("getTrackingHistory({})", id));
        let index = state.index(id)?;
        Ok(state.histories[index].clone())
    }

    async fn create_product(&self, from: Address, name: &str, description: &str, price: U256) -> Result<TxHash> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("createProduct({}, {})", name, price));
        let id = state.products.len() as u64 + 1;
        state.products.push(Product {
            id,
            name: name.to_string(),
            description: description.to_string(),
            price,
            manufacturer: from,
            current_owner: from,
            timestamp: CREATED_AT + id,
            is_available: true,
            is_verified: false,
            verifiers: Vec::new(),
        });
        state.histories.push(Vec::new());
        Ok(state.next_tx())
    }

    async fn update_status(&self, _from: Address, id: u64, status: &str) -> Result<TxHash> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("updateStatus({})", id));
        if let Some(message) = state.failing_update.clone() {
            return Err(revert(&message));
        }
        let index = state.index(id)?;
        state.histories[index].push(TrackingEvent {
            status: status.to_string(),
            location: String::new(),
            verification_note: String::new(),
            timestamp: CREATED_AT + 1_000,
        });
        Ok(state.next_tx())
    }

    async fn transfer_product(&self, _from: Address, id: u64, new_owner: Address) -> Result<TxHash> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("transferProduct({}, {})", id, new_owner));
        if let Some(message) = state.failing_transfer.clone() {
            return Err(revert(&message));
        }
        let index = state.index(id)?;
        state.products[index].current_owner = new_owner;
        Ok(state.next_tx())
    }
}

/// JSON-RPC node holding wallet accounts and serving a [`FakeChain`] over the ABI
pub struct MockNode {
    pub chain: Arc<FakeChain>,
    accounts: Mutex<Vec<Address>>,
    network_id: Mutex<u64>,
    reject_access: AtomicBool,
    legacy_accounts: AtomicBool,
    revert_receipts: AtomicBool,
    pending_receipts: AtomicUsize,
    methods: Mutex<Vec<String>>,
}

impl MockNode {
    pub fn new(chain: Arc<FakeChain>, accounts: Vec<Address>, network_id: u64) -> Self {
        Self {
            chain,
            accounts: Mutex::new(accounts),
            network_id: Mutex::new(network_id),
            reject_access: AtomicBool::new(false),
            legacy_accounts: AtomicBool::new(false),
            revert_receipts: AtomicBool::new(false),
            pending_receipts: AtomicUsize::new(0),
            methods: Mutex::new(Vec::new()),
        }
    }

    pub fn reject_access(&self) {
        self.reject_access.store(true, Ordering::SeqCst);
    }

    /// Behave like a node that only knows `eth_accounts`
    pub fn legacy_accounts(&self) {
        self.legacy_accounts.store(true, Ordering::SeqCst);
    }

    pub fn revert_receipts(&self) {
        self.revert_receipts.store(true, Ordering::SeqCst);
    }

    /// Answer the next `n` receipt lookups with `null`
    pub fn delay_receipts(&self, n: usize) {
        self.pending_receipts.store(n, Ordering::SeqCst);
    }

    pub fn switch_network(&self, network_id: u64) {
        *self.network_id.lock().unwrap() = network_id;
    }

    pub fn methods(&self) -> Vec<String> {
        self.methods.lock().unwrap().clone()
    }

    fn calldata(tx: &Value) -> Vec<u8> {
        let raw = tx["data"].as_str().unwrap_or_default();
        hex::decode(raw).unwrap()
    }

    async fn eth_call(&self, data: &[u8]) -> Result<Value> {
        let call = ISupplyChain::ISupplyChainCalls::abi_decode(data, true)?;
        let output = match call {
            ISupplyChain::ISupplyChainCalls::productCount(_) => {
                let count = self.chain.product_count().await?;
                ISupplyChain::productCountCall::abi_encode_returns(&(U256::from(count),))
            }
            ISupplyChain::ISupplyChainCalls::getProduct(call) => {
                let product = self.chain.get_product(call.id.to::<u64>()).await?;
                let record = ProductRecord {
                    id: U256::from(product.id),
                    name: product.name,
                    description: product.description,
                    price: product.price,
                    manufacturer: product.manufacturer,
                    currentOwner: product.current_owner,
                    timestamp: U256::from(product.timestamp),
                    isAvailable: product.is_available,
                    isVerified: product.is_verified,
                    verifiers: product.verifiers,
                };
                ISupplyChain::getProductCall::abi_encode_returns(&(record,))
            }
            ISupplyChain::ISupplyChainCalls::getTrackingHistory(call) => {
                let history = self.chain.get_tracking_history(call.id.to::<u64>()).await?;
                let records: Vec<TrackingRecord> = history
                    .into_iter()
                    .map(|event| TrackingRecord {
                        status: event.status,
                        location: event.location,
                        verificationNote: event.verification_note,
                        timestamp: U256::from(event.timestamp),
                    })
                    .collect();
                ISupplyChain::getTrackingHistoryCall::abi_encode_returns(&(records,))
            }
            _ => return Err(revert("not a view function")),
        };
        Ok(json!(hex::encode_prefixed(output)))
    }

    async fn eth_send_transaction(&self, from: Address, data: &[u8]) -> Result<Value> {
        let call = ISupplyChain::ISupplyChainCalls::abi_decode(data, true)?;
        let tx_hash = match call {
            ISupplyChain::ISupplyChainCalls::createProduct(call) => {
                self.chain
                    .create_product(from, &call.name, &call.description, call.price)
                    .await?
            }
            ISupplyChain::ISupplyChainCalls::updateStatus(call) => {
                self.chain
                    .update_status(from, call.id.to::<u64>(), &call.status)
                    .await?
            }
            ISupplyChain::ISupplyChainCalls::transferProduct(call) => {
                self.chain
                    .transfer_product(from, call.id.to::<u64>(), call.newOwner)
                    .await?
            }
            _ => return Err(revert("not a state-changing function")),
        };
        Ok(json!(tx_hash))
    }
}

#[async_trait]
impl Provider for MockNode {
    fn endpoint(&self) -> &str {
        "mock://node"
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.methods.lock().unwrap().push(method.to_string());

        match method {
            "eth_requestAccounts" if self.legacy_accounts.load(Ordering::SeqCst) => Err(SdkError::Rpc {
                code: METHOD_NOT_FOUND,
                message: "Method eth_requestAccounts not supported".to_string(),
            }),
            "eth_requestAccounts" if self.reject_access.load(Ordering::SeqCst) => Err(SdkError::Rpc {
                code: USER_REJECTED,
                message: "User rejected the request.".to_string(),
            }),
            "eth_requestAccounts" | "eth_accounts" => {
                let accounts = self.accounts.lock().unwrap().clone();
                Ok(json!(accounts))
            }
            "net_version" => {
                let network_id = *self.network_id.lock().unwrap();
                Ok(json!(network_id.to_string()))
            }
            "eth_call" => self.eth_call(&Self::calldata(&params[0])).await,
            "eth_sendTransaction" => {
                let from: Address = serde_json::from_value(params[0]["from"].clone())?;
                self.eth_send_transaction(from, &Self::calldata(&params[0])).await
            }
            "eth_getTransactionReceipt" => {
                let pending = self.pending_receipts.load(Ordering::SeqCst);
                if pending > 0 {
                    self.pending_receipts.store(pending - 1, Ordering::SeqCst);
                    return Ok(Value::Null);
                }
                let status = if self.revert_receipts.load(Ordering::SeqCst) { "0x0" } else { "0x1" };
                Ok(json!({ "transactionHash": params[0], "status": status }))
            }
            other => Err(SdkError::Rpc {
                code: METHOD_NOT_FOUND,
                message: format!("Method {} not found", other),
            }),
        }
    }
}
