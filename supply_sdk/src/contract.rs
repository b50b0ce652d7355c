//! Bindings for the deployed SupplyChain contract.

use crate::error::{Result, SdkError};
use crate::provider::{self, Provider};
use crate::types::{Product, TrackingEvent};
use alloy_primitives::{Address, TxHash, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

sol! {
    struct ProductRecord {
        uint256 id;
        string name;
        string description;
        uint256 price;
        address manufacturer;
        address currentOwner;
        uint256 timestamp;
        bool isAvailable;
        bool isVerified;
        address[] verifiers;
    }

    struct TrackingRecord {
        string status;
        string location;
        string verificationNote;
        uint256 timestamp;
    }

    interface ISupplyChain {
        function productCount() external view returns (uint256);
        function getProduct(uint256 id) external view returns (ProductRecord memory);
        function getTrackingHistory(uint256 id) external view returns (TrackingRecord[] memory);
        function createProduct(string name, string description, uint256 price) external;
        function updateStatus(uint256 id, string status) external;
        function transferProduct(uint256 id, address newOwner) external;
    }
}

/// Default delay between receipt lookups while a transaction is pending
pub const DEFAULT_RECEIPT_POLL: Duration = Duration::from_millis(500);

/// Operations the front end needs from the contract.
///
/// State-changing calls are authorized by `from`; they resolve once the
/// transaction has been mined.
#[async_trait]
pub trait SupplyChainApi: Send + Sync {
    async fn product_count(&self) -> Result<u64>;
    async fn get_product(&self, id: u64) -> Result<Product>;
    async fn get_tracking_history(&self, id: u64) -> Result<Vec<TrackingEvent>>;
    async fn create_product(
        &self,
        from: Address,
        name: &str,
        description: &str,
        price: U256,
    ) -> Result<TxHash>;
    async fn update_status(&self, from: Address, id: u64, status: &str) -> Result<TxHash>;
    async fn transfer_product(&self, from: Address, id: u64, new_owner: Address) -> Result<TxHash>;
}

/// Contract handle bound to one deployment address
#[derive(Clone)]
pub struct SupplyChainContract {
    provider: Arc<dyn Provider>,
    address: Address,
    receipt_poll: Duration,
}

impl SupplyChainContract {
    pub fn new(provider: Arc<dyn Provider>, address: Address) -> Self {
        Self {
            provider,
            address,
            receipt_poll: DEFAULT_RECEIPT_POLL,
        }
    }

    pub fn with_receipt_poll(mut self, interval: Duration) -> Self {
        self.receipt_poll = interval;
        self
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return> {
        let output = provider::call(self.provider.as_ref(), self.address, &call.abi_encode()).await?;
        Ok(C::abi_decode_returns(&output, true)?)
    }

    /// Send a state-changing call and wait until it is mined.
    async fn transact<C: SolCall>(&self, from: Address, call: C) -> Result<TxHash> {
        let tx_hash =
            provider::send_transaction(self.provider.as_ref(), from, self.address, &call.abi_encode())
                .await?;
        tracing::info!(%tx_hash, method = C::SIGNATURE, "transaction submitted");

        loop {
            match provider::transaction_succeeded(self.provider.as_ref(), tx_hash).await? {
                Some(true) => return Ok(tx_hash),
                Some(false) => return Err(SdkError::Reverted { tx_hash }),
                None => tokio::time::sleep(self.receipt_poll).await,
            }
        }
    }
}

fn to_u64(value: U256, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| SdkError::Decode(format!("{} out of range: {}", field, value)))
}

impl TryFrom<ProductRecord> for Product {
    type Error = SdkError;

    fn try_from(record: ProductRecord) -> Result<Self> {
        Ok(Product {
            id: to_u64(record.id, "product id")?,
            name: record.name,
            description: record.description,
            price: record.price,
            manufacturer: record.manufacturer,
            current_owner: record.currentOwner,
            timestamp: to_u64(record.timestamp, "product timestamp")?,
            is_available: record.isAvailable,
            is_verified: record.isVerified,
            verifiers: record.verifiers,
        })
    }
}

impl TryFrom<TrackingRecord> for TrackingEvent {
    type Error = SdkError;

    fn try_from(record: TrackingRecord) -> Result<Self> {
        Ok(TrackingEvent {
            status: record.status,
            location: record.location,
            verification_note: record.verificationNote,
            timestamp: to_u64(record.timestamp, "tracking timestamp")?,
        })
    }
}

#[async_trait]
impl SupplyChainApi for SupplyChainContract {
    async fn product_count(&self) -> Result<u64> {
        let count = self.read(ISupplyChain::productCountCall {}).await?;
        to_u64(count._0, "product count")
    }

    async fn get_product(&self, id: u64) -> Result<Product> {
        let product = self
            .read(ISupplyChain::getProductCall { id: U256::from(id) })
            .await?;
        product._0.try_into()
    }

    async fn get_tracking_history(&self, id: u64) -> Result<Vec<TrackingEvent>> {
        let history = self
            .read(ISupplyChain::getTrackingHistoryCall { id: U256::from(id) })
            .await?;
        history._0.into_iter().map(TrackingEvent::try_from).collect()
    }

    async fn create_product(
        &self,
        from: Address,
        name: &str,
        description: &str,
        price: U256,
    ) -> Result<TxHash> {
        let call = ISupplyChain::createProductCall {
            name: name.to_string(),
            description: description.to_string(),
            price,
        };
        self.transact(from, call).await
    }

    async fn update_status(&self, from: Address, id: u64, status: &str) -> Result<TxHash> {
        let call = ISupplyChain::updateStatusCall {
            id: U256::from(id),
            status: status.to_string(),
        };
        self.transact(from, call).await
    }

    async fn transfer_product(&self, from: Address, id: u64, new_owner: Address) -> Result<TxHash> {
        let call = ISupplyChain::transferProductCall {
            id: U256::from(id),
            newOwner: new_owner,
        };
        self.transact(from, call).await
    }
}
