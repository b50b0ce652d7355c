pub mod actions;
pub mod catalog;
pub mod contract;
pub mod deployment;
pub mod error;
pub mod filters;
pub mod provider;
pub mod session;
pub mod status;
pub mod types;
pub mod units;

pub use alloy_primitives::{Address, TxHash, U256};

pub use actions::{CompletionReceipt, CreatedProduct, ShipmentDesk};
pub use contract::{SupplyChainApi, SupplyChainContract};
pub use deployment::Deployments;
pub use error::{Result, SdkError};
pub use provider::{HttpProvider, Provider};
pub use session::{Connector, Session, SessionManager, Snapshot, WalletEvent};
pub use status::{derive_status, Delivery, DerivedStatus, Dispatch, Quality, ShipmentStatus};
pub use types::{Product, ProductView, ProfileStats, TrackingEntry, TrackingEvent};

/// SDK version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::actions::ShipmentDesk;
    pub use crate::catalog::{list_products, lookup, profile_stats, read_snapshot};
    pub use crate::contract::SupplyChainApi;
    pub use crate::error::{Result, SdkError};
    pub use crate::filters::{completable, startable};
    pub use crate::session::{Connector, Session, SessionManager, WalletEvent};
    pub use crate::status::*;
    pub use crate::types::*;
}
