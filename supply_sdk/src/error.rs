use alloy_primitives::TxHash;
use thiserror::Error;

/// Errors produced by the SupplyChain SDK
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ABI error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    /// Error object returned by the node; the message is shown verbatim.
    #[error("{message}")]
    Rpc { code: i64, message: String },

    #[error("No wallet reachable at {endpoint}: {reason}")]
    WalletUnavailable { endpoint: String, reason: String },

    #[error("Account access was denied by the wallet")]
    AccessDenied,

    #[error("Contract not deployed to network {network_id}")]
    NotDeployed { network_id: u64 },

    #[error("Transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },

    #[error("Shipment marked delivered in {status_tx} but ownership transfer failed: {source}")]
    TransferAfterDelivery {
        status_tx: TxHash,
        #[source]
        source: Box<SdkError>,
    },

    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Deployment artifact error: {0}")]
    Artifact(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SdkError>;
