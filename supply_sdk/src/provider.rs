//! JSON-RPC access to the wallet-enabled node.

use crate::error::{Result, SdkError};
use alloy_primitives::{hex, Address, TxHash};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// JSON-RPC code for "method not found"
pub const METHOD_NOT_FOUND: i64 = -32601;
/// EIP-1193 code for a request the user rejected
pub const USER_REJECTED: i64 = 4001;

/// A wallet-backed RPC endpoint. It owns the user's accounts and signs
/// transactions sent through `eth_sendTransaction`.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Where requests go, for error reporting
    fn endpoint(&self) -> &str;

    async fn request(&self, method: &str, params: Value) -> Result<Value>;
}

/// Provider speaking JSON-RPC 2.0 over HTTP
pub struct HttpProvider {
    endpoint: String,
    client: Client,
    next_id: AtomicU64,
}

impl HttpProvider {
    /// Create a new provider
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, Client::new())
    }

    /// Create a provider with a custom reqwest client
    pub fn with_client(endpoint: impl Into<String>, client: Client) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client,
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl Provider for HttpProvider {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(method, id, "rpc request");

        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response: RpcResponse = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            tracing::debug!(method, id, code = error.code, "rpc error");
            return Err(SdkError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(response.result.unwrap_or(Value::Null))
    }
}

/// Ask the wallet for account access. Nodes without `eth_requestAccounts`
/// get `eth_accounts` instead.
pub async fn request_accounts(provider: &dyn Provider) -> Result<Vec<Address>> {
    let value = match provider.request("eth_requestAccounts", json!([])).await {
        Err(SdkError::Rpc { code: METHOD_NOT_FOUND, .. }) => {
            provider.request("eth_accounts", json!([])).await?
        }
        Err(SdkError::Rpc { code: USER_REJECTED, .. }) => return Err(SdkError::AccessDenied),
        other => other?,
    };

    Ok(serde_json::from_value(value)?)
}

/// Network id as reported by `net_version`
pub async fn network_id(provider: &dyn Provider) -> Result<u64> {
    let value = provider.request("net_version", json!([])).await?;
    let raw = value
        .as_str()
        .ok_or_else(|| SdkError::Decode(format!("net_version returned {}", value)))?;

    raw.parse()
        .map_err(|_| SdkError::Decode(format!("net_version returned '{}'", raw)))
}

/// Read-only call against the latest block
pub async fn call(provider: &dyn Provider, to: Address, data: &[u8]) -> Result<Vec<u8>> {
    let params = json!([
        { "to": to, "data": hex::encode_prefixed(data) },
        "latest"
    ]);
    let value = provider.request("eth_call", params).await?;
    let raw = value
        .as_str()
        .ok_or_else(|| SdkError::Decode(format!("eth_call returned {}", value)))?;

    hex::decode(raw).map_err(|e| SdkError::Decode(format!("eth_call returned bad hex: {}", e)))
}

/// Submit a transaction for the wallet to sign; returns its hash
pub async fn send_transaction(
    provider: &dyn Provider,
    from: Address,
    to: Address,
    data: &[u8],
) -> Result<TxHash> {
    let params = json!([{
        "from": from,
        "to": to,
        "data": hex::encode_prefixed(data),
    }]);
    let value = provider.request("eth_sendTransaction", params).await?;
    Ok(serde_json::from_value(value)?)
}

/// Outcome of a mined transaction; `None` while still pending
pub async fn transaction_succeeded(provider: &dyn Provider, tx_hash: TxHash) -> Result<Option<bool>> {
    let value = provider
        .request("eth_getTransactionReceipt", json!([tx_hash]))
        .await?;
    if value.is_null() {
        return Ok(None);
    }

    let receipt: ReceiptResponse = serde_json::from_value(value)?;
    // Pre-Byzantium receipts carry no status field; treat them as success.
    Ok(Some(receipt.status.as_deref() != Some("0x0")))
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct ReceiptResponse {
    status: Option<String>,
}
