//! Wallet session: active account plus the contract handle for the active network.
//!
//! A [`Session`] is an immutable snapshot. The [`SessionManager`] replaces it
//! whenever the wallet reports an account or network change, bumping the
//! version so that reads started against an older session can be discarded.

use crate::contract::{SupplyChainApi, SupplyChainContract, DEFAULT_RECEIPT_POLL};
use crate::deployment::Deployments;
use crate::error::{Result, SdkError};
use crate::provider::{self, Provider};
use alloy_primitives::Address;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Notifications coming from the wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The wallet's account list changed; the first entry is the active one.
    AccountsChanged(Vec<Address>),
    /// The wallet switched networks.
    ChainChanged,
}

/// Connected account and network-scoped contract handle
#[derive(Clone)]
pub struct Session {
    pub version: u64,
    pub account: Option<Address>,
    pub network_id: u64,
    pub contract: Arc<dyn SupplyChainApi>,
}

impl Session {
    pub fn new(account: Option<Address>, network_id: u64, contract: Arc<dyn SupplyChainApi>) -> Self {
        Self {
            version: 0,
            account,
            network_id,
            contract,
        }
    }

    pub fn contract(&self) -> &dyn SupplyChainApi {
        self.contract.as_ref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("version", &self.version)
            .field("account", &self.account)
            .field("network_id", &self.network_id)
            .finish_non_exhaustive()
    }
}

/// Value read under a particular session version
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub version: u64,
    pub value: T,
}

/// Builds sessions from a wallet provider and a deployment registry
#[derive(Clone)]
pub struct Connector {
    provider: Arc<dyn Provider>,
    deployments: Deployments,
    receipt_poll: Duration,
}

impl Connector {
    pub fn new(provider: Arc<dyn Provider>, deployments: Deployments) -> Self {
        Self {
            provider,
            deployments,
            receipt_poll: DEFAULT_RECEIPT_POLL,
        }
    }

    pub fn with_receipt_poll(mut self, interval: Duration) -> Self {
        self.receipt_poll = interval;
        self
    }

    /// Request account access, resolve the network and bind the contract.
    ///
    /// Fails without retrying when the wallet is unreachable, refuses access,
    /// or the network has no registered deployment.
    pub async fn connect(&self) -> Result<Session> {
        let accounts = provider::request_accounts(self.provider.as_ref())
            .await
            .map_err(|e| self.unavailable(e))?;
        let account = accounts.first().copied().ok_or(SdkError::AccessDenied)?;

        let (network_id, contract) = self.resolve_contract().await?;
        tracing::info!(%account, network_id, "wallet connected");

        Ok(Session::new(Some(account), network_id, contract))
    }

    /// Look up the deployment for the wallet's current network
    pub async fn resolve_contract(&self) -> Result<(u64, Arc<dyn SupplyChainApi>)> {
        let network_id = provider::network_id(self.provider.as_ref())
            .await
            .map_err(|e| self.unavailable(e))?;
        let address = self.deployments.address_for(network_id)?;
        tracing::info!(network_id, %address, "resolved contract deployment");

        let contract = SupplyChainContract::new(Arc::clone(&self.provider), address)
            .with_receipt_poll(self.receipt_poll);
        Ok((network_id, Arc::new(contract)))
    }

    fn unavailable(&self, error: SdkError) -> SdkError {
        match error {
            SdkError::Http(e) => SdkError::WalletUnavailable {
                endpoint: self.provider.endpoint().to_string(),
                reason: e.to_string(),
            },
            other => other,
        }
    }
}

/// Owns the current session and republishes it on wallet events
pub struct SessionManager {
    connector: Connector,
    sender: watch::Sender<Arc<Session>>,
}

impl SessionManager {
    /// Connect once and start publishing the resulting session
    pub async fn connect(connector: Connector) -> Result<Self> {
        let session = connector.connect().await?;
        Ok(Self::from_session(connector, session))
    }

    /// Start from an already built session
    pub fn from_session(connector: Connector, session: Session) -> Self {
        let initial = Session {
            version: 1,
            ..session
        };
        let (sender, _) = watch::channel(Arc::new(initial));
        Self { connector, sender }
    }

    pub fn current(&self) -> Arc<Session> {
        Arc::clone(&*self.sender.borrow())
    }

    /// Receiver that observes every republished session
    pub fn subscribe(&self) -> watch::Receiver<Arc<Session>> {
        self.sender.subscribe()
    }

    pub fn is_current(&self, version: u64) -> bool {
        self.sender.borrow().version == version
    }

    /// Rebuild the session for a wallet event.
    ///
    /// The rebuild is merged into whatever session is current when it is
    /// published, so a concurrent account change survives a network change.
    /// On failure the previous session stays published.
    pub async fn handle(&self, event: WalletEvent) -> Result<Arc<Session>> {
        let published = match event {
            WalletEvent::AccountsChanged(accounts) => {
                let account = accounts.first().copied();
                tracing::info!(?account, "wallet account changed");
                self.publish(|latest| {
                    Session::new(account, latest.network_id, Arc::clone(&latest.contract))
                })
            }
            WalletEvent::ChainChanged => {
                let (network_id, contract) = self.connector.resolve_contract().await?;
                tracing::info!(network_id, "wallet network changed");
                self.publish(move |latest| Session::new(latest.account, network_id, contract))
            }
        };

        Ok(published)
    }

    /// Apply wallet events from `events` until the channel closes
    pub fn listen(self: Arc<Self>, mut events: mpsc::Receiver<WalletEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if let Err(e) = self.handle(event).await {
                    tracing::error!("failed to rebuild session: {}", e);
                }
            }
        })
    }

    /// Return the snapshot's value if no newer session has been published
    pub fn accept<T>(&self, snapshot: Snapshot<T>) -> Option<T> {
        if self.is_current(snapshot.version) {
            Some(snapshot.value)
        } else {
            tracing::warn!(
                version = snapshot.version,
                current = self.sender.borrow().version,
                "discarding result read under a stale session"
            );
            None
        }
    }

    fn publish(&self, rebuild: impl FnOnce(&Session) -> Session) -> Arc<Session> {
        let mut published = None;
        self.sender.send_modify(|current| {
            let session = rebuild(&**current);
            *current = Arc::new(Session {
                version: current.version + 1,
                ..session
            });
            published = Some(Arc::clone(current));
        });
        published.unwrap_or_else(|| self.current())
    }
}
