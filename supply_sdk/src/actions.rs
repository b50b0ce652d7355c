//! Form submissions: create a product, start a shipment, complete a shipment.
//!
//! Each action is one or two contract transactions sent from the session's
//! account. Nothing is retried and nothing is rolled back.

use crate::catalog;
use crate::error::{Result, SdkError};
use crate::session::Session;
use crate::status::{Delivery, Dispatch};
use crate::types::ProductView;
use crate::units::parse_ether;
use alloy_primitives::TxHash;
use serde::Serialize;

/// Transactions sent by a completed shipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionReceipt {
    pub status_tx: TxHash,
    /// Ownership transfer back to the manufacturer, when one was needed
    pub transfer_tx: Option<TxHash>,
}

/// Result of creating a product: the transaction plus the re-read catalog
#[derive(Debug, Clone)]
pub struct CreatedProduct {
    pub tx_hash: TxHash,
    pub catalog: Vec<ProductView>,
}

/// Submits shipment actions on behalf of the session's account
pub struct ShipmentDesk<'a> {
    session: &'a Session,
}

impl<'a> ShipmentDesk<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Create a product priced in ether, then reload the catalog.
    ///
    /// Returns `Ok(None)` without calling the contract when no account is connected.
    pub async fn create_product(
        &self,
        name: &str,
        description: &str,
        price_eth: &str,
    ) -> Result<Option<CreatedProduct>> {
        let Some(account) = self.session.account else {
            tracing::warn!("create product skipped: no account connected");
            return Ok(None);
        };

        let price = parse_ether(price_eth)?;
        let tx_hash = self
            .session
            .contract()
            .create_product(account, name, description, price)
            .await
            .inspect_err(|e| tracing::debug!("error creating product: {}", e))?;

        let catalog = catalog::list_products(self.session.contract()).await?;
        Ok(Some(CreatedProduct { tx_hash, catalog }))
    }

    /// Record the dispatch of `product`.
    ///
    /// Returns `Ok(None)` without calling the contract when there is no
    /// account or no product selected.
    pub async fn start_shipment(
        &self,
        product: Option<&ProductView>,
        dispatch: &Dispatch,
    ) -> Result<Option<TxHash>> {
        let (Some(account), Some(product)) = (self.session.account, product) else {
            tracing::warn!("start shipment skipped: account or product missing");
            return Ok(None);
        };

        let status = dispatch.to_string();
        let tx_hash = self
            .session
            .contract()
            .update_status(account, product.id, &status)
            .await
            .inspect_err(|e| tracing::debug!(product = product.id, "error starting shipment: {}", e))?;

        tracing::info!(product = product.id, %tx_hash, "shipment started");
        Ok(Some(tx_hash))
    }

    /// Record the delivery of `product`, then hand ownership back to its
    /// manufacturer if the current account is someone else.
    ///
    /// The two transactions are independent: if the transfer fails after the
    /// delivery was recorded, the error carries the committed status
    /// transaction and the product stays delivered but not re-owned.
    pub async fn complete_shipment(
        &self,
        product: Option<&ProductView>,
        delivery: &Delivery,
    ) -> Result<Option<CompletionReceipt>> {
        let (Some(account), Some(product)) = (self.session.account, product) else {
            tracing::warn!("complete shipment skipped: account or product missing");
            return Ok(None);
        };

        let status = delivery.to_string();
        let status_tx = self
            .session
            .contract()
            .update_status(account, product.id, &status)
            .await
            .inspect_err(|e| tracing::debug!(product = product.id, "error completing shipment: {}", e))?;

        let transfer_tx = if product.manufacturer != account {
            let tx_hash = self
                .session
                .contract()
                .transfer_product(account, product.id, product.manufacturer)
                .await
                .map_err(|e| {
                    tracing::debug!(product = product.id, %status_tx, "ownership transfer failed: {}", e);
                    SdkError::TransferAfterDelivery {
                        status_tx,
                        source: Box::new(e),
                    }
                })?;
            Some(tx_hash)
        } else {
            None
        };

        tracing::info!(product = product.id, %status_tx, "shipment completed");
        Ok(Some(CompletionReceipt {
            status_tx,
            transfer_tx,
        }))
    }
}
