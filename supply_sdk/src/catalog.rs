//! Read-side aggregation over the contract: catalog listing, lookup by id and
//! per-account statistics.
//!
//! Every read walks identifiers `1..=productCount` one at a time; nothing is
//! cached between calls.

use crate::contract::SupplyChainApi;
use crate::error::Result;
use crate::session::{Session, Snapshot};
use crate::types::{ProductView, ProfileStats};
use alloy_primitives::Address;

/// Fetch every product with its tracking history, in identifier order.
///
/// Any failed read aborts the whole listing.
pub async fn list_products(api: &dyn SupplyChainApi) -> Result<Vec<ProductView>> {
    let count = api.product_count().await.inspect_err(log_read_error)?;
    let mut products = Vec::new();

    for id in 1..=count {
        let view = lookup(api, id).await?;
        products.push(view);
    }

    tracing::debug!(count, "catalog loaded");
    Ok(products)
}

/// Fetch a single product and its history
pub async fn lookup(api: &dyn SupplyChainApi, id: u64) -> Result<ProductView> {
    let product = api.get_product(id).await.inspect_err(log_read_error)?;
    let history = api
        .get_tracking_history(id)
        .await
        .inspect_err(log_read_error)?;
    Ok(ProductView::new(product, history))
}

/// Count the products the account manufactured or currently owns.
///
/// Verified products count as completed, the rest as pending.
pub async fn profile_stats(api: &dyn SupplyChainApi, account: Address) -> Result<ProfileStats> {
    let count = api.product_count().await.inspect_err(log_read_error)?;
    let mut stats = ProfileStats::default();

    for id in 1..=count {
        let product = api.get_product(id).await.inspect_err(log_read_error)?;
        if product.manufacturer != account && product.current_owner != account {
            continue;
        }

        stats.total += 1;
        if product.is_verified {
            stats.completed += 1;
        } else {
            stats.pending += 1;
        }
    }

    Ok(stats)
}

/// List the catalog under `session`, tagged with the session version
pub async fn read_snapshot(session: &Session) -> Result<Snapshot<Vec<ProductView>>> {
    let value = list_products(session.contract()).await?;
    Ok(Snapshot {
        version: session.version,
        value,
    })
}

fn log_read_error(error: &crate::error::SdkError) {
    tracing::debug!("contract read failed: {}", error);
}
