//! Selection of the products each shipment page can act on.

use crate::status::{DELIVERED_PREFIX, IN_TRANSIT_PREFIX};
use crate::types::ProductView;

/// Available, unverified, and with no transit or delivery recorded yet.
pub fn is_startable(product: &ProductView) -> bool {
    product.is_available
        && !product.is_verified
        && !product.has_status_prefix(IN_TRANSIT_PREFIX)
        && !product.has_status_prefix(DELIVERED_PREFIX)
}

/// Available, dispatched at least once, and not delivered.
pub fn is_completable(product: &ProductView) -> bool {
    product.is_available
        && product.has_status_prefix(IN_TRANSIT_PREFIX)
        && !product.has_status_prefix(DELIVERED_PREFIX)
}

pub fn startable(products: &[ProductView]) -> Vec<&ProductView> {
    products.iter().filter(|p| is_startable(p)).collect()
}

pub fn completable(products: &[ProductView]) -> Vec<&ProductView> {
    products.iter().filter(|p| is_completable(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrackingEntry;
    use alloy_primitives::{Address, U256};

    fn view(id: u64, statuses: &[&str]) -> ProductView {
        ProductView {
            id,
            name: format!("product-{}", id),
            description: String::new(),
            price: "1".into(),
            price_wei: U256::from(1u8),
            manufacturer: Address::ZERO,
            current_owner: Address::ZERO,
            created_at: String::new(),
            is_available: true,
            is_verified: false,
            verifiers: Vec::new(),
            history: statuses
                .iter()
                .map(|s| TrackingEntry {
                    status: s.to_string(),
                    location: String::new(),
                    verification_note: String::new(),
                    recorded_at: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_delivered_is_never_startable() {
        let product = view(1, &["Delivered - Time: Y"]);
        assert!(!is_startable(&product));

        let product = view(2, &["Delivered - Time: Y", "Returned to stock"]);
        assert!(!is_startable(&product));
    }

    #[test]
    fn test_verified_or_unavailable_is_not_startable() {
        let mut product = view(1, &[]);
        assert!(is_startable(&product));

        product.is_verified = true;
        assert!(!is_startable(&product));

        product.is_verified = false;
        product.is_available = false;
        assert!(!is_startable(&product));
    }

    #[test]
    fn test_completable_needs_transit_entry() {
        let product = view(1, &["Quality checked"]);
        assert!(!is_completable(&product));

        let product = view(2, &["Quality checked", "In Transit - To: X"]);
        assert!(is_completable(&product));

        let mut product = view(3, &["In Transit - To: X"]);
        product.is_available = false;
        assert!(!is_completable(&product));
    }

    #[test]
    fn test_filters_partition_catalog() {
        let catalog = vec![
            view(1, &["In Transit - To: X"]),
            view(2, &[]),
            view(3, &["In Transit - To: X", "Delivered - Time: Y"]),
        ];

        let ids: Vec<u64> = startable(&catalog).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2]);

        let ids: Vec<u64> = completable(&catalog).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1]);
    }
}
