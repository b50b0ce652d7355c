use crate::status::{derive_status, DerivedStatus};
use crate::units::{format_ether, format_timestamp};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Product record as stored by the contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: String,
    /// Price in wei
    pub price: U256,
    pub manufacturer: Address,
    pub current_owner: Address,
    /// Creation time, epoch seconds
    pub timestamp: u64,
    pub is_available: bool,
    pub is_verified: bool,
    pub verifiers: Vec<Address>,
}

/// One entry of a product's tracking history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub status: String,
    pub location: String,
    pub verification_note: String,
    /// Epoch seconds
    pub timestamp: u64,
}

/// Tracking event prepared for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingEntry {
    pub status: String,
    pub location: String,
    pub verification_note: String,
    pub recorded_at: String,
}

impl From<TrackingEvent> for TrackingEntry {
    fn from(event: TrackingEvent) -> Self {
        Self {
            recorded_at: format_timestamp(event.timestamp),
            status: event.status,
            location: event.location,
            verification_note: event.verification_note,
        }
    }
}

/// Product enriched with its history, with price and times converted for display.
///
/// Views are read-only snapshots; nothing keeps them in sync with the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductView {
    pub id: u64,
    pub name: String,
    pub description: String,
    /// Price in ether
    pub price: String,
    pub price_wei: U256,
    pub manufacturer: Address,
    pub current_owner: Address,
    pub created_at: String,
    pub is_available: bool,
    pub is_verified: bool,
    pub verifiers: Vec<Address>,
    pub history: Vec<TrackingEntry>,
}

impl ProductView {
    pub fn new(product: Product, history: Vec<TrackingEvent>) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: format_ether(product.price),
            price_wei: product.price,
            manufacturer: product.manufacturer,
            current_owner: product.current_owner,
            created_at: format_timestamp(product.timestamp),
            is_available: product.is_available,
            is_verified: product.is_verified,
            verifiers: product.verifiers,
            history: history.into_iter().map(TrackingEntry::from).collect(),
        }
    }

    /// Status derived from the latest history entry
    pub fn status(&self) -> DerivedStatus {
        derive_status(self.history.iter().map(|entry| entry.status.as_str()))
    }

    /// True when any history entry starts with `prefix`
    pub fn has_status_prefix(&self, prefix: &str) -> bool {
        self.history.iter().any(|entry| entry.status.starts_with(prefix))
    }
}

/// Shipment counts shown on the profile page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProfileStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
}
