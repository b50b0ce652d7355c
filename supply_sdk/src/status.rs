//! Shipment status model.
//!
//! The contract stores each tracking event's status as free text. Outgoing
//! updates are built from [`Dispatch`] and [`Delivery`] and only turned into
//! text when they are submitted; recorded text is classified by prefix.

use crate::error::{Result, SdkError};
use crate::units::{format_ether, parse_ether};
use alloy_primitives::U256;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const IN_TRANSIT_PREFIX: &str = "In Transit";
pub const DELIVERED_PREFIX: &str = "Delivered";

/// Date-time layout used inside status strings
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Coarse status shown next to each product
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum DerivedStatus {
    Created,
    InTransit,
    Completed,
    Other(String),
}

impl fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivedStatus::Created => f.write_str("Created"),
            DerivedStatus::InTransit => f.write_str("In Transit"),
            DerivedStatus::Completed => f.write_str("Completed"),
            DerivedStatus::Other(raw) => f.write_str(raw),
        }
    }
}

/// Derive the display status from a history's status strings, oldest first.
///
/// Only the latest entry counts: no history is `Created`, a `Delivered...`
/// entry is `Completed`, an `In Transit...` entry is `InTransit`, anything
/// else is passed through unchanged.
pub fn derive_status<'a, I>(statuses: I) -> DerivedStatus
where
    I: IntoIterator<Item = &'a str>,
{
    match statuses.into_iter().last() {
        None => DerivedStatus::Created,
        Some(latest) if latest.starts_with(DELIVERED_PREFIX) => DerivedStatus::Completed,
        Some(latest) if latest.starts_with(IN_TRANSIT_PREFIX) => DerivedStatus::InTransit,
        Some(latest) => DerivedStatus::Other(latest.to_string()),
    }
}

/// Condition of the goods on arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Quality {
    Good,
    Average,
    Poor,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Quality::Good => "Good",
            Quality::Average => "Average",
            Quality::Poor => "Poor",
        };
        f.write_str(label)
    }
}

impl FromStr for Quality {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(Quality::Good),
            "average" => Ok(Quality::Average),
            "poor" => Ok(Quality::Poor),
            other => Err(SdkError::Other(format!(
                "Unknown quality '{}' (expected Good, Average or Poor)",
                other
            ))),
        }
    }
}

/// Parse a `YYYY-MM-DDTHH:MM` date-time, seconds optional.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| SdkError::Other(format!("Invalid date-time '{}': {}", s, e)))
}

/// Fields recorded when a shipment leaves
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dispatch {
    pub recipient: String,
    pub eta: NaiveDateTime,
    pub distance_km: f64,
    /// Shipping price in wei
    pub price: U256,
}

impl fmt::Display for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - To: {}, ETA: {}, Distance: {}km, Price: {} ETH",
            IN_TRANSIT_PREFIX,
            self.recipient,
            self.eta.format(DATETIME_FORMAT),
            self.distance_km,
            format_ether(self.price)
        )
    }
}

impl FromStr for Dispatch {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || SdkError::Decode(format!("not a dispatch status: {}", s));

        let body = s
            .strip_prefix(IN_TRANSIT_PREFIX)
            .and_then(|rest| rest.strip_prefix(" - To: "))
            .ok_or_else(malformed)?;

        // Recipient is free text, so peel fields off from the right.
        let (rest, price) = body.rsplit_once(", Price: ").ok_or_else(malformed)?;
        let price = price.strip_suffix(" ETH").ok_or_else(malformed)?;
        let (rest, distance) = rest.rsplit_once(", Distance: ").ok_or_else(malformed)?;
        let distance = distance.strip_suffix("km").ok_or_else(malformed)?;
        let (recipient, eta) = rest.rsplit_once(", ETA: ").ok_or_else(malformed)?;

        Ok(Dispatch {
            recipient: recipient.to_string(),
            eta: parse_datetime(eta)?,
            distance_km: distance.parse().map_err(|_| malformed())?,
            price: parse_ether(price)?,
        })
    }
}

/// Fields recorded when a shipment arrives
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    pub delivered_at: NaiveDateTime,
    pub temperature_c: f64,
    pub quality: Quality,
    pub notes: Option<String>,
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - Time: {}, Temp: {}°C, Quality: {}",
            DELIVERED_PREFIX,
            self.delivered_at.format(DATETIME_FORMAT),
            self.temperature_c,
            self.quality
        )?;
        match self.notes.as_deref() {
            Some(notes) if !notes.is_empty() => write!(f, ", Notes: {}", notes),
            _ => Ok(()),
        }
    }
}

impl FromStr for Delivery {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || SdkError::Decode(format!("not a delivery status: {}", s));

        let body = s
            .strip_prefix(DELIVERED_PREFIX)
            .and_then(|rest| rest.strip_prefix(" - Time: "))
            .ok_or_else(malformed)?;

        let (time, rest) = body.split_once(", Temp: ").ok_or_else(malformed)?;
        let (temperature, rest) = rest.split_once("°C, Quality: ").ok_or_else(malformed)?;
        let (quality, notes) = match rest.split_once(", Notes: ") {
            Some((quality, notes)) => (quality, Some(notes.to_string())),
            None => (rest, None),
        };

        Ok(Delivery {
            delivered_at: parse_datetime(time)?,
            temperature_c: temperature.parse().map_err(|_| malformed())?,
            quality: quality.parse()?,
            notes,
        })
    }
}

/// A recorded status string, classified
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ShipmentStatus {
    InTransit(Dispatch),
    Delivered(Delivery),
    /// Anything that does not follow the dispatch/delivery templates
    Other(String),
}

impl ShipmentStatus {
    pub fn parse(raw: &str) -> Self {
        if let Ok(dispatch) = raw.parse::<Dispatch>() {
            return ShipmentStatus::InTransit(dispatch);
        }
        if let Ok(delivery) = raw.parse::<Delivery>() {
            return ShipmentStatus::Delivered(delivery);
        }
        ShipmentStatus::Other(raw.to_string())
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShipmentStatus::InTransit(dispatch) => dispatch.fmt(f),
            ShipmentStatus::Delivered(delivery) => delivery.fmt(f),
            ShipmentStatus::Other(raw) => f.write_str(raw),
        }
    }
}
