//! Conversions between contract base units and display values.

use crate::error::{Result, SdkError};
use alloy_primitives::{utils, U256};
use chrono::{Local, TimeZone};

/// Decimal places of one ether expressed in wei.
pub const ETHER_DECIMALS: usize = 18;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a display amount in ether ("0.25", "3") into wei.
pub fn parse_ether(input: &str) -> Result<U256> {
    let trimmed = input.trim();
    let invalid = |reason: &str| SdkError::InvalidAmount {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid("amount is empty"));
    }

    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("amount has no digits"));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid("only digits and a single decimal point are allowed"));
    }
    if fraction.len() > ETHER_DECIMALS {
        return Err(invalid("more than 18 decimal places"));
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    };

    utils::parse_ether(&normalized).map_err(|e| invalid(&e.to_string()))
}

/// Render wei as ether without trailing zeros ("0.5", "12", "0").
pub fn format_ether(wei: U256) -> String {
    let full = match utils::format_units(wei, "ether") {
        Ok(s) => s,
        // Unit "ether" is always valid; keep the raw wei if formatting ever fails.
        Err(_) => return wei.to_string(),
    };

    if full.contains('.') {
        full.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        full
    }
}

/// Render epoch seconds as a local date-time string.
pub fn format_timestamp(epoch_seconds: u64) -> String {
    i64::try_from(epoch_seconds)
        .ok()
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| epoch_seconds.to_string())
}
