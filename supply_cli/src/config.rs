// src/config.rs
// Runtime settings and their validation

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use supply_sdk::Deployments;

/// Fallback endpoint when neither flag nor environment name one
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
pub const DEFAULT_ARTIFACT: &str = "build/contracts/SupplyChain.json";
pub const DEFAULT_RECEIPT_POLL_MS: u64 = 500;

/// Legacy variable read when `SUPPLY_CHAIN_RPC_URL` is not set
const FALLBACK_RPC_ENV: &str = "ETHEREUM_NETWORK";

#[derive(Debug, Clone)]
pub struct Settings {
    pub rpc_url: String,
    pub artifact: PathBuf,
    pub receipt_poll: Duration,
}

impl Settings {
    /// Combine CLI/env values; `rpc_url` falls back to `ETHEREUM_NETWORK`, then localhost.
    pub fn new(rpc_url: Option<String>, artifact: PathBuf, receipt_poll_ms: u64) -> Self {
        let rpc_url = rpc_url
            .filter(|url| !url.trim().is_empty())
            .or_else(|| env::var(FALLBACK_RPC_ENV).ok().filter(|url| !url.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());

        Self {
            rpc_url,
            artifact,
            receipt_poll: Duration::from_millis(receipt_poll_ms),
        }
    }

    pub fn load_deployments(&self) -> Result<Deployments> {
        Deployments::load(&self.artifact)
            .with_context(|| format!("loading deployments from {}", self.artifact.display()))
    }
}

/// Validation result for configuration checks
pub struct ConfigValidation {
    pub valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ConfigValidation {
    fn new() -> Self {
        Self {
            valid: true,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn add_warning(&mut self, msg: String) {
        self.warnings.push(msg);
    }

    fn add_error(&mut self, msg: String) {
        self.errors.push(msg);
        self.valid = false;
    }

    pub fn print_summary(&self) {
        for w in &self.warnings {
            tracing::warn!("config: {}", w);
        }

        for e in &self.errors {
            tracing::error!("config: {}", e);
        }

        if self.valid && self.warnings.is_empty() {
            tracing::debug!("configuration validation passed");
        }
    }
}

/// Validate settings before connecting
pub fn validate(settings: &Settings) -> ConfigValidation {
    let mut validation = ConfigValidation::new();

    validate_rpc_url(&settings.rpc_url, &mut validation);
    validate_artifact(&settings.artifact, &mut validation);

    if settings.receipt_poll.is_zero() {
        validation.add_warning("receipt poll interval is 0ms - receipts will be polled in a busy loop".into());
    }

    validation
}

fn validate_rpc_url(url: &str, validation: &mut ConfigValidation) {
    let Some((scheme, rest)) = url.split_once("://") else {
        validation.add_error(format!("RPC URL '{}' has no scheme", url));
        return;
    };

    match scheme {
        "https" => {}
        "http" => {
            let host = rest.split(['/', ':']).next().unwrap_or_default();
            if !matches!(host, "localhost" | "127.0.0.1" | "0.0.0.0") {
                validation.add_warning(format!(
                    "RPC URL '{}' uses plain http to a remote host - wallet traffic is unencrypted",
                    url
                ));
            }
        }
        "ws" | "wss" => validation.add_error(format!(
            "RPC URL '{}' is a websocket endpoint; only http(s) is supported",
            url
        )),
        other => validation.add_error(format!("RPC URL scheme '{}' is not supported", other)),
    }
}

fn validate_artifact(path: &Path, validation: &mut ConfigValidation) {
    if !path.exists() {
        validation.add_error(format!(
            "contract artifact {} not found (set SUPPLY_CHAIN_ARTIFACT or --artifact)",
            path.display()
        ));
        return;
    }

    match Deployments::load(path) {
        Ok(deployments) if deployments.is_empty() => validation.add_error(format!(
            "contract artifact {} has no network deployments",
            path.display()
        )),
        Ok(_) => {}
        Err(e) => validation.add_error(e.to_string()),
    }
}
