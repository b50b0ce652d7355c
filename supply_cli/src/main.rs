mod config;
mod render;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use config::Settings;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use supply_sdk::catalog::{lookup, profile_stats, read_snapshot};
use supply_sdk::filters::{completable, startable};
use supply_sdk::status::parse_datetime;
use supply_sdk::units::parse_ether;
use supply_sdk::{
    Address, Connector, Delivery, Dispatch, HttpProvider, ProductView, Quality,
    SdkError, SessionManager, ShipmentDesk, WalletEvent,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "supply-chain")]
#[command(about = "Supply Chain - track products and shipments on the SupplyChain contract", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Wallet JSON-RPC endpoint (falls back to ETHEREUM_NETWORK, then localhost:8545)
    #[arg(long, global = true, env = "SUPPLY_CHAIN_RPC_URL")]
    rpc_url: Option<String>,

    /// Contract build artifact listing the deployment per network
    #[arg(long, global = true, env = "SUPPLY_CHAIN_ARTIFACT", default_value = config::DEFAULT_ARTIFACT)]
    artifact: PathBuf,

    /// Delay between transaction receipt lookups, in milliseconds
    #[arg(long, global = true, env = "SUPPLY_CHAIN_RECEIPT_POLL_MS", default_value_t = config::DEFAULT_RECEIPT_POLL_MS)]
    receipt_poll_ms: u64,

    /// Act as this wallet account instead of the wallet's first one
    #[arg(long, global = true, value_parser = parse_address)]
    from: Option<Address>,

    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the shipment count and every product with its status
    Dashboard,

    /// Create a new product (send shipment)
    Create {
        /// Product name
        #[arg(short, long)]
        name: String,

        /// Product description
        #[arg(short, long)]
        description: String,

        /// Price in ETH (up to 18 decimals)
        #[arg(short, long)]
        price: String,
    },

    /// Start a shipment; without --id, list the products that can be started
    Start {
        /// Product to ship
        #[arg(long)]
        id: Option<u64>,

        /// Recipient of the shipment
        #[arg(long)]
        recipient: Option<String>,

        /// Pickup time, YYYY-MM-DDTHH:MM
        #[arg(long)]
        pickup: Option<String>,

        /// Distance in km
        #[arg(long, value_parser = parse_distance)]
        distance: Option<f64>,

        /// Shipping price in ETH
        #[arg(long)]
        price: Option<String>,
    },

    /// Complete a shipment; without --id, list the shipments in transit
    Complete {
        /// Shipment to complete
        #[arg(long)]
        id: Option<u64>,

        /// Delivery time, YYYY-MM-DDTHH:MM
        #[arg(long)]
        delivered_at: Option<String>,

        /// Temperature on arrival in °C
        #[arg(long, allow_hyphen_values = true, value_parser = parse_temperature)]
        temperature: Option<f64>,

        /// Condition on arrival: Good, Average or Poor
        #[arg(long, default_value = "Good", value_parser = parse_quality)]
        quality: Quality,

        /// Additional delivery notes
        #[arg(long)]
        note: Option<String>,
    },

    /// Show one shipment and its tracking history
    Get {
        /// Shipment ID
        id: u64,
    },

    /// Shipment statistics for the connected account
    Profile,
}

fn parse_address(s: &str) -> std::result::Result<Address, String> {
    s.parse().map_err(|e| format!("invalid address: {}", e))
}

fn parse_quality(s: &str) -> std::result::Result<Quality, String> {
    s.parse().map_err(|e: SdkError| e.to_string())
}

fn parse_number(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.trim().parse().map_err(|_| format!("'{}' is not a number", s))?;
    if !value.is_finite() {
        return Err(format!("'{}' is not a finite number", s));
    }
    Ok(value)
}

fn parse_distance(s: &str) -> std::result::Result<f64, String> {
    let value = parse_number(s)?;
    if value < 0.0 {
        return Err(format!("distance cannot be negative: {}", s));
    }
    Ok(value)
}

fn parse_temperature(s: &str) -> std::result::Result<f64, String> {
    parse_number(s)
}

fn required<T>(value: Option<T>, flag: &str) -> Result<T> {
    value.ok_or_else(|| anyhow!("--{} is required together with --id", flag))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Fetch the catalog under the current session, dropping it if the session moved on meanwhile.
async fn fetch_catalog(manager: &SessionManager) -> Option<Vec<ProductView>> {
    let session = manager.current();
    match read_snapshot(&session).await {
        Ok(snapshot) => manager.accept(snapshot),
        Err(e) => {
            println!("{}", format!("❌ Error fetching products: {}", e).red());
            None
        }
    }
}

fn network_list(ids: &[u64]) -> String {
    ids.iter().map(u64::to_string).collect::<Vec<_>>().join(", ")
}

fn find<'a>(products: &[&'a ProductView], id: u64) -> Option<&'a ProductView> {
    products.iter().copied().find(|p| p.id == id)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let settings = Settings::new(cli.rpc_url.clone(), cli.artifact.clone(), cli.receipt_poll_ms);

    let validation = config::validate(&settings);
    validation.print_summary();
    if !validation.valid {
        for e in &validation.errors {
            println!("{}", format!("❌ {}", e).red());
        }
        return Err(anyhow!("invalid configuration"));
    }

    let deployments = settings.load_deployments()?;
    let known_networks = deployments.networks();
    let provider = Arc::new(HttpProvider::new(settings.rpc_url.clone()));
    let connector = Connector::new(provider, deployments).with_receipt_poll(settings.receipt_poll);

    let manager = match SessionManager::connect(connector).await {
        Ok(manager) => manager,
        Err(e) => {
            println!("{}", format!("❌ Error connecting to wallet: {}", e).red());
            println!("{}", format!("Wallet endpoint: {}", settings.rpc_url).yellow());
            if matches!(e, SdkError::NotDeployed { .. }) {
                println!("{}", format!("Deployed on networks: {}", network_list(&known_networks)).yellow());
            }
            std::process::exit(1);
        }
    };

    if let Some(from) = cli.from {
        manager.handle(WalletEvent::AccountsChanged(vec![from])).await?;
    }

    match cli.command {
        Commands::Dashboard => {
            let Some(products) = fetch_catalog(&manager).await else {
                return Ok(());
            };
            if cli.json {
                print_json(&products)?;
            } else {
                render::dashboard(&products);
            }
        }

        Commands::Create {
            name,
            description,
            price,
        } => {
            let session = manager.current();
            println!("{}", "📤 Creating product...".cyan());

            match ShipmentDesk::new(&session)
                .create_product(&name, &description, &price)
                .await
            {
                Ok(Some(created)) => {
                    println!("\n{}", "✅ Product created successfully!".green().bold());
                    println!("{}: {}", "Transaction".bright_white(), created.tx_hash.to_string().cyan());
                    if cli.json {
                        print_json(&created.catalog)?;
                    } else {
                        render::dashboard(&created.catalog);
                    }
                }
                Ok(None) => println!("{}", "⚠️  Please connect your wallet first".yellow()),
                Err(e) => println!("{}", format!("❌ Error creating product: {}", e).red()),
            }
        }

        Commands::Start {
            id,
            recipient,
            pickup,
            distance,
            price,
        } => {
            let Some(products) = fetch_catalog(&manager).await else {
                return Ok(());
            };
            let available = startable(&products);

            let Some(id) = id else {
                if cli.json {
                    print_json(&available)?;
                } else {
                    render::selection(
                        "🚚 Start Shipment",
                        &available,
                        "No products available for shipment",
                    );
                }
                return Ok(());
            };

            let Some(product) = find(&available, id) else {
                println!("{}", format!("❌ Product {} is not available to ship", id).red());
                return Ok(());
            };

            let dispatch = Dispatch {
                recipient: required(recipient, "recipient")?,
                eta: parse_datetime(&required(pickup, "pickup")?)?,
                distance_km: required(distance, "distance")?,
                price: parse_ether(&required(price, "price")?)?,
            };

            let session = manager.current();
            println!("{}", "📡 Starting shipment...".cyan());
            match ShipmentDesk::new(&session).start_shipment(Some(product), &dispatch).await {
                Ok(Some(tx_hash)) => {
                    println!("\n{}", "✅ Shipment started successfully!".green().bold());
                    println!("{}: {}", "Status".bright_white(), dispatch);
                    println!("{}: {}", "Transaction".bright_white(), tx_hash.to_string().cyan());
                }
                Ok(None) => println!("{}", "⚠️  Please connect your wallet first".yellow()),
                Err(e) => println!("{}", format!("❌ Error starting shipment: {}", e).red()),
            }
        }

        Commands::Complete {
            id,
            delivered_at,
            temperature,
            quality,
            note,
        } => {
            let Some(products) = fetch_catalog(&manager).await else {
                return Ok(());
            };
            let in_transit = completable(&products);

            let Some(id) = id else {
                if cli.json {
                    print_json(&in_transit)?;
                } else {
                    render::selection(
                        "✅ Complete Shipment",
                        &in_transit,
                        "No shipments in transit",
                    );
                }
                return Ok(());
            };

            let Some(product) = find(&in_transit, id) else {
                println!("{}", format!("❌ Shipment {} is not in transit", id).red());
                return Ok(());
            };

            let delivery = Delivery {
                delivered_at: parse_datetime(&required(delivered_at, "delivered-at")?)?,
                temperature_c: required(temperature, "temperature")?,
                quality,
                notes: note.filter(|n| !n.trim().is_empty()),
            };

            let session = manager.current();
            println!("{}", "📡 Completing shipment...".cyan());
            match ShipmentDesk::new(&session).complete_shipment(Some(product), &delivery).await {
                Ok(Some(receipt)) => {
                    println!("\n{}", "✅ Shipment completed successfully!".green().bold());
                    println!("{}: {}", "Status".bright_white(), delivery);
                    println!("{}: {}", "Transaction".bright_white(), receipt.status_tx.to_string().cyan());
                    if let Some(transfer) = receipt.transfer_tx {
                        println!(
                            "{}: {}",
                            "Ownership returned".bright_white(),
                            transfer.to_string().cyan()
                        );
                    }
                }
                Ok(None) => println!("{}", "⚠️  Please connect your wallet first".yellow()),
                Err(e) => println!("{}", format!("❌ Error completing shipment: {}", e).red()),
            }
        }

        Commands::Get { id } => {
            let session = manager.current();
            match lookup(session.contract(), id).await {
                Ok(product) => {
                    if cli.json {
                        print_json(&product)?;
                    } else {
                        render::shipment(&product);
                    }
                }
                Err(e) => {
                    println!(
                        "{}",
                        "❌ Error fetching shipment. Please check the ID and try again.".red()
                    );
                    println!("{}", e.to_string().bright_black());
                }
            }
        }

        Commands::Profile => {
            let session = manager.current();
            let Some(account) = session.account else {
                println!("{}", "⚠️  Please connect your wallet to view your profile".yellow());
                return Ok(());
            };

            match profile_stats(session.contract(), account).await {
                Ok(stats) => {
                    if cli.json {
                        print_json(&stats)?;
                    } else {
                        render::profile(account, &stats);
                    }
                }
                Err(e) => println!("{}", format!("❌ Error fetching user stats: {}", e).red()),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_complete_arguments() {
        let cli = Cli::try_parse_from([
            "supply-chain",
            "complete",
            "--id",
            "3",
            "--delivered-at",
            "2024-05-02T08:15",
            "--temperature",
            "-4.5",
            "--quality",
            "poor",
        ])
        .unwrap();

        match cli.command {
            Commands::Complete {
                id,
                temperature,
                quality,
                note,
                ..
            } => {
                assert_eq!(id, Some(3));
                assert_eq!(temperature, Some(-4.5));
                assert_eq!(quality, Quality::Poor);
                assert!(note.is_none());
            }
            _ => panic!("expected complete"),
        }
    }

    #[test]
    fn test_from_must_be_an_address() {
        assert!(Cli::try_parse_from(["supply-chain", "--from", "alice", "profile"]).is_err());
        let cli = Cli::try_parse_from([
            "supply-chain",
            "profile",
            "--from",
            "0x5FbDB2315678afecb367f032d93F642f64180aa3",
        ])
        .unwrap();
        assert!(cli.from.is_some());
    }

    #[test]
    fn test_numbers_must_be_finite() {
        for bad in ["nan", "NaN", "inf", "-inf", "abc"] {
            assert!(parse_distance(bad).is_err(), "{}", bad);
            assert!(parse_temperature(bad).is_err(), "{}", bad);
        }
        assert!(parse_distance("-3").is_err());
        assert_eq!(parse_distance("12.5"), Ok(12.5));
        assert_eq!(parse_temperature("-18.5"), Ok(-18.5));
    }

    #[test]
    fn test_start_rejects_nan_distance() {
        let result = Cli::try_parse_from([
            "supply-chain",
            "start",
            "--id",
            "1",
            "--distance",
            "NaN",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_network_list() {
        assert_eq!(network_list(&[1, 5777]), "1, 5777");
        assert_eq!(network_list(&[]), "");
    }

    #[test]
    fn test_missing_start_field_is_reported() {
        let err = required::<String>(None, "recipient").unwrap_err();
        assert_eq!(err.to_string(), "--recipient is required together with --id");
    }
}
