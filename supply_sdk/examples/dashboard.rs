use std::path::Path;
use std::sync::Arc;
use supply_sdk::catalog::{profile_stats, read_snapshot};
use supply_sdk::filters::{completable, startable};
use supply_sdk::{Connector, Deployments, HttpProvider, SessionManager};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("📦 Supply Chain SDK - Dashboard Example\n");

    // Wallet endpoint and the truffle artifact listing the deployments
    let provider = Arc::new(HttpProvider::new("http://localhost:8545"));
    let deployments = Deployments::load(Path::new("build/contracts/SupplyChain.json"))?;

    // 1. Connect: accounts, network id, contract address
    println!("🔌 Connecting to wallet...");
    let manager = SessionManager::connect(Connector::new(provider, deployments)).await?;
    let session = manager.current();
    println!("   Network: {}", session.network_id);
    match session.account {
        Some(account) => println!("   Account: {}\n", account),
        None => println!("   No account connected\n"),
    }

    // 2. Read the catalog; discard it if the wallet switched meanwhile
    println!("📋 Loading products...");
    let snapshot = read_snapshot(&session).await?;
    let Some(products) = manager.accept(snapshot) else {
        println!("   Session changed while loading, try again");
        return Ok(());
    };
    println!("   Found {} products:", products.len());
    for product in &products {
        println!("   - #{} {} ({} ETH): {}", product.id, product.name, product.price, product.status());
    }
    println!();

    // 3. What can be acted on
    println!("🚚 Ready to ship: {}", startable(&products).len());
    println!("✅ In transit: {}\n", completable(&products).len());

    // 4. Profile statistics
    if let Some(account) = session.account {
        let stats = profile_stats(session.contract(), account).await?;
        println!("👤 Total: {}  Completed: {}  Pending: {}", stats.total, stats.completed, stats.pending);
    }

    Ok(())
}
