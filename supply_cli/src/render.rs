use colored::Colorize;
use supply_sdk::{Address, DerivedStatus, ProductView, ProfileStats, ShipmentStatus};

fn status_label(status: &DerivedStatus) -> colored::ColoredString {
    let text = status.to_string();
    match status {
        DerivedStatus::Completed => text.green(),
        DerivedStatus::InTransit => text.blue(),
        DerivedStatus::Created => text.bright_black(),
        DerivedStatus::Other(_) => text.yellow(),
    }
}

pub fn header(title: &str) {
    println!("\n{}", title.cyan().bold());
    println!("{}", "═".repeat(50).cyan());
}

pub fn dashboard(products: &[ProductView]) {
    header("📦 Supply Chain Management");
    println!("{}: {}", "Shipments Count".bright_white(), products.len().to_string().cyan());

    if products.is_empty() {
        return;
    }

    println!("\n{}", "Recent Shipments".bright_white().bold());
    println!("{}", "─".repeat(50).bright_black());
    for product in products {
        println!("{} {}", format!("#{}", product.id).bright_black(), product.name.bold());
        println!("   {}", product.description);
        println!("   {}: {} ETH", "Price".bright_white(), product.price);
        println!("   {}: {}", "Status".bright_white(), status_label(&product.status()));
        println!("   {}: {}", "Created".bright_white(), product.created_at);
    }
}

/// Products offered for selection on the start/complete pages
pub fn selection(title: &str, products: &[&ProductView], empty_message: &str) {
    header(title);
    if products.is_empty() {
        println!("{}", empty_message.yellow());
        return;
    }

    for product in products {
        println!(
            "  {} {} - {}",
            format!("[{}]", product.id).cyan(),
            product.name,
            product.description
        );
    }
}

pub fn shipment(product: &ProductView) {
    header(&format!("🔍 Shipment #{}", product.id));
    println!("{}: {}", "Name".bright_white(), product.name);
    println!("{}: {}", "Description".bright_white(), product.description);
    println!("{}: {} ETH", "Price".bright_white(), product.price);
    println!("{}: {}", "Manufacturer".bright_white(), product.manufacturer.to_string().yellow());
    println!("{}: {}", "Current Owner".bright_white(), product.current_owner.to_string().green());
    println!("{}: {}", "Created".bright_white(), product.created_at);
    println!("{}: {}", "Status".bright_white(), status_label(&product.status()));
    println!(
        "{}: {}",
        "Verified".bright_white(),
        if product.is_verified { "yes".green() } else { "no".yellow() }
    );
    for verifier in &product.verifiers {
        println!("   - {}", verifier);
    }

    println!("\n{}", "Tracking History".bright_white().bold());
    println!("{}", "─".repeat(50).bright_black());
    if product.history.is_empty() {
        println!("{}", "No tracking events recorded yet".bright_black());
    }
    for entry in &product.history {
        println!("{} {}", entry.recorded_at.bright_black(), entry.status);
        match ShipmentStatus::parse(&entry.status) {
            ShipmentStatus::InTransit(dispatch) => {
                println!("   {}: {}", "Recipient".bright_white(), dispatch.recipient);
                println!("   {}: {} km", "Distance".bright_white(), dispatch.distance_km);
            }
            ShipmentStatus::Delivered(delivery) => {
                println!("   {}: {}°C", "Temperature".bright_white(), delivery.temperature_c);
                println!("   {}: {}", "Quality".bright_white(), delivery.quality);
            }
            ShipmentStatus::Other(_) => {}
        }
        if !entry.location.is_empty() {
            println!("   {}: {}", "Location".bright_white(), entry.location);
        }
        if !entry.verification_note.is_empty() {
            println!("   {}: {}", "Verification".bright_white(), entry.verification_note);
        }
    }
}

pub fn profile(account: Address, stats: &ProfileStats) {
    header("👤 User Profile");
    println!("{}: {}", "Account".bright_white(), account.to_string().green());
    println!("{}: {}", "Total Shipments".bright_white(), stats.total);
    println!("{}: {}", "Completed".bright_white(), stats.completed.to_string().green());
    println!("{}: {}", "Pending".bright_white(), stats.pending.to_string().yellow());
}
