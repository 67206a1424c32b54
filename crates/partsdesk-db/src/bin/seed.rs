//! # Seed Data Generator
//!
//! Populates the database with an auto-parts catalog for development.
//!
//! ## Usage
//! ```bash
//! # Generate 500 parts (default)
//! cargo run -p partsdesk-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p partsdesk-db --bin seed -- --count 2000
//!
//! # Specify database path
//! cargo run -p partsdesk-db --bin seed -- --db ./data/partsdesk.db
//! ```
//!
//! ## Generated Parts
//! Each part has:
//! - Unique part number: `{CATEGORY}-{FITMENT}-{INDEX}`
//! - Name: `{part} {fitment}`, e.g. "Kampas Rem Depan Honda Beat"
//! - Price between Rp 15.000 and Rp 1.500.000
//! - Stock 0 - 60 with a reorder point of 5 or 10
//! - A brand, rotating through the brand list

use std::env;

use partsdesk_core::ProductInput;
use partsdesk_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// Category code, category name, part names.
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "BRK",
        "Rem",
        &["Kampas Rem Depan", "Kampas Rem Belakang", "Piringan Cakram", "Minyak Rem DOT4", "Kabel Rem"],
    ),
    (
        "ENG",
        "Mesin",
        &["Busi Iridium", "Busi Standar", "Filter Oli", "Gasket Head", "Piston Kit", "Klep In/Ex"],
    ),
    (
        "OIL",
        "Oli & Cairan",
        &["Oli Mesin 1L", "Oli Mesin 0.8L", "Oli Gardan", "Coolant 1L", "Grease"],
    ),
    (
        "ELC",
        "Kelistrikan",
        &["Aki Kering", "Lampu Depan LED", "Sekring 10A", "Klakson 12V", "Regulator Kiprok"],
    ),
    (
        "TRN",
        "Transmisi",
        &["V-Belt", "Roller Set", "Kampas Kopling", "Gear Set", "Rantai 428"],
    ),
    (
        "SUS",
        "Kaki-kaki",
        &["Shock Absorber Belakang", "Seal Shock Depan", "Bearing Roda", "Ban Luar 80/90-14"],
    ),
];

/// Vehicle fitments combined with every part name.
const FITMENTS: &[(&str, &str)] = &[
    ("BEAT", "Honda Beat"),
    ("VARIO", "Honda Vario 125"),
    ("NMAX", "Yamaha NMAX"),
    ("MIO", "Yamaha Mio"),
    ("SATRIA", "Suzuki Satria FU"),
    ("AVANZA", "Toyota Avanza"),
    ("XENIA", "Daihatsu Xenia"),
    ("UNIV", "Universal"),
];

const BRANDS: &[(&str, &str)] = &[
    ("AHM", "Indonesia"),
    ("Yamalube", "Indonesia"),
    ("NGK", "Japan"),
    ("Denso", "Japan"),
    ("Federal", "Indonesia"),
    ("Aspira", "Indonesia"),
    ("Bosch", "Germany"),
    ("KYB", "Japan"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./partsdesk_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("PartsDesk Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of parts to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./partsdesk_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("PartsDesk Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Parts:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let products = db.products();

    let mut brand_ids = Vec::with_capacity(BRANDS.len());
    for (name, country) in BRANDS {
        brand_ids.push(products.insert_brand(name, Some(*country)).await?.id);
    }

    let start = std::time::Instant::now();
    let mut generated = 0usize;

    'outer: for (code, category_name, parts) in CATEGORIES {
        let category = products.insert_category(category_name, None).await?;

        for (part_idx, part) in parts.iter().enumerate() {
            for (fit_idx, (fit_code, fitment)) in FITMENTS.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = generated * 31 + part_idx * 7 + fit_idx;
                let mut input = generate_part(code, part, fit_code, fitment, seed, generated);
                input.category_id = Some(category.id.clone());
                input.brand_id = Some(brand_ids[seed % brand_ids.len()].clone());

                if let Err(e) = products.insert(&input).await {
                    eprintln!("Failed to insert {}: {}", input.part_number, e);
                    continue;
                }

                generated += 1;
                if generated % 100 == 0 {
                    println!("  Generated {} parts...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} parts in {:?}", generated, elapsed);

    println!();
    println!("Verifying search...");
    println!("  'kampas': {} results", products.search("kampas", 20).await?.len());
    println!("  'NMAX':   {} results", products.search("NMAX", 20).await?.len());
    println!("  low stock: {}", products.count_low_stock().await?);

    println!();
    println!("✓ Seed complete!");
    Ok(())
}

/// Builds one part with deterministic pseudo-random price and stock.
fn generate_part(
    category_code: &str,
    part: &str,
    fit_code: &str,
    fitment: &str,
    seed: usize,
    index: usize,
) -> ProductInput {
    // Rp 15.000 - Rp 1.500.000 in Rp 500 steps
    let price = 15_000 + ((seed * 7919) % 2_971) as i64 * 500;
    let stock = (seed % 61) as i64;
    let min_stock = if seed % 3 == 0 { 10 } else { 5 };

    ProductInput {
        name: format!("{} {}", part, fitment),
        description: Some(format!("{} untuk {}", part, fitment)),
        price,
        stock,
        min_stock,
        category_id: None,
        brand_id: None,
        part_number: format!("{}-{}-{:04}", category_code, fit_code, index),
        barcode: Some(format!("899{:010}", index)),
        image_url: None,
        weight: Some(50 + (seed % 20) as i64 * 50),
        dimensions: None,
    }
}
