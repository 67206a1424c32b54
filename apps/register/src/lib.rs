//! # PartsDesk Register
//!
//! Application layer of the PartsDesk counter: state holders and the
//! commands a front end invokes, on top of `partsdesk-core` and
//! `partsdesk-db`.
//!
//! ## Module Organization
//! ```text
//! partsdesk_register/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── auth.rs         ◄─── Access token validation
//! ├── error.rs        ◄─── API error type for commands
//! ├── state/
//! │   ├── db.rs       ◄─── Database wrapper
//! │   ├── cart.rs     ◄─── Current cart behind a Mutex
//! │   ├── config.rs   ◄─── Store settings from PARTSDESK_*
//! │   └── session.rs  ◄─── Signed-in user
//! └── commands/       ◄─── session, product, cart, checkout,
//!                          shift, stock, dashboard, config
//! ```
//!
//! ## State Management
//! Multiple focused state types rather than one `AppState`:
//!
//! ```text
//! ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐
//! │   DbState    │ │  CartState   │ │ ConfigState  │ │ SessionState │
//! │ • pool       │ │ • lines      │ │ • store info │ │ • user id    │
//! │ • repos      │ │ • Mutex      │ │ • PPN, Rp    │ │ • role       │
//! └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘
//! ```
//!
//! Each command asks only for the state it needs.

pub mod auth;
pub mod commands;
pub mod error;
pub mod state;

use std::path::PathBuf;

use chrono::Utc;
use directories::ProjectDirs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use partsdesk_db::{Database, DbConfig};
use state::{CartState, ConfigState, DbState, SessionState};

/// Everything a front end needs, created once at startup.
#[derive(Debug)]
pub struct Register {
    pub db: DbState,
    pub cart: CartState,
    pub config: ConfigState,
    pub session: SessionState,
}

impl Register {
    /// Opens the database (running migrations) and builds empty state.
    pub async fn open(config: ConfigState) -> Result<Self, Box<dyn std::error::Error>> {
        let db_path = database_path(&config)?;
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        info!("Database connected and migrations applied");

        Ok(Register {
            db: DbState::new(db),
            cart: CartState::new(),
            config,
            session: SessionState::new(),
        })
    }
}

/// Starts the register and handles one operator command.
///
/// ```text
/// register                   status: store, catalog, today's sales
/// register receipt <number>  reprint a past receipt
/// ```
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    info!("Starting PartsDesk register");

    let register = Register::open(ConfigState::from_env()).await?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("receipt") => {
            let number = args.get(1).ok_or("usage: register receipt <number>")?;
            let text =
                commands::checkout::reprint_receipt(&register.db, &register.config, number).await?;
            println!("{}", text);
        }
        Some(other) => return Err(format!("unknown command: {}", other).into()),
        None => print_status(&register).await?,
    }

    register.db.inner().close().await;
    Ok(())
}

async fn print_status(register: &Register) -> Result<(), Box<dyn std::error::Error>> {
    let config = &register.config;
    let db = register.db.inner();

    let since = config.start_of_day(Utc::now());
    let stats = db.reports().dashboard(since).await?;
    let stock = db.reports().stock_summary().await?;

    println!("{}", config.store_name);
    println!("  PPN:            {}", config.tax_rate.percent_label());
    println!("  Products:       {}", stats.product_count);
    println!("  Low stock:      {}", stats.low_stock_count);
    println!("  Out of stock:   {}", stock.out_of_stock);
    println!("  Stock value:    {}", config.format_currency(stock.inventory_value));
    println!("  Sales today:    {}", stats.today_transactions);
    println!("  Revenue today:  {}", config.format_currency(stats.today_revenue));
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=partsdesk=trace` - Trace for partsdesk crates only
/// - Default: INFO, DEBUG for partsdesk, WARN for sqlx
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,partsdesk=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Database file location.
///
/// - **Override**: `PARTSDESK_DB_PATH`
/// - **macOS**: `~/Library/Application Support/id.partsdesk.register/partsdesk.db`
/// - **Windows**: `%APPDATA%\partsdesk\register\data\partsdesk.db`
/// - **Linux**: `~/.local/share/register/partsdesk.db`
pub fn database_path(config: &ConfigState) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = &config.database_path {
        return Ok(path.clone());
    }

    let dirs = ProjectDirs::from("id", "partsdesk", "register")
        .ok_or("Could not determine app data directory")?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("partsdesk.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path_override() {
        let config = ConfigState {
            database_path: Some(PathBuf::from("/tmp/counter.db")),
            ..ConfigState::default()
        };
        assert_eq!(database_path(&config).unwrap(), PathBuf::from("/tmp/counter.db"));
    }
}
