//! # Repository Module
//!
//! Database repository implementations for PartsDesk.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Register command                                                      │
//! │       │  db.transactions().commit_sale(sale)                           │
//! │       ▼                                                                 │
//! │  TransactionRepository                                                 │
//! │  ├── BEGIN IMMEDIATE                                                   │
//! │  ├── INSERT transactions, transaction_items                            │
//! │  ├── UPDATE products.stock, INSERT inventory_movements                 │
//! │  └── COMMIT (or roll back on any error)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are built at runtime with `sqlx::query`/`query_as` and rows are
//! decoded through the `FromRow` derives on the core types.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog, categories, brands
//! - [`TransactionRepository`](transaction::TransactionRepository) - Atomic sale commit and history
//! - [`ShiftRepository`](shift::ShiftRepository) - Open, close and list shifts
//! - [`InventoryRepository`](inventory::InventoryRepository) - Stock movements and ledger
//! - [`ReportRepository`](report::ReportRepository) - Dashboard and stock page figures

pub mod inventory;
pub mod product;
pub mod report;
pub mod shift;
pub mod transaction;

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::{DbError, DbResult};

/// Opens a transaction holding SQLite's write lock from the start.
///
/// Every multi-step write here reads before it writes. Under a deferred
/// `BEGIN` the read-to-write upgrade fails with `SQLITE_BUSY` the moment
/// another writer holds the lock, and the busy timeout never applies.
/// `BEGIN IMMEDIATE` takes the lock up front, so concurrent writers queue
/// for up to `DbConfig::busy_timeout`.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    pool.begin_with("BEGIN IMMEDIATE")
        .await
        .map_err(DbError::transaction)
}

/// Generates a new entity id.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
