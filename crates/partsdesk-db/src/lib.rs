//! # partsdesk-db: Database Layer for PartsDesk POS
//!
//! SQLite storage for the register, accessed through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PartsDesk Data Flow                              │
//! │                                                                         │
//! │  Register command (checkout)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  partsdesk-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │   │   │
//! │  │   │               │◄───│ Product        │   │              │   │   │
//! │  │   │ SqlitePool    │    │ Transaction    │   │ 001_initial  │   │   │
//! │  │   │ WAL, FKs on   │    │ Shift          │   │   _schema    │   │   │
//! │  │   │               │    │ Inventory      │   │              │   │   │
//! │  │   │               │    │ Report         │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (platform data dir)/partsdesk.db                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use partsdesk_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("partsdesk.db")).await?;
//! let parts = db.products().search("brake", 20).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::inventory::InventoryRepository;
pub use repository::product::ProductRepository;
pub use repository::report::{DashboardStats, ReportRepository};
pub use repository::shift::ShiftRepository;
pub use repository::transaction::{CommittedSale, NewSale, SaleLine, TransactionRepository};
