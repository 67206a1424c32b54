//! # State Module
//!
//! Application state for the register, split into focused types.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐   │
//! │  │   DbState    │ │  CartState   │ │ ConfigState  │ │ SessionState │   │
//! │  │              │ │              │ │              │ │              │   │
//! │  │ Database     │ │ Arc<Mutex<   │ │ read-only    │ │ Mutex<Option │   │
//! │  │ (pool)       │ │   Cart>>     │ │ after start  │ │  <Session>>  │   │
//! │  └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘   │
//! │                                                                         │
//! │  Each command takes only the state it needs.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod db;
mod session;

pub use cart::{CartResponse, CartState, CartTotals};
pub use config::ConfigState;
pub use db::DbState;
pub use session::SessionState;
