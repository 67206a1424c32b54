//! # partsdesk-core: Pure Business Logic for PartsDesk
//!
//! Everything the register needs to decide, computed without touching a
//! database, the network or the clock (timestamps are passed in).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PartsDesk Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web front end                                │   │
//! │  │    Catalog ──► Cart ──► Checkout ──► Receipt    Shift   Stock   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 apps/register (commands)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ partsdesk-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   money   totals   stock   cart   shift   access   receipt      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 partsdesk-db (SQLite repositories)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money in integer minor units, tax rounding, display format
//! - [`totals`] - Checkout totals: subtotal, PPN, discount, total, change
//! - [`stock`] - Stock movement arithmetic and stock reports
//! - [`cart`] - Shopping cart rules
//! - [`shift`] - Shift cash-session rules
//! - [`access`] - Roles, sessions and role-filtered navigation
//! - [`catalog`] - Catalog text filter
//! - [`receipt`] - Receipt model and fixed-width text layout
//! - [`types`] - Persistent domain types (Product, Transaction, Shift, ...)
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use partsdesk_core::money::Money;
//! use partsdesk_core::totals::{compute_order_totals, LineItem};
//! use partsdesk_core::PaymentMethod;
//!
//! let items = [
//!     LineItem::new(Money::from_minor(50_000), 2),
//!     LineItem::new(Money::from_minor(125_000), 1),
//! ];
//! let totals = compute_order_totals(&items, PaymentMethod::Cash, Some(Money::from_minor(300_000)))
//!     .unwrap();
//!
//! assert_eq!(totals.subtotal.minor(), 225_000);
//! assert_eq!(totals.tax.minor(), 24_750);
//! assert_eq!(totals.total.minor(), 249_750);
//! assert_eq!(totals.change.minor(), 50_250);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod receipt;
pub mod shift;
pub mod stock;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{Section, Session, UserRole};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// PPN (Indonesian value-added tax) in basis points: 1100 = 11%.
///
/// Flat rate on the order subtotal; not compounded, not itemized per product.
pub const PPN_RATE_BPS: u32 = 1100;

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in the cart.
///
/// ## Business Reason
/// Prevents accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Number of shifts shown in a cashier's shift history.
pub const RECENT_SHIFT_LIMIT: u32 = 10;
