//! # Commands Module
//!
//! Every operation the front end can invoke.
//!
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── session.rs    ◄─── Sign in/out, navigation
//! ├── product.rs    ◄─── Catalog search and product CRUD
//! ├── cart.rs       ◄─── Cart manipulation
//! ├── checkout.rs   ◄─── Payment, sale commit, receipt
//! ├── shift.rs      ◄─── Open/close cash-drawer shifts
//! ├── stock.rs      ◄─── Stock movements and stock page
//! ├── dashboard.rs  ◄─── Dashboard figures
//! └── config.rs     ◄─── Store configuration
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs, and commands that touch
//! a guarded screen take the caller's `&Session`:
//! ```rust,ignore
//! // Only needs the cart
//! fn get_cart(cart: &CartState, config: &ConfigState)
//!
//! // Needs the database and who is asking
//! async fn open_shift(db: &DbState, session: &Session, opening_cash: Money)
//! ```

pub mod cart;
pub mod checkout;
pub mod config;
pub mod dashboard;
pub mod product;
pub mod session;
pub mod shift;
pub mod stock;
