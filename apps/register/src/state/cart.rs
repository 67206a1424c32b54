//! # Cart State
//!
//! The counter's current cart.
//!
//! ## Thread Safety
//! The cart sits behind `Arc<Mutex<Cart>>`: commands may run concurrently
//! and only one may change the cart at a time. A poisoned lock is recovered,
//! since every cart mutation leaves the cart consistent before it can panic.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_to_cart ─┐                                                         │
//! │  update_item ─┼──► with_cart_mut(|cart| ...) ──► CartResponse           │
//! │  remove_item ─┤                                                         │
//! │  clear_cart ──┘                                                         │
//! │                                                                         │
//! │  get_cart ──────► with_cart(|cart| ...) ─────► CartResponse             │
//! │  checkout ──────► snapshot, commit, then clear                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use partsdesk_core::cart::{Cart, CartItem};
use partsdesk_core::{CoreResult, Money, PaymentMethod, TaxRate};

/// Running totals shown under the cart, before a payment method is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl CartTotals {
    pub fn of(cart: &Cart, rate: TaxRate) -> CoreResult<Self> {
        // non-cash: no tendered amount involved yet
        let totals = cart.totals_at(PaymentMethod::Card, None, Money::zero(), rate)?;
        Ok(CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
        })
    }
}

/// Cart contents plus totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
}

impl CartResponse {
    pub fn of(cart: &Cart, rate: TaxRate) -> CoreResult<Self> {
        Ok(CartResponse {
            items: cart.items.clone(),
            totals: CartTotals::of(cart, rate)?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new() -> Self {
        CartState::default()
    }

    /// Runs `f` with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Runs `f` with write access to the cart.
    ///
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|cart| cart.add_item(&product, 1))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    /// A copy of the cart as it is now.
    pub fn snapshot(&self) -> Cart {
        self.with_cart(Cart::clone)
    }
}
