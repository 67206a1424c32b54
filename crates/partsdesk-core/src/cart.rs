//! # Cart Module
//!
//! Shopping cart rules for the register screen.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Action              Rule                                               │
//! │  ─────────────────   ─────────────────────────────────────────────────  │
//! │  add_item            stock 0            → InsufficientStock             │
//! │                      already in cart    → quantity += n                 │
//! │                      above stock        → InsufficientStock             │
//! │                      above 999 per line → QuantityTooLarge              │
//! │                      101st line         → CartTooLarge                  │
//! │                                                                         │
//! │  update_quantity     0                  → line removed                  │
//! │                      n > current stock  → clamped to stock              │
//! │                      stock now 0        → line removed                  │
//! │                                                                         │
//! │  remove_sold         after checkout     → sold quantities taken off     │
//! │  remove_item / clear                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart freezes name, part number and price when a product is added, so
//! the receipt matches what the cashier saw even if the catalog changes
//! mid-sale. Stock is not frozen: callers pass the freshly read product to
//! `add_item` and `update_quantity`, and checkout re-reads it again.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::totals::{compute_order_totals_at_rate, LineItem, OrderTotals};
use crate::types::{PaymentMethod, Product, TaxRate};
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    pub product_id: String,
    pub part_number: String,
    pub name: String,
    /// Price at the moment the line was added.
    pub unit_price: i64,
    pub quantity: i64,
    /// Stock seen when the line was last touched; caps the quantity.
    pub available_stock: i64,
}

impl CartItem {
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            part_number: product.part_number.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            available_stock: product.stock,
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_minor(self.unit_price)
    }

    /// unit_price × quantity, saturating. Display only; checkout uses the
    /// checked calculator.
    pub fn line_total(&self) -> Money {
        Money::from_minor(self.unit_price.saturating_mul(self.quantity))
    }

    #[inline]
    pub fn line_item(&self) -> LineItem {
        LineItem::new(self.unit_price(), self.quantity)
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id`
/// - Every quantity is in `1..=min(available_stock, 999)`
/// - At most 100 lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds `quantity` of a product, merging with an existing line.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        let existing = self.items.iter().position(|i| i.product_id == product.id);
        let already = existing.map(|idx| self.items[idx].quantity).unwrap_or(0);
        let requested = already.saturating_add(quantity);

        if !product.can_sell(requested) {
            return Err(CoreError::InsufficientStock {
                product: product.part_number.clone(),
                available: product.stock.max(0),
                requested,
            });
        }

        if requested > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested,
                max: MAX_ITEM_QUANTITY,
            });
        }

        match existing {
            Some(idx) => {
                let item = &mut self.items[idx];
                item.quantity = requested;
                item.available_stock = product.stock;
            }
            None => {
                if self.items.len() >= MAX_CART_ITEMS {
                    return Err(CoreError::CartTooLarge {
                        max: MAX_CART_ITEMS,
                    });
                }
                self.items.push(CartItem::from_product(product, quantity));
            }
        }

        Ok(())
    }

    /// Sets a line's quantity against `product`'s current stock. Zero
    /// removes the line; anything above the stock is clamped down to it, and
    /// a line whose product has sold out in the meantime is removed.
    ///
    /// Returns the quantity that was actually stored (0 when removed).
    pub fn update_quantity(&mut self, product: &Product, quantity: i64) -> CoreResult<i64> {
        if quantity < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "quantity".to_string(),
            }
            .into());
        }

        let idx = self
            .items
            .iter()
            .position(|i| i.product_id == product.id)
            .ok_or_else(|| CoreError::ProductNotFound(product.id.clone()))?;

        let available = product.stock.max(0);
        let clamped = quantity.min(available);
        if clamped == 0 {
            self.items.remove(idx);
            return Ok(0);
        }

        if clamped > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: clamped,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let item = &mut self.items[idx];
        item.available_stock = available;
        item.quantity = clamped;
        Ok(clamped)
    }

    /// Takes the lines of a committed sale off this cart.
    ///
    /// Anything added while the sale was being written stays behind: a line
    /// keeps whatever quantity exceeds the sold one, and lines for products
    /// that were not in the sale are untouched.
    pub fn remove_sold(&mut self, sold: &Cart) {
        for sold_item in &sold.items {
            if let Some(item) = self
                .items
                .iter_mut()
                .find(|i| i.product_id == sold_item.product_id)
            {
                item.quantity -= sold_item.quantity;
            }
        }
        self.items.retain(|i| i.quantity > 0);
    }

    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == before {
            Err(CoreError::ProductNotFound(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Calculator input, one entry per line.
    pub fn line_items(&self) -> Vec<LineItem> {
        self.items.iter().map(CartItem::line_item).collect()
    }

    /// Totals at PPN without a discount.
    pub fn totals(&self, method: PaymentMethod, tendered: Option<Money>) -> CoreResult<OrderTotals> {
        self.totals_at(method, tendered, Money::zero(), TaxRate::ppn())
    }

    pub fn totals_at(
        &self,
        method: PaymentMethod,
        tendered: Option<Money>,
        discount: Money,
        rate: TaxRate,
    ) -> CoreResult<OrderTotals> {
        compute_order_totals_at_rate(&self.line_items(), method, tendered, discount, rate)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
