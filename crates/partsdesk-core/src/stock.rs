//! # Stock Module
//!
//! Stock movement arithmetic and the numbers on the stock page.
//!
//! ## Movement Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kind         new stock                    ledger delta                 │
//! │  ──────────   ──────────────────────────   ────────────                 │
//! │  in           quantity                     +quantity                    │
//! │  adjustment   quantity                     +quantity                    │
//! │  out          max(0, current − quantity)   −quantity                    │
//! │                                                                         │
//! │  A sale is an `out` movement referencing its transaction.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `in` replaces the count instead of adding to it. Receiving screens send the
//! new shelf count, not the delivered amount.
//!
//! The caller owns persistence: read the stock, apply, write the product and
//! the ledger row in one transaction.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{MovementKind, Product};
use crate::validation::{validate_non_negative, validate_quantity};

/// `reference_type` written on ledger rows produced by a sale.
pub const SALE_REFERENCE: &str = "transaction";

// =============================================================================
// Movement Arithmetic
// =============================================================================

/// A requested manual stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockMovement {
    pub product_id: String,
    pub kind: MovementKind,
    pub quantity: i64,
    pub notes: Option<String>,
}

/// Outcome of applying a movement to a stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockChange {
    pub new_stock: i64,
    /// Signed quantity for the ledger row.
    pub ledger_delta: i64,
}

/// Applies a movement.
///
/// ## Example
/// ```rust
/// use partsdesk_core::stock::apply_stock_movement;
/// use partsdesk_core::MovementKind;
///
/// let change = apply_stock_movement(5, MovementKind::Out, 8);
/// assert_eq!(change.new_stock, 0);
/// assert_eq!(change.ledger_delta, -8);
/// ```
pub fn apply_stock_movement(current_stock: i64, kind: MovementKind, quantity: i64) -> StockChange {
    match kind {
        MovementKind::In | MovementKind::Adjustment => StockChange {
            new_stock: quantity,
            ledger_delta: quantity,
        },
        MovementKind::Out => StockChange {
            new_stock: current_stock.saturating_sub(quantity).max(0),
            ledger_delta: quantity.saturating_neg(),
        },
    }
}

/// Stock after selling `quantity_sold` units. Never goes below zero.
#[inline]
pub fn apply_sale_deduction(current_stock: i64, quantity_sold: i64) -> StockChange {
    apply_stock_movement(current_stock, MovementKind::Out, quantity_sold)
}

/// Checks a quantity for a movement kind.
///
/// `adjustment` may set the count to zero; `in` and `out` need a positive
/// quantity.
pub fn validate_movement(kind: MovementKind, quantity: i64) -> Result<(), ValidationError> {
    match kind {
        MovementKind::Adjustment => validate_non_negative("quantity", quantity),
        MovementKind::In | MovementKind::Out => validate_quantity(quantity),
    }
}

// =============================================================================
// Stock Reports
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StockLevel {
    OutOfStock,
    Low,
    Healthy,
}

impl StockLevel {
    /// Out of stock wins over low.
    pub fn classify(stock: i64, min_stock: i64) -> Self {
        if stock <= 0 {
            StockLevel::OutOfStock
        } else if stock <= min_stock {
            StockLevel::Low
        } else {
            StockLevel::Healthy
        }
    }

    pub fn of(product: &Product) -> Self {
        StockLevel::classify(product.stock, product.min_stock)
    }
}

/// `stock <= min_stock`. Includes empty shelves.
#[inline]
pub fn is_low_stock(product: &Product) -> bool {
    product.stock <= product.min_stock
}

#[inline]
pub fn is_out_of_stock(product: &Product) -> bool {
    product.stock == 0
}

/// Σ price × stock.
pub fn inventory_value(products: &[Product]) -> CoreResult<Money> {
    products.iter().try_fold(Money::zero(), |acc, p| {
        p.price()
            .checked_mul_qty(p.stock)
            .and_then(|v| acc.checked_add(v))
            .ok_or(CoreError::AmountOverflow {
                context: "inventory value",
            })
    })
}

/// Header cards of the stock page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockSummary {
    pub total_products: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub inventory_value: Money,
}

pub fn summarize_stock(products: &[Product]) -> CoreResult<StockSummary> {
    Ok(StockSummary {
        total_products: products.len(),
        low_stock: products.iter().filter(|p| is_low_stock(p)).count(),
        out_of_stock: products.iter().filter(|p| is_out_of_stock(p)).count(),
        inventory_value: inventory_value(products)?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn product(price: i64, stock: i64, min_stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Oil Filter".to_string(),
            description: None,
            price,
            stock,
            min_stock,
            category_id: None,
            brand_id: None,
            part_number: "OF-001".to_string(),
            barcode: None,
            image_url: None,
            weight: None,
            dimensions: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            category_name: None,
            brand_name: None,
        }
    }

    #[test]
    fn test_out_clamps_at_zero() {
        let change = apply_stock_movement(5, MovementKind::Out, 8);
        assert_eq!(change, StockChange { new_stock: 0, ledger_delta: -8 });
    }

    #[test]
    fn test_out_subtracts() {
        let change = apply_stock_movement(10, MovementKind::Out, 3);
        assert_eq!(change, StockChange { new_stock: 7, ledger_delta: -3 });
    }

    #[test]
    fn test_in_sets_stock() {
        let change = apply_stock_movement(10, MovementKind::In, 4);
        assert_eq!(change, StockChange { new_stock: 4, ledger_delta: 4 });
    }

    #[test]
    fn test_adjustment_sets_stock() {
        let change = apply_stock_movement(10, MovementKind::Adjustment, 0);
        assert_eq!(change, StockChange { new_stock: 0, ledger_delta: 0 });
    }

    #[test]
    fn test_sale_deduction_is_an_out_movement() {
        assert_eq!(apply_sale_deduction(12, 2), apply_stock_movement(12, MovementKind::Out, 2));
        assert_eq!(apply_sale_deduction(1, 2).new_stock, 0);
    }

    #[test]
    fn test_validate_movement() {
        assert!(validate_movement(MovementKind::Adjustment, 0).is_ok());
        assert!(validate_movement(MovementKind::Adjustment, -1).is_err());
        assert!(validate_movement(MovementKind::In, 0).is_err());
        assert!(validate_movement(MovementKind::Out, 3).is_ok());
    }

    #[test]
    fn test_classify() {
        assert_eq!(StockLevel::classify(0, 5), StockLevel::OutOfStock);
        assert_eq!(StockLevel::classify(5, 5), StockLevel::Low);
        assert_eq!(StockLevel::classify(6, 5), StockLevel::Healthy);
        assert_eq!(StockLevel::classify(0, 0), StockLevel::OutOfStock);
    }

    #[test]
    fn test_summary() {
        let products = vec![
            product(45_000, 10, 5),
            product(185_000, 2, 4),
            product(30_000, 0, 3),
        ];
        let summary = summarize_stock(&products).unwrap();
        assert_eq!(summary.total_products, 3);
        assert_eq!(summary.low_stock, 2);
        assert_eq!(summary.out_of_stock, 1);
        assert_eq!(summary.inventory_value, Money::from_minor(450_000 + 370_000));
    }

    #[test]
    fn test_inventory_value_overflow() {
        let products = vec![product(i64::MAX, 2, 0)];
        assert!(matches!(
            inventory_value(&products),
            Err(CoreError::AmountOverflow { .. })
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        #[test]
        fn out_never_goes_negative(current in 0i64..100_000, qty in 1i64..200_000) {
            let change = apply_stock_movement(current, MovementKind::Out, qty);
            prop_assert!(change.new_stock >= 0);
            prop_assert_eq!(change.ledger_delta, -qty);
            if qty > current {
                prop_assert_eq!(change.new_stock, 0);
            } else {
                prop_assert_eq!(change.new_stock, current - qty);
            }
        }

        #[test]
        fn in_and_adjustment_agree(current in 0i64..100_000, qty in 0i64..100_000) {
            prop_assert_eq!(
                apply_stock_movement(current, MovementKind::In, qty),
                apply_stock_movement(current, MovementKind::Adjustment, qty)
            );
        }
    }
}
