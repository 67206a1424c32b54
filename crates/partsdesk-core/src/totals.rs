//! # Order Totals
//!
//! Turns cart lines and a payment into the numbers printed on the receipt.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line_total = unit_price × quantity          (checked, per line)       │
//! │  subtotal   = Σ line_total                                             │
//! │  tax        = round_half_up(subtotal × 1100 / 10000)   PPN 11%         │
//! │  total      = subtotal + tax − discount                                │
//! │                                                                         │
//! │  Cash:      tendered defaults to total                                  │
//! │             tendered < total  → InsufficientPayment                     │
//! │             change = tendered − total                                   │
//! │  Otherwise: tendered defaults to total, change = 0                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tax is always taken on the subtotal before discount.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{PaymentMethod, TaxRate};

// =============================================================================
// Inputs and Outputs
// =============================================================================

/// One priced line going into the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub unit_price: Money,
    pub quantity: i64,
}

impl LineItem {
    #[inline]
    pub const fn new(unit_price: Money, quantity: i64) -> Self {
        LineItem {
            unit_price,
            quantity,
        }
    }
}

/// The money side of a finished order.
///
/// Always satisfies `total == subtotal + tax - discount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
    pub tendered: Money,
    pub change: Money,
}

// =============================================================================
// Calculator
// =============================================================================

/// Computes totals at PPN with no discount.
pub fn compute_order_totals(
    items: &[LineItem],
    method: PaymentMethod,
    tendered: Option<Money>,
) -> CoreResult<OrderTotals> {
    compute_order_totals_with_discount(items, method, tendered, Money::zero())
}

/// Computes totals at PPN with a flat order discount.
pub fn compute_order_totals_with_discount(
    items: &[LineItem],
    method: PaymentMethod,
    tendered: Option<Money>,
    discount: Money,
) -> CoreResult<OrderTotals> {
    compute_order_totals_at_rate(items, method, tendered, discount, TaxRate::ppn())
}

/// Computes totals at an explicit tax rate.
///
/// ## Errors
/// - `Validation` for a negative price, a non-positive quantity, a negative
///   discount, a discount larger than subtotal plus tax, or negative cash
/// - `AmountOverflow` if any sum leaves the i64 range
/// - `InsufficientPayment` for cash below the total
pub fn compute_order_totals_at_rate(
    items: &[LineItem],
    method: PaymentMethod,
    tendered: Option<Money>,
    discount: Money,
    rate: TaxRate,
) -> CoreResult<OrderTotals> {
    let subtotal = subtotal_of(items)?;

    let tax = subtotal
        .calculate_tax(rate)
        .ok_or(CoreError::AmountOverflow { context: "tax" })?;

    if discount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "discount".to_string(),
        }
        .into());
    }

    let gross = subtotal
        .checked_add(tax)
        .ok_or(CoreError::AmountOverflow { context: "total" })?;

    if discount > gross {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: gross.minor(),
        }
        .into());
    }

    let total = gross - discount;
    let tendered = tendered.unwrap_or(total);

    if tendered.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "payment_amount".to_string(),
        }
        .into());
    }

    let change = if method.gives_change() {
        if tendered < total {
            return Err(CoreError::InsufficientPayment { total, tendered });
        }
        tendered - total
    } else {
        Money::zero()
    };

    Ok(OrderTotals {
        subtotal,
        tax,
        discount,
        total,
        tendered,
        change,
    })
}

/// Σ unit_price × quantity with every step checked.
pub fn subtotal_of(items: &[LineItem]) -> CoreResult<Money> {
    items.iter().try_fold(Money::zero(), |acc, item| {
        if item.unit_price.is_negative() {
            return Err(ValidationError::MustNotBeNegative {
                field: "unit_price".to_string(),
            }
            .into());
        }
        if item.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }
        item.unit_price
            .checked_mul_qty(item.quantity)
            .and_then(|line| acc.checked_add(line))
            .ok_or(CoreError::AmountOverflow {
                context: "subtotal",
            })
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
