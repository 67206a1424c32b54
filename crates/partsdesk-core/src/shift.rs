//! # Shift Module
//!
//! Rules for a cashier's cash-drawer session.
//!
//! ```text
//! open_shift(opening_cash)          close_shift(closing_cash)
//!        │                                  │
//!        ▼                                  ▼
//!   status = open  ── sales link ──►  Σ total_amount, count
//!                     shift_id         status = closed
//! ```
//!
//! One open shift per staff member at a time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Shift;

/// Shifts listed on the Shift screen's history table.
pub const RECENT_SHIFT_LIMIT: u32 = 10;

/// What closing a shift records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShiftSummary {
    pub total_sales: Money,
    pub total_transactions: i64,
}

/// Sums the totals of a shift's transactions.
pub fn summarize_shift(transaction_totals: &[Money]) -> CoreResult<ShiftSummary> {
    let total_sales = transaction_totals
        .iter()
        .try_fold(Money::zero(), |acc, t| acc.checked_add(*t))
        .ok_or(CoreError::AmountOverflow {
            context: "shift sales",
        })?;

    Ok(ShiftSummary {
        total_sales,
        total_transactions: transaction_totals.len() as i64,
    })
}

/// Fails if `current` is an open shift.
pub fn ensure_can_open(current: Option<&Shift>, staff_id: &str) -> CoreResult<()> {
    match current {
        Some(shift) if shift.is_open() => Err(CoreError::ShiftAlreadyOpen {
            staff_id: staff_id.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Unwraps the staff member's open shift or fails with `ShiftNotOpen`.
pub fn require_open(current: Option<Shift>, staff_id: &str) -> CoreResult<Shift> {
    current
        .filter(Shift::is_open)
        .ok_or_else(|| CoreError::ShiftNotOpen {
            staff_id: staff_id.to_string(),
        })
}

/// Drawer counts may be zero but never negative.
pub fn validate_cash_count(field: &str, amount: Money) -> Result<(), ValidationError> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}
