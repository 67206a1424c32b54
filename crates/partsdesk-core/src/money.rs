//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  225000 * 0.11      = 24750.000000000004   (binary floating point)     │
//! │  summing many lines drifts a little further every time                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    225000 * 1100 bps / 10000 = 24750, rounded half away from zero      │
//! │    every intermediate value is exact                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The amount is stored in the currency's smallest unit. For rupiah the
//! register runs with zero decimals, so one minor unit is one rupiah; the
//! type itself does not care.
//!
//! ## Usage
//! ```rust
//! use partsdesk_core::money::Money;
//!
//! let price = Money::from_minor(125_000);
//! let line = price.checked_mul_qty(2).unwrap();
//! assert_eq!(line.minor(), 250_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: discounts and ledger corrections can be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Checked helpers**: checkout arithmetic goes through `checked_*` so an
///   absurd basket surfaces as an error instead of wrapping
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts two amounts, returning `None` on overflow.
    #[inline]
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Multiplies a unit price by a quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use partsdesk_core::money::Money;
    ///
    /// let oil_filter = Money::from_minor(45_000);
    /// assert_eq!(oil_filter.checked_mul_qty(3).unwrap().minor(), 135_000);
    /// assert!(Money::from_minor(i64::MAX).checked_mul_qty(2).is_none());
    /// ```
    #[inline]
    pub fn checked_mul_qty(self, qty: i64) -> Option<Money> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Calculates tax at `rate`, rounding half away from zero.
    ///
    /// ## Implementation
    /// `(|amount| * bps + 5000) / 10000`, sign reapplied afterwards, computed
    /// in i128 so the multiplication cannot overflow. Returns `None` only if
    /// the result does not fit back into i64 (rates above 100%).
    ///
    /// ## Example
    /// ```rust
    /// use partsdesk_core::money::Money;
    /// use partsdesk_core::types::TaxRate;
    ///
    /// let ppn = TaxRate::ppn();
    /// assert_eq!(Money::from_minor(225_000).calculate_tax(ppn).unwrap().minor(), 24_750);
    /// // 16.5 rounds up to 17
    /// assert_eq!(Money::from_minor(150).calculate_tax(ppn).unwrap().minor(), 17);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Option<Money> {
        let magnitude = (self.0 as i128).abs();
        let rounded = (magnitude * rate.bps() as i128 + 5_000) / 10_000;
        let signed = if self.0 < 0 { -rounded } else { rounded };
        i64::try_from(signed).ok().map(Money)
    }
}

// =============================================================================
// Currency Formatting
// =============================================================================

/// How amounts are shown to people: symbol, decimals and separators.
///
/// Defaults to Indonesian rupiah the way the id-ID locale prints it:
/// `Rp 1.250.000`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyFormat {
    pub symbol: String,
    pub decimals: u8,
    pub thousands_separator: char,
    pub decimal_separator: char,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat {
            symbol: "Rp".to_string(),
            decimals: 0,
            thousands_separator: '.',
            decimal_separator: ',',
        }
    }
}

impl CurrencyFormat {
    /// Formats an amount.
    ///
    /// ## Example
    /// ```rust
    /// use partsdesk_core::money::{CurrencyFormat, Money};
    ///
    /// let idr = CurrencyFormat::default();
    /// assert_eq!(idr.format(Money::from_minor(249_750)), "Rp 249.750");
    /// assert_eq!(idr.format(Money::from_minor(-5_000)), "-Rp 5.000");
    /// ```
    pub fn format(&self, amount: Money) -> String {
        let divisor = 10_u64.pow(self.decimals as u32);
        let magnitude = amount.minor().unsigned_abs();
        let whole = magnitude / divisor;
        let frac = magnitude % divisor;

        let digits = whole.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(self.thousands_separator);
            }
            grouped.push(ch);
        }

        let sign = if amount.is_negative() { "-" } else { "" };
        if self.decimals == 0 {
            format!("{}{} {}", sign, self.symbol, grouped)
        } else {
            format!(
                "{}{} {}{}{:0width$}",
                sign,
                self.symbol,
                grouped,
                self.decimal_separator,
                frac,
                width = self.decimals as usize
            )
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain minor-unit display, used in error messages and logs.
/// Use [`CurrencyFormat`] for anything a customer sees.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
