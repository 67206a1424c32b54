//! # Receipt Module
//!
//! The customer's proof of payment, laid out as fixed-width text for
//! thermal printers.
//!
//! ## Layout (32 columns)
//! ```text
//! ┌────────────────────────────────┐
//! │          PARTSDESK POS         │  store header, centered
//! │   Jl. Raya Otomotif No. 123    │
//! │--------------------------------│
//! │No.   TRX-20240301083000-AB12CD │
//! │Tanggal:       01/03/2024 08:30 │
//! │Kasir:                     Budi │
//! │--------------------------------│
//! │Brake Pad Set Front             │  one block per line
//! │  2 x Rp 185.000     Rp 370.000 │
//! │  BRK-PAD-001                   │
//! │--------------------------------│
//! │Subtotal:            Rp 370.000 │
//! │PPN 11%:              Rp 40.700 │
//! │Diskon:              -Rp 10.000 │  only when discount > 0
//! │TOTAL:               Rp 400.700 │
//! │--------------------------------│
//! │Bayar (CASH):        Rp 500.000 │
//! │Kembalian:            Rp 99.300 │  cash only
//! └────────────────────────────────┘
//! ```

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::Cart;
use crate::money::{CurrencyFormat, Money};
use crate::totals::OrderTotals;
use crate::types::{PaymentMethod, TaxRate};

/// Standard 58mm thermal paper.
pub const DEFAULT_RECEIPT_WIDTH: usize = 32;

const FOOTER: &[&str] = &[
    "Terima kasih atas kunjungan Anda!",
    "Barang yang sudah dibeli tidak dapat dikembalikan kecuali ada perjanjian khusus",
];

/// `TRX-YYYYMMDDHHMMSS-XXXXXX`, the suffix taken from the transaction id.
pub fn format_receipt_number(at: DateTime<Utc>, transaction_id: &Uuid) -> String {
    let simple = transaction_id.simple().to_string().to_uppercase();
    format!("TRX-{}-{}", at.format("%Y%m%d%H%M%S"), &simple[..6])
}

// =============================================================================
// Receipt Model
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StoreInfo {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptLine {
    pub name: String,
    pub part_number: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Receipt {
    pub store: StoreInfo,
    pub receipt_number: String,
    /// Shop-local time.
    #[ts(as = "String")]
    pub issued_at: DateTime<FixedOffset>,
    pub cashier: String,
    pub customer: Option<String>,
    pub lines: Vec<ReceiptLine>,
    pub totals: OrderTotals,
    pub tax_rate: TaxRate,
    pub payment_method: PaymentMethod,
}

impl Receipt {
    /// Builds the receipt for a cart that was just paid for.
    #[allow(clippy::too_many_arguments)]
    pub fn from_cart(
        store: StoreInfo,
        receipt_number: String,
        issued_at: DateTime<FixedOffset>,
        cashier: String,
        cart: &Cart,
        totals: OrderTotals,
        tax_rate: TaxRate,
        payment_method: PaymentMethod,
    ) -> Self {
        let lines = cart
            .items
            .iter()
            .map(|item| ReceiptLine {
                name: item.name.clone(),
                part_number: item.part_number.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price(),
                subtotal: item.line_total(),
            })
            .collect();

        Receipt {
            store,
            receipt_number,
            issued_at,
            cashier,
            customer: None,
            lines,
            totals,
            tax_rate,
            payment_method,
        }
    }

    /// Renders the receipt as plain text, `width` columns wide.
    pub fn render(&self, width: usize, currency: &CurrencyFormat) -> String {
        let width = width.max(24);
        let rule = "-".repeat(width);
        let mut out: Vec<String> = Vec::new();

        out.push(center(&self.store.name.to_uppercase(), width));
        for line in wrap(&self.store.address, width) {
            out.push(center(&line, width));
        }
        if let Some(phone) = &self.store.phone {
            out.push(center(&format!("Telp: {}", phone), width));
        }
        out.push(rule.clone());

        out.extend(two_col("No.", &self.receipt_number, width));
        out.extend(two_col(
            "Tanggal:",
            &self.issued_at.format("%d/%m/%Y %H:%M").to_string(),
            width,
        ));
        out.extend(two_col("Kasir:", &self.cashier, width));
        if let Some(customer) = &self.customer {
            out.extend(two_col("Pelanggan:", customer, width));
        }
        out.push(rule.clone());

        for line in &self.lines {
            out.push(truncate(&line.name, width));
            out.extend(two_col(
                &format!(
                    "  {} x {}",
                    line.quantity,
                    currency.format(line.unit_price)
                ),
                &currency.format(line.subtotal),
                width,
            ));
            out.push(truncate(&format!("  {}", line.part_number), width));
        }
        out.push(rule.clone());

        let t = &self.totals;
        out.extend(two_col("Subtotal:", &currency.format(t.subtotal), width));
        out.extend(two_col(
            &format!("PPN {}:", self.tax_rate.percent_label()),
            &currency.format(t.tax),
            width,
        ));
        if t.discount.is_positive() {
            out.extend(two_col(
                "Diskon:",
                &currency.format(Money::zero() - t.discount),
                width,
            ));
        }
        out.extend(two_col("TOTAL:", &currency.format(t.total), width));
        out.push(rule.clone());

        out.extend(two_col(
            &format!("Bayar ({}):", self.payment_method.label().to_uppercase()),
            &currency.format(t.tendered),
            width,
        ));
        if self.payment_method.gives_change() {
            out.extend(two_col("Kembalian:", &currency.format(t.change), width));
        }
        out.push(rule);

        for text in FOOTER {
            for line in wrap(text, width) {
                out.push(center(&line, width));
            }
        }

        let mut rendered = out.join("\n");
        rendered.push('\n');
        rendered
    }
}

// =============================================================================
// Layout Helpers
// =============================================================================

fn width_of(s: &str) -> usize {
    s.chars().count()
}

fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

fn center(s: &str, width: usize) -> String {
    let s = truncate(s, width);
    let pad = (width - width_of(&s)) / 2;
    format!("{}{}", " ".repeat(pad), s).trim_end().to_string()
}

/// Label on the left, value flush right. Falls back to two lines when both
/// do not fit.
fn two_col(left: &str, right: &str, width: usize) -> Vec<String> {
    let (l, r) = (width_of(left), width_of(right));
    if l + r < width {
        vec![format!("{}{}{}", left, " ".repeat(width - l - r), right)]
    } else {
        let right = truncate(right, width);
        vec![
            truncate(left, width),
            format!("{:>w$}", right, w = width),
        ]
    }
}

/// Greedy word wrap.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            width_of(word)
        } else {
            width_of(&current) + 1 + width_of(word)
        };
        if needed > width && !current.is_empty() {
            lines.push(truncate(&std::mem::take(&mut current), width));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(truncate(&current, width));
    }
    lines
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn receipt(method: PaymentMethod, discount: i64) -> Receipt {
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        Receipt {
            store: StoreInfo {
                name: "PartsDesk POS".into(),
                address: "Jl. Raya Otomotif No. 123".into(),
                phone: None,
            },
            receipt_number: "TRX-20240301083000-AB12CD".into(),
            issued_at: wib.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap(),
            cashier: "Budi".into(),
            customer: None,
            lines: vec![ReceiptLine {
                name: "Brake Pad Set Front".into(),
                part_number: "BRK-PAD-001".into(),
                quantity: 2,
                unit_price: Money::from_minor(185_000),
                subtotal: Money::from_minor(370_000),
            }],
            totals: OrderTotals {
                subtotal: Money::from_minor(370_000),
                tax: Money::from_minor(40_700),
                discount: Money::from_minor(discount),
                total: Money::from_minor(410_700 - discount),
                tendered: Money::from_minor(500_000),
                change: Money::from_minor(if method == PaymentMethod::Cash {
                    89_300 + discount
                } else {
                    0
                }),
            },
            tax_rate: TaxRate::ppn(),
            payment_method: method,
        }
    }

    #[test]
    fn test_receipt_number_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let id = Uuid::parse_str("ab12cd34-0000-4000-8000-000000000000").unwrap();
        assert_eq!(format_receipt_number(at, &id), "TRX-20240301083000-AB12CD");
    }

    /// Some line is exactly `label ... value`, flush to both edges.
    fn has_row(text: &str, label: &str, value: &str, width: usize) -> bool {
        text.lines().any(|line| {
            line.starts_with(label) && line.ends_with(value) && line.chars().count() == width
        })
    }

    #[test]
    fn test_cash_receipt() {
        let text = receipt(PaymentMethod::Cash, 0).render(32, &CurrencyFormat::default());

        assert!(text.contains("PARTSDESK POS"));
        assert!(has_row(&text, "Tanggal:", "01/03/2024 08:30", 32));
        assert!(has_row(&text, "  2 x Rp 185.000", "Rp 370.000", 32));
        assert!(text.contains("  BRK-PAD-001"));
        assert!(has_row(&text, "PPN 11%:", "Rp 40.700", 32));
        assert!(has_row(&text, "TOTAL:", "Rp 410.700", 32));
        assert!(has_row(&text, "Bayar (CASH):", "Rp 500.000", 32));
        assert!(has_row(&text, "Kembalian:", "Rp 89.300", 32));
        assert!(!text.contains("Diskon"));
    }

    #[test]
    fn test_card_receipt_hides_change() {
        let text = receipt(PaymentMethod::Card, 0).render(32, &CurrencyFormat::default());
        assert!(text.contains("Bayar (CARD):"));
        assert!(!text.contains("Kembalian"));
    }

    #[test]
    fn test_discount_line() {
        let text = receipt(PaymentMethod::Qris, 10_700).render(32, &CurrencyFormat::default());
        assert!(has_row(&text, "Diskon:", "-Rp 10.700", 32));
        assert!(has_row(&text, "TOTAL:", "Rp 400.000", 32));
        assert!(text.contains("Bayar (QRIS):"));
    }

    #[test]
    fn test_lines_fit_width() {
        for width in [32, 40, 48] {
            let text = receipt(PaymentMethod::Cash, 5_000).render(width, &CurrencyFormat::default());
            for line in text.lines() {
                assert!(line.chars().count() <= width, "{line:?} wider than {width}");
            }
        }
    }

    #[test]
    fn test_two_col_overflow_wraps() {
        let lines = two_col("Pelanggan:", "Bengkel Sumber Rejeki Jaya Abadi", 32);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Pelanggan:");
        assert_eq!(lines[1].chars().count(), 32);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(
            wrap("Barang yang sudah dibeli tidak dapat", 16),
            vec!["Barang yang", "sudah dibeli", "tidak dapat"]
        );
    }
}
