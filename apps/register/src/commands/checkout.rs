//! # Checkout Commands
//!
//! Turns the cart into a committed sale and a printable receipt.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(session, { method, tendered?, discount? })                   │
//! │     │                                                                   │
//! │     ├── role may use Kasir?            ── no ──► FORBIDDEN             │
//! │     ├── cashier has an open shift?     ── no ──► BUSINESS_LOGIC        │
//! │     ├── cart has lines?                ── no ──► CART_ERROR            │
//! │     ├── totals (PPN, discount, change)                                  │
//! │     │     cash below total?            ── yes ─► PAYMENT_ERROR         │
//! │     ├── commit_sale  (one SQL transaction)                              │
//! │     ├── take the sold lines off the cart                                │
//! │     └── Receipt + rendered text                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is written unless every step before the commit succeeds, and the
//! commit itself is all-or-nothing.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use partsdesk_core::receipt::{Receipt, ReceiptLine};
use partsdesk_core::totals::OrderTotals;
use partsdesk_core::{
    CoreError, Money, PaymentMethod, Section, Session, Transaction, TransactionItem,
};
use partsdesk_db::{NewSale, SaleLine};

use crate::error::ApiError;
use crate::state::{CartState, ConfigState, DbState};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
    /// Cash handed over. Defaults to the exact total.
    pub tendered: Option<Money>,
    pub discount: Option<Money>,
    pub customer_id: Option<String>,
    /// Printed on the receipt when given.
    pub customer_name: Option<String>,
    pub notes: Option<String>,
}

impl CheckoutRequest {
    pub fn new(payment_method: PaymentMethod) -> Self {
        CheckoutRequest {
            payment_method,
            tendered: None,
            discount: None,
            customer_id: None,
            customer_name: None,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
    pub receipt: Receipt,
    /// Plain text for the thermal printer.
    pub receipt_text: String,
}

/// Previews the totals for a payment without writing anything.
pub fn quote(
    cart: &CartState,
    config: &ConfigState,
    method: PaymentMethod,
    tendered: Option<Money>,
    discount: Option<Money>,
) -> Result<OrderTotals, ApiError> {
    let discount = discount.unwrap_or_default();
    Ok(cart.with_cart(|c| c.totals_at(method, tendered, discount, config.tax_rate))?)
}

/// Takes payment for the cart and commits the sale.
pub async fn checkout(
    db: &DbState,
    cart: &CartState,
    config: &ConfigState,
    session: &Session,
    request: CheckoutRequest,
) -> Result<CheckoutResponse, ApiError> {
    session.require(Section::Pos)?;

    let shift = db
        .inner()
        .shifts()
        .current(&session.user_id)
        .await?
        .ok_or_else(|| CoreError::ShiftNotOpen {
            staff_id: session.user_id.clone(),
        })?;

    let snapshot = cart.snapshot();
    if snapshot.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    let totals = snapshot.totals_at(
        request.payment_method,
        request.tendered,
        request.discount.unwrap_or_default(),
        config.tax_rate,
    )?;

    let sale = NewSale {
        staff_id: session.user_id.clone(),
        shift_id: Some(shift.id.clone()),
        customer_id: request.customer_id.clone(),
        notes: request.notes.clone(),
        payment_method: request.payment_method,
        totals,
        lines: snapshot.items.iter().map(SaleLine::from).collect(),
    };

    let committed = db.inner().transactions().commit_sale(&sale).await?;

    cart.with_cart_mut(|c| {
        c.remove_sold(&snapshot);
        if !c.is_empty() {
            warn!(
                lines = c.item_count(),
                "Cart changed during checkout; keeping the unsold lines"
            );
        }
    });

    let transaction = committed.transaction;
    let mut receipt = Receipt::from_cart(
        config.store_info(),
        transaction.receipt_number.clone(),
        config.local_time(transaction.transaction_date),
        session.full_name.clone(),
        &snapshot,
        totals,
        config.tax_rate,
        request.payment_method,
    );
    receipt.customer = request.customer_name;
    let receipt_text = receipt.render(config.paper_width, &config.currency);

    info!(
        receipt = %transaction.receipt_number,
        total = %config.format_currency(transaction.total()),
        method = %transaction.payment_method,
        cashier = %session.user_id,
        "Checkout complete"
    );

    Ok(CheckoutResponse {
        transaction,
        items: committed.items,
        receipt,
        receipt_text,
    })
}

/// Rebuilds the receipt of a past sale for reprinting.
pub async fn reprint_receipt(
    db: &DbState,
    config: &ConfigState,
    receipt_number: &str,
) -> Result<String, ApiError> {
    let repo = db.inner().transactions();
    let transaction = repo
        .get_by_receipt_number(receipt_number)
        .await?
        .ok_or_else(|| ApiError::not_found("Transaction", receipt_number))?;

    let products = db.inner().products();
    let mut lines = Vec::new();
    for item in repo.get_items(&transaction.id).await? {
        let product = products.get_by_id(&item.product_id).await?;
        let (name, part_number) = product
            .map(|p| (p.name, p.part_number))
            .unwrap_or_else(|| (item.product_id.clone(), String::new()));
        lines.push(ReceiptLine {
            name,
            part_number,
            quantity: item.quantity,
            unit_price: Money::from_minor(item.unit_price),
            subtotal: Money::from_minor(item.subtotal),
        });
    }

    let receipt = Receipt {
        store: config.store_info(),
        receipt_number: transaction.receipt_number.clone(),
        issued_at: config.local_time(transaction.transaction_date),
        cashier: transaction.staff_id.clone(),
        customer: None,
        lines,
        totals: OrderTotals {
            subtotal: Money::from_minor(transaction.subtotal),
            tax: Money::from_minor(transaction.tax),
            discount: Money::from_minor(transaction.discount),
            total: transaction.total(),
            tendered: Money::from_minor(transaction.payment_amount),
            change: Money::from_minor(transaction.change_amount),
        },
        tax_rate: config.tax_rate,
        payment_method: transaction.payment_method,
    };

    Ok(receipt.render(config.paper_width, &config.currency))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::add_to_cart;
    use crate::commands::fixtures::{self, cashier, warehouse};
    use crate::error::ErrorCode;

    async fn ready_counter() -> (DbState, CartState, ConfigState, String, String) {
        let db = fixtures::db().await;
        let cart = CartState::new();
        let config = ConfigState::default();
        let pad = fixtures::part(&db, "KR-BEAT", 50_000, 10).await;
        let disc = fixtures::part(&db, "CAKRAM-NMAX", 125_000, 3).await;

        db.inner()
            .shifts()
            .open(&cashier().user_id, Money::from_minor(500_000))
            .await
            .unwrap();
        add_to_cart(&db, &cart, &config, &pad.id, Some(2)).await.unwrap();
        add_to_cart(&db, &cart, &config, &disc.id, Some(1)).await.unwrap();
        (db, cart, config, pad.id, disc.id)
    }

    #[tokio::test]
    async fn test_cash_checkout() {
        let (db, cart, config, pad_id, disc_id) = ready_counter().await;

        let mut request = CheckoutRequest::new(PaymentMethod::Cash);
        request.tendered = Some(Money::from_minor(300_000));
        request.customer_name = Some("Pak Joko".into());

        let response = checkout(&db, &cart, &config, &cashier(), request).await.unwrap();

        let t = &response.transaction;
        assert_eq!(t.subtotal, 225_000);
        assert_eq!(t.tax, 24_750);
        assert_eq!(t.total_amount, 249_750);
        assert_eq!(t.change_amount, 50_250);
        assert!(t.shift_id.is_some());

        assert!(response.receipt_text.contains("Rp 249.750"));
        assert!(response.receipt_text.contains("Rp 50.250"));
        assert!(response.receipt_text.contains("Pak Joko"));
        assert!(cart.snapshot().is_empty());

        let products = db.inner().products();
        assert_eq!(products.get_by_id(&pad_id).await.unwrap().unwrap().stock, 8);
        assert_eq!(products.get_by_id(&disc_id).await.unwrap().unwrap().stock, 2);
    }

    #[tokio::test]
    async fn test_insufficient_cash_writes_nothing() {
        let (db, cart, config, pad_id, _) = ready_counter().await;

        let mut request = CheckoutRequest::new(PaymentMethod::Cash);
        request.tendered = Some(Money::from_minor(200_000));

        let err = checkout(&db, &cart, &config, &cashier(), request).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);

        assert_eq!(cart.snapshot().item_count(), 2);
        assert!(db.inner().transactions().recent(5).await.unwrap().is_empty());
        let pad = db.inner().products().get_by_id(&pad_id).await.unwrap().unwrap();
        assert_eq!(pad.stock, 10);
    }

    #[tokio::test]
    async fn test_checkout_requires_open_shift() {
        let db = fixtures::db().await;
        let cart = CartState::new();
        let config = ConfigState::default();
        let part = fixtures::part(&db, "BUSI-01", 25_000, 5).await;
        add_to_cart(&db, &cart, &config, &part.id, None).await.unwrap();

        let err = checkout(&db, &cart, &config, &cashier(), CheckoutRequest::new(PaymentMethod::Qris))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(cart.snapshot().item_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let db = fixtures::db().await;
        db.inner().shifts().open(&cashier().user_id, Money::zero()).await.unwrap();

        let err = checkout(
            &db,
            &CartState::new(),
            &ConfigState::default(),
            &cashier(),
            CheckoutRequest::new(PaymentMethod::Card),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[tokio::test]
    async fn test_warehouse_cannot_checkout() {
        let (db, cart, config, _, _) = ready_counter().await;
        let err = checkout(&db, &cart, &config, &warehouse(), CheckoutRequest::new(PaymentMethod::Card))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_discount_and_quote() {
        let (db, cart, config, _, _) = ready_counter().await;

        let quoted = quote(&cart, &config, PaymentMethod::Transfer, None, Some(Money::from_minor(9_750)))
            .unwrap();
        assert_eq!(quoted.total, Money::from_minor(240_000));
        assert_eq!(quoted.change, Money::zero());

        let mut request = CheckoutRequest::new(PaymentMethod::Transfer);
        request.discount = Some(Money::from_minor(9_750));
        let response = checkout(&db, &cart, &config, &cashier(), request).await.unwrap();
        assert_eq!(response.transaction.total_amount, 240_000);
        assert_eq!(response.transaction.discount, 9_750);
    }

    #[tokio::test]
    async fn test_reprint_receipt() {
        let (db, cart, config, _, _) = ready_counter().await;
        let response = checkout(&db, &cart, &config, &cashier(), CheckoutRequest::new(PaymentMethod::Card))
            .await
            .unwrap();

        let text = reprint_receipt(&db, &config, &response.transaction.receipt_number)
            .await
            .unwrap();
        assert!(text.contains(&response.transaction.receipt_number));
        assert!(text.contains("KR-BEAT"));

        let err = reprint_receipt(&db, &config, "TRX-NOPE").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
