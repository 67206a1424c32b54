//! # Transaction Repository
//!
//! Sale commit and sale history.
//!
//! ## Atomic Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      commit_sale(NewSale)                               │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │   ├── shift given? ── must be open ──────────────► else ShiftNotOpen   │
//! │   ├── INSERT transactions (totals, receipt TRX-…)                      │
//! │   ├── for each line:                                                   │
//! │   │     ├── product active? ─────────────────────► else ProductNotFound│
//! │   │     ├── INSERT transaction_items                                   │
//! │   │     ├── UPDATE products.stock = max(0, stock − qty)                │
//! │   │     └── INSERT inventory_movements (out, −qty, "transaction", id)  │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Any error drops the transaction: nothing is written.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The totals arrive pre-computed by the calculator in `partsdesk-core`;
//! this layer persists them as given.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use partsdesk_core::cart::CartItem;
use partsdesk_core::receipt::format_receipt_number;
use partsdesk_core::stock::{apply_sale_deduction, SALE_REFERENCE};
use partsdesk_core::totals::OrderTotals;
use partsdesk_core::{
    CoreError, Money, MovementKind, PaymentMethod, ShiftStatus, Transaction, TransactionItem,
};

use crate::error::{DbError, DbResult};
use crate::repository::{begin_write, generate_id};
use crate::repository::inventory::{append_movement, ledger_row, read_stock, write_stock};

const TRANSACTION_SELECT: &str = r#"
    SELECT id, customer_id, staff_id, transaction_date, subtotal, tax, discount,
           total_amount, payment_method, payment_amount, change_amount, notes,
           shift_id, receipt_number
    FROM transactions
"#;

// =============================================================================
// Inputs / Outputs
// =============================================================================

/// One line to persist, priced at the moment of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl From<&CartItem> for SaleLine {
    fn from(item: &CartItem) -> Self {
        SaleLine {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price(),
        }
    }
}

/// A checked-out order ready to be written.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub staff_id: String,
    pub shift_id: Option<String>,
    pub customer_id: Option<String>,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
    pub totals: OrderTotals,
    pub lines: Vec<SaleLine>,
}

/// What `commit_sale` wrote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedSale {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
}

// =============================================================================
// Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Writes a sale, its items, the stock deductions and their ledger rows
    /// in one SQL transaction.
    ///
    /// ## Errors
    /// - `Domain(EmptyCart)` when there are no lines
    /// - `Domain(ShiftNotOpen)` when `shift_id` names a closed or unknown shift
    /// - `Domain(ProductNotFound)` when a line's product is unknown or deleted
    ///
    /// Stock never blocks the commit; a line larger than the shelf count
    /// leaves the product at zero.
    pub async fn commit_sale(&self, sale: &NewSale) -> DbResult<CommittedSale> {
        if sale.lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let uuid = Uuid::new_v4();
        let now = Utc::now();
        let transaction = Transaction {
            id: uuid.to_string(),
            customer_id: sale.customer_id.clone(),
            staff_id: sale.staff_id.clone(),
            transaction_date: now,
            subtotal: sale.totals.subtotal.minor(),
            tax: sale.totals.tax.minor(),
            discount: sale.totals.discount.minor(),
            total_amount: sale.totals.total.minor(),
            payment_method: sale.payment_method,
            payment_amount: sale.totals.tendered.minor(),
            change_amount: sale.totals.change.minor(),
            notes: sale.notes.clone(),
            shift_id: sale.shift_id.clone(),
            receipt_number: format_receipt_number(now, &uuid),
        };

        debug!(
            id = %transaction.id,
            receipt = %transaction.receipt_number,
            lines = sale.lines.len(),
            "Committing sale"
        );

        let mut tx = begin_write(&self.pool).await?;

        if let Some(shift_id) = sale.shift_id.as_deref() {
            ensure_shift_open(&mut tx, shift_id, &sale.staff_id).await?;
        }

        insert_header(&mut tx, &transaction).await?;

        let mut items = Vec::with_capacity(sale.lines.len());
        for line in &sale.lines {
            let item = insert_line(&mut tx, &transaction.id, line, now).await?;
            items.push(item);
        }

        tx.commit().await.map_err(DbError::transaction)?;

        info!(
            id = %transaction.id,
            receipt = %transaction.receipt_number,
            total = transaction.total_amount,
            method = %transaction.payment_method,
            "Sale committed"
        );

        Ok(CommittedSale { transaction, items })
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let sql = format!("{TRANSACTION_SELECT} WHERE id = ?1");
        let row = sqlx::query_as::<_, Transaction>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_by_receipt_number(&self, receipt_number: &str) -> DbResult<Option<Transaction>> {
        let sql = format!("{TRANSACTION_SELECT} WHERE receipt_number = ?1");
        let row = sqlx::query_as::<_, Transaction>(&sql)
            .bind(receipt_number.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_items(&self, transaction_id: &str) -> DbResult<Vec<TransactionItem>> {
        let rows = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT id, transaction_id, product_id, quantity, unit_price, subtotal
            FROM transaction_items
            WHERE transaction_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Latest sales, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Transaction>> {
        let sql = format!("{TRANSACTION_SELECT} ORDER BY transaction_date DESC, rowid DESC LIMIT ?1");
        let rows = sqlx::query_as::<_, Transaction>(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Sales rung up during a shift, oldest first.
    pub async fn for_shift(&self, shift_id: &str) -> DbResult<Vec<Transaction>> {
        let sql = format!("{TRANSACTION_SELECT} WHERE shift_id = ?1 ORDER BY transaction_date, rowid");
        let rows = sqlx::query_as::<_, Transaction>(&sql)
            .bind(shift_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

// =============================================================================
// Commit Steps
// =============================================================================

/// The sale's shift must be open and belong to the staff member ringing it up.
async fn ensure_shift_open(
    conn: &mut SqliteConnection,
    shift_id: &str,
    staff_id: &str,
) -> DbResult<()> {
    let status: Option<ShiftStatus> =
        sqlx::query_scalar("SELECT status FROM shifts WHERE id = ?1 AND staff_id = ?2")
            .bind(shift_id)
            .bind(staff_id)
            .fetch_optional(&mut *conn)
            .await?;

    match status {
        Some(ShiftStatus::Open) => Ok(()),
        _ => Err(CoreError::ShiftNotOpen {
            staff_id: staff_id.to_string(),
        }
        .into()),
    }
}

async fn insert_header(conn: &mut SqliteConnection, t: &Transaction) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO transactions (
            id, customer_id, staff_id, transaction_date, subtotal, tax, discount,
            total_amount, payment_method, payment_amount, change_amount, notes,
            shift_id, receipt_number
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
    )
    .bind(&t.id)
    .bind(&t.customer_id)
    .bind(&t.staff_id)
    .bind(t.transaction_date)
    .bind(t.subtotal)
    .bind(t.tax)
    .bind(t.discount)
    .bind(t.total_amount)
    .bind(t.payment_method)
    .bind(t.payment_amount)
    .bind(t.change_amount)
    .bind(&t.notes)
    .bind(&t.shift_id)
    .bind(&t.receipt_number)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_line(
    conn: &mut SqliteConnection,
    transaction_id: &str,
    line: &SaleLine,
    now: DateTime<Utc>,
) -> DbResult<TransactionItem> {
    let current = read_stock(&mut *conn, &line.product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

    let subtotal = line
        .unit_price
        .checked_mul_qty(line.quantity)
        .ok_or(CoreError::AmountOverflow {
            context: "line subtotal",
        })?;

    let item = TransactionItem {
        id: generate_id(),
        transaction_id: transaction_id.to_string(),
        product_id: line.product_id.clone(),
        quantity: line.quantity,
        unit_price: line.unit_price.minor(),
        subtotal: subtotal.minor(),
    };

    sqlx::query(
        r#"
        INSERT INTO transaction_items (id, transaction_id, product_id, quantity, unit_price, subtotal)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&item.id)
    .bind(&item.transaction_id)
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.subtotal)
    .execute(&mut *conn)
    .await?;

    let change = apply_sale_deduction(current, line.quantity);
    write_stock(&mut *conn, &line.product_id, change.new_stock, now).await?;

    let row = ledger_row(
        &line.product_id,
        MovementKind::Out,
        change,
        Some((SALE_REFERENCE, transaction_id)),
        None,
        now,
    );
    append_movement(&mut *conn, &row).await?;

    Ok(item)
}

// =============================================================================
// Unit Tests
// =============================================================================
