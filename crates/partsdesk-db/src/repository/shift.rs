//! # Shift Repository
//!
//! Cash-drawer sessions.
//!
//! ## Shift Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  open(staff, opening_cash)                                             │
//! │     └── Shift { status: open, totals: NULL }                           │
//! │                                                                         │
//! │  ... sales carry shift_id ...                                          │
//! │                                                                         │
//! │  close(staff, closing_cash)                                            │
//! │     ├── Σ total_amount of the shift's transactions                     │
//! │     └── Shift { status: closed, end_time, total_sales,                 │
//! │                 total_transactions, closing_cash }                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! At most one open shift per staff member; the partial unique index
//! `idx_shifts_one_open` backs the check made here.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use partsdesk_core::shift::{ensure_can_open, require_open, summarize_shift, validate_cash_count};
use partsdesk_core::{CoreError, Money, Shift, ShiftStatus};

use crate::error::{DbError, DbResult};
use crate::repository::{begin_write, generate_id};

const SHIFT_SELECT: &str = r#"
    SELECT id, staff_id, start_time, end_time, opening_cash, closing_cash,
           total_sales, total_transactions, status
    FROM shifts
"#;

#[derive(Debug, Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ShiftRepository { pool }
    }

    /// Opens a shift for `staff_id`.
    ///
    /// ## Errors
    /// - `Domain(ShiftAlreadyOpen)` if the staff member already has one
    /// - `Domain(Validation)` for a negative opening count
    pub async fn open(&self, staff_id: &str, opening_cash: Money) -> DbResult<Shift> {
        validate_cash_count("opening_cash", opening_cash)?;

        let mut tx = begin_write(&self.pool).await?;

        let current = open_shift_of(&mut tx, staff_id).await?;
        ensure_can_open(current.as_ref(), staff_id)?;

        let shift = Shift {
            id: generate_id(),
            staff_id: staff_id.to_string(),
            start_time: Utc::now(),
            end_time: None,
            opening_cash: opening_cash.minor(),
            closing_cash: None,
            total_sales: None,
            total_transactions: None,
            status: ShiftStatus::Open,
        };

        sqlx::query(
            r#"
            INSERT INTO shifts (id, staff_id, start_time, opening_cash, status)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&shift.id)
        .bind(&shift.staff_id)
        .bind(shift.start_time)
        .bind(shift.opening_cash)
        .bind(shift.status)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            // lost a race with another register
            DbError::UniqueViolation { .. } => DbError::Domain(CoreError::ShiftAlreadyOpen {
                staff_id: staff_id.to_string(),
            }),
            other => other,
        })?;

        tx.commit().await.map_err(DbError::transaction)?;

        info!(shift_id = %shift.id, staff_id = %staff_id, opening_cash = shift.opening_cash, "Shift opened");
        Ok(shift)
    }

    /// Closes the staff member's open shift and records its totals.
    ///
    /// ## Errors
    /// - `Domain(ShiftNotOpen)` if there is nothing to close
    pub async fn close(&self, staff_id: &str, closing_cash: Money) -> DbResult<Shift> {
        validate_cash_count("closing_cash", closing_cash)?;

        let mut tx = begin_write(&self.pool).await?;

        let current = open_shift_of(&mut tx, staff_id).await?;
        let mut shift = require_open(current, staff_id)?;

        let totals: Vec<i64> =
            sqlx::query_scalar("SELECT total_amount FROM transactions WHERE shift_id = ?1")
                .bind(&shift.id)
                .fetch_all(&mut *tx)
                .await?;
        let totals: Vec<Money> = totals.into_iter().map(Money::from_minor).collect();
        let summary = summarize_shift(&totals)?;

        debug!(
            shift_id = %shift.id,
            transactions = summary.total_transactions,
            sales = summary.total_sales.minor(),
            "Closing shift"
        );

        let now = Utc::now();
        shift.end_time = Some(now);
        shift.closing_cash = Some(closing_cash.minor());
        shift.total_sales = Some(summary.total_sales.minor());
        shift.total_transactions = Some(summary.total_transactions);
        shift.status = ShiftStatus::Closed;

        sqlx::query(
            r#"
            UPDATE shifts SET
                end_time = ?2, closing_cash = ?3, total_sales = ?4,
                total_transactions = ?5, status = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&shift.id)
        .bind(shift.end_time)
        .bind(shift.closing_cash)
        .bind(shift.total_sales)
        .bind(shift.total_transactions)
        .bind(shift.status)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.map_err(DbError::transaction)?;

        info!(shift_id = %shift.id, staff_id = %staff_id, "Shift closed");
        Ok(shift)
    }

    /// The staff member's open shift, if any.
    pub async fn current(&self, staff_id: &str) -> DbResult<Option<Shift>> {
        let mut conn = self.pool.acquire().await?;
        open_shift_of(&mut conn, staff_id).await
    }

    /// The staff member's latest shifts, newest first.
    pub async fn recent(&self, staff_id: &str, limit: u32) -> DbResult<Vec<Shift>> {
        let sql = format!(
            "{SHIFT_SELECT} WHERE staff_id = ?1 ORDER BY start_time DESC, rowid DESC LIMIT ?2"
        );
        let rows = sqlx::query_as::<_, Shift>(&sql)
            .bind(staff_id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Shift>> {
        let sql = format!("{SHIFT_SELECT} WHERE id = ?1");
        let row = sqlx::query_as::<_, Shift>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

async fn open_shift_of(conn: &mut SqliteConnection, staff_id: &str) -> DbResult<Option<Shift>> {
    let sql = format!(
        "{SHIFT_SELECT} WHERE staff_id = ?1 AND status = 'open' ORDER BY start_time DESC LIMIT 1"
    );
    let row = sqlx::query_as::<_, Shift>(&sql)
        .bind(staff_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::transaction::{NewSale, SaleLine};
    use partsdesk_core::totals::{compute_order_totals, LineItem};
    use partsdesk_core::{PaymentMethod, ProductInput};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_open_and_current() {
        let db = db().await;
        let shifts = db.shifts();

        assert!(shifts.current("staff-1").await.unwrap().is_none());

        let shift = shifts.open("staff-1", Money::from_minor(300_000)).await.unwrap();
        assert!(shift.is_open());

        let current = shifts.current("staff-1").await.unwrap().unwrap();
        assert_eq!(current.id, shift.id);
        assert_eq!(current.opening_cash, 300_000);
        assert!(current.total_sales.is_none());
    }

    #[tokio::test]
    async fn test_second_open_is_rejected() {
        let db = db().await;
        let shifts = db.shifts();
        shifts.open("staff-1", Money::zero()).await.unwrap();

        let err = shifts.open("staff-1", Money::zero()).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ShiftAlreadyOpen { .. })));

        // other staff are independent
        shifts.open("staff-2", Money::zero()).await.unwrap();
    }

    #[tokio::test]
    async fn test_close_without_open_shift() {
        let db = db().await;
        let err = db.shifts().close("staff-1", Money::zero()).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ShiftNotOpen { .. })));
    }

    #[tokio::test]
    async fn test_negative_opening_cash() {
        let db = db().await;
        let err = db.shifts().open("staff-1", Money::from_minor(-1)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_close_sums_shift_sales() {
        let db = db().await;
        let shift = db.shifts().open("staff-1", Money::from_minor(200_000)).await.unwrap();
        let part = db
            .products()
            .insert(&ProductInput {
                name: "Wiper Blade 18in".into(),
                part_number: "WB-18".into(),
                price: 50_000,
                stock: 10,
                ..Default::default()
            })
            .await
            .unwrap();

        for qty in [1, 2] {
            let totals =
                compute_order_totals(&[LineItem::new(part.price(), qty)], PaymentMethod::Card, None)
                    .unwrap();
            db.transactions()
                .commit_sale(&NewSale {
                    staff_id: "staff-1".into(),
                    shift_id: Some(shift.id.clone()),
                    customer_id: None,
                    notes: None,
                    payment_method: PaymentMethod::Card,
                    totals,
                    lines: vec![SaleLine {
                        product_id: part.id.clone(),
                        quantity: qty,
                        unit_price: part.price(),
                    }],
                })
                .await
                .unwrap();
        }

        let closed = db.shifts().close("staff-1", Money::from_minor(200_000)).await.unwrap();
        assert_eq!(closed.status, ShiftStatus::Closed);
        assert_eq!(closed.total_transactions, Some(2));
        // 50_000 × 3 = 150_000, +11% = 166_500
        assert_eq!(closed.total_sales, Some(166_500));
        assert!(closed.end_time.is_some());

        let stored = db.shifts().get_by_id(&shift.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ShiftStatus::Closed);
        assert!(db.shifts().current("staff-1").await.unwrap().is_none());

        // reopening after close is fine
        db.shifts().open("staff-1", Money::zero()).await.unwrap();
        assert_eq!(db.shifts().recent("staff-1", 10).await.unwrap().len(), 2);
    }
}
