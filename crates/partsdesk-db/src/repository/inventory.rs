//! # Inventory Repository
//!
//! Manual stock movements and the stock ledger.
//!
//! ## Movement Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                 │
//! │    SELECT stock FROM products WHERE id = ?        (current)            │
//! │    apply_stock_movement(current, kind, qty)       (partsdesk-core)     │
//! │    UPDATE products SET stock = new_stock                               │
//! │    INSERT inventory_movements (kind, ledger_delta)                     │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock and ledger helpers here are shared with the sale commit and
//! product edits so every stock change leaves a ledger row.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use partsdesk_core::stock::{apply_stock_movement, validate_movement, StockChange, StockMovement};
use partsdesk_core::{CoreError, InventoryMovement, MovementKind};

use crate::error::{DbError, DbResult};
use crate::repository::{begin_write, generate_id};

const MOVEMENT_COLUMNS: &str = r#"
    SELECT id, product_id, movement_type, quantity,
           reference_type, reference_id, notes, created_at
    FROM inventory_movements
"#;

// =============================================================================
// Shared Helpers (run inside a caller's transaction)
// =============================================================================

/// Current stock of an active product, `None` when unknown or deleted.
pub(crate) async fn read_stock(conn: &mut SqliteConnection, product_id: &str) -> DbResult<Option<i64>> {
    let stock: Option<i64> =
        sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1 AND is_active = 1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(stock)
}

pub(crate) async fn write_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    new_stock: i64,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query("UPDATE products SET stock = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(product_id)
        .bind(new_stock)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", product_id));
    }
    Ok(())
}

pub(crate) async fn append_movement(
    conn: &mut SqliteConnection,
    movement: &InventoryMovement,
) -> DbResult<()> {
    debug!(
        product_id = %movement.product_id,
        kind = %movement.movement_type,
        quantity = movement.quantity,
        "Appending stock ledger row"
    );

    sqlx::query(
        r#"
        INSERT INTO inventory_movements (
            id, product_id, movement_type, quantity,
            reference_type, reference_id, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.product_id)
    .bind(movement.movement_type)
    .bind(movement.quantity)
    .bind(&movement.reference_type)
    .bind(&movement.reference_id)
    .bind(&movement.notes)
    .bind(movement.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Builds the ledger row for an applied change.
pub(crate) fn ledger_row(
    product_id: &str,
    kind: MovementKind,
    change: StockChange,
    reference: Option<(&str, &str)>,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> InventoryMovement {
    InventoryMovement {
        id: generate_id(),
        product_id: product_id.to_string(),
        movement_type: kind,
        quantity: change.ledger_delta,
        reference_type: reference.map(|(t, _)| t.to_string()),
        reference_id: reference.map(|(_, id)| id.to_string()),
        notes,
        created_at: now,
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for stock movements.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Applies a manual movement and writes its ledger row atomically.
    ///
    /// ## Returns
    /// The stock change and the ledger row that was written.
    ///
    /// ## Errors
    /// - `Domain(Validation)` for a bad quantity
    /// - `Domain(ProductNotFound)` for an unknown or deleted product
    pub async fn record_movement(
        &self,
        movement: &StockMovement,
    ) -> DbResult<(StockChange, InventoryMovement)> {
        validate_movement(movement.kind, movement.quantity)?;

        let now = Utc::now();
        let mut tx = begin_write(&self.pool).await?;

        let current = read_stock(&mut tx, &movement.product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(movement.product_id.clone()))?;

        let change = apply_stock_movement(current, movement.kind, movement.quantity);
        write_stock(&mut tx, &movement.product_id, change.new_stock, now).await?;

        let row = ledger_row(
            &movement.product_id,
            movement.kind,
            change,
            None,
            movement.notes.clone(),
            now,
        );
        append_movement(&mut tx, &row).await?;

        tx.commit().await.map_err(DbError::transaction)?;

        info!(
            product_id = %movement.product_id,
            kind = %movement.kind,
            from = current,
            to = change.new_stock,
            "Stock movement recorded"
        );

        Ok((change, row))
    }

    /// Ledger rows of one product, newest first.
    pub async fn history(&self, product_id: &str, limit: u32) -> DbResult<Vec<InventoryMovement>> {
        let sql = format!(
            "{MOVEMENT_COLUMNS} WHERE product_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2"
        );
        let rows = sqlx::query_as::<_, InventoryMovement>(&sql)
            .bind(product_id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Latest ledger rows across the catalog, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<InventoryMovement>> {
        let sql = format!("{MOVEMENT_COLUMNS} ORDER BY created_at DESC, rowid DESC LIMIT ?1");
        let rows = sqlx::query_as::<_, InventoryMovement>(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Ledger rows written by one sale.
    pub async fn for_transaction(&self, transaction_id: &str) -> DbResult<Vec<InventoryMovement>> {
        let sql = format!(
            "{MOVEMENT_COLUMNS} WHERE reference_type = ?1 AND reference_id = ?2 ORDER BY rowid"
        );
        let rows = sqlx::query_as::<_, InventoryMovement>(&sql)
            .bind(partsdesk_core::stock::SALE_REFERENCE)
            .bind(transaction_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use partsdesk_core::ProductInput;

    async fn setup(stock: i64) -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .insert(&ProductInput {
                name: "Spark Plug Iridium".into(),
                part_number: "SP-IR-01".into(),
                price: 95_000,
                stock,
                min_stock: 4,
                ..Default::default()
            })
            .await
            .unwrap();
        (db, product.id)
    }

    fn movement(product_id: &str, kind: MovementKind, quantity: i64) -> StockMovement {
        StockMovement {
            product_id: product_id.to_string(),
            kind,
            quantity,
            notes: Some("test".into()),
        }
    }

    #[tokio::test]
    async fn test_out_clamps_and_logs_negative_delta() {
        let (db, id) = setup(5).await;

        let (change, row) = db
            .inventory()
            .record_movement(&movement(&id, MovementKind::Out, 8))
            .await
            .unwrap();

        assert_eq!(change.new_stock, 0);
        assert_eq!(row.quantity, -8);
        let product = db.products().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(product.stock, 0);
    }

    #[tokio::test]
    async fn test_in_and_adjustment_set_stock() {
        let (db, id) = setup(5).await;

        db.inventory()
            .record_movement(&movement(&id, MovementKind::In, 20))
            .await
            .unwrap();
        assert_eq!(db.products().get_by_id(&id).await.unwrap().unwrap().stock, 20);

        db.inventory()
            .record_movement(&movement(&id, MovementKind::Adjustment, 7))
            .await
            .unwrap();
        assert_eq!(db.products().get_by_id(&id).await.unwrap().unwrap().stock, 7);
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let (db, id) = setup(5).await;
        let repo = db.inventory();
        repo.record_movement(&movement(&id, MovementKind::In, 10)).await.unwrap();
        repo.record_movement(&movement(&id, MovementKind::Out, 3)).await.unwrap();

        let history = repo.history(&id, 10).await.unwrap();
        // initial stock row + two movements
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].movement_type, MovementKind::Out);
        assert_eq!(history[0].quantity, -3);
        assert_eq!(history[1].movement_type, MovementKind::In);
    }

    #[tokio::test]
    async fn test_unknown_product_writes_nothing() {
        let (db, _) = setup(5).await;
        let err = db
            .inventory()
            .record_movement(&movement("missing", MovementKind::In, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(_))));
        assert_eq!(db.inventory().recent(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_quantity_is_rejected() {
        let (db, id) = setup(5).await;
        let err = db
            .inventory()
            .record_movement(&movement(&id, MovementKind::In, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_queue_instead_of_failing() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("partsdesk.db")).max_connections(8))
            .await
            .unwrap();
        let product = db
            .products()
            .insert(&ProductInput {
                name: "Oil Filter".into(),
                part_number: "OF-01".into(),
                price: 45_000,
                stock: 1000,
                ..Default::default()
            })
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..40 {
            let db = db.clone();
            let id = product.id.clone();
            handles.push(tokio::spawn(async move {
                db.inventory()
                    .record_movement(&movement(&id, MovementKind::Out, 1))
                    .await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 960);
        // opening stock row + one row per writer
        assert_eq!(db.inventory().history(&product.id, 100).await.unwrap().len(), 41);
        db.close().await;
    }
}
