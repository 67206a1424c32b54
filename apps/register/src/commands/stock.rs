//! # Stock Commands
//!
//! The Stok screen: stock-in, stock-out and count adjustments, the stock
//! overview with its header cards, and each part's movement ledger.
//!
//! ## Movement Semantics
//! ```text
//! kind         new stock                ledger quantity
//! ──────────   ──────────────────────   ───────────────
//! in           = quantity               +quantity
//! out          = max(0, stock - qty)    -quantity
//! adjustment   = quantity               +quantity
//! ```

use serde::Serialize;
use tracing::debug;

use partsdesk_core::stock::{StockChange, StockLevel, StockMovement, StockSummary};
use partsdesk_core::{InventoryMovement, Product, Section, Session};

use crate::error::ApiError;
use crate::state::DbState;

/// Ledger rows returned when the caller gives no limit.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementResponse {
    pub product: Product,
    pub change: StockChange,
    pub movement: InventoryMovement,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub product: Product,
    pub level: StockLevel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockOverview {
    pub summary: StockSummary,
    pub products: Vec<StockRow>,
}

/// Records a manual movement and returns the product as it now stands.
pub async fn record_stock_movement(
    db: &DbState,
    session: &Session,
    movement: &StockMovement,
) -> Result<MovementResponse, ApiError> {
    session.require(Section::Stock)?;
    debug!(
        product_id = %movement.product_id,
        kind = %movement.kind,
        quantity = movement.quantity,
        by = %session.user_id,
        "record_stock_movement command"
    );

    let (change, movement_row) = db.inner().inventory().record_movement(movement).await?;
    let product = db
        .inner()
        .products()
        .get_by_id(&movement.product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &movement.product_id))?;

    Ok(MovementResponse {
        product,
        change,
        movement: movement_row,
    })
}

/// Header cards plus every active product with its stock level, optionally
/// narrowed to one level.
pub async fn stock_overview(
    db: &DbState,
    session: &Session,
    level: Option<StockLevel>,
) -> Result<StockOverview, ApiError> {
    session.require(Section::Stock)?;

    let summary = db.inner().reports().stock_summary().await?;
    let products = db
        .inner()
        .products()
        .list_all_active()
        .await?
        .into_iter()
        .map(|product| StockRow {
            level: StockLevel::of(&product),
            product,
        })
        .filter(|row| level.map_or(true, |wanted| row.level == wanted))
        .collect();

    Ok(StockOverview { summary, products })
}

/// One product's ledger, newest first.
pub async fn movement_history(
    db: &DbState,
    session: &Session,
    product_id: &str,
    limit: Option<u32>,
) -> Result<Vec<InventoryMovement>, ApiError> {
    session.require(Section::Stock)?;
    let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Ok(db.inner().inventory().history(product_id, limit).await?)
}

/// Latest movements across the catalog.
pub async fn recent_movements(
    db: &DbState,
    session: &Session,
    limit: Option<u32>,
) -> Result<Vec<InventoryMovement>, ApiError> {
    session.require(Section::Stock)?;
    let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Ok(db.inner().inventory().recent(limit).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{self, cashier, owner, warehouse};
    use crate::error::ErrorCode;
    use partsdesk_core::{Money, MovementKind};

    fn movement(product_id: &str, kind: MovementKind, quantity: i64) -> StockMovement {
        StockMovement {
            product_id: product_id.to_string(),
            kind,
            quantity,
            notes: Some("opname".into()),
        }
    }

    #[tokio::test]
    async fn test_out_clamps_and_ledger_keeps_requested_quantity() {
        let db = fixtures::db().await;
        let part = fixtures::part(&db, "RANTAI-415", 95_000, 5).await;

        let response = record_stock_movement(&db, &warehouse(), &movement(&part.id, MovementKind::Out, 8))
            .await
            .unwrap();
        assert_eq!(response.product.stock, 0);
        assert_eq!(response.change.new_stock, 0);
        assert_eq!(response.movement.quantity, -8);
    }

    #[tokio::test]
    async fn test_in_sets_stock() {
        let db = fixtures::db().await;
        let part = fixtures::part(&db, "GEAR-SET", 210_000, 4).await;

        let response = record_stock_movement(&db, &owner(), &movement(&part.id, MovementKind::In, 12))
            .await
            .unwrap();
        assert_eq!(response.product.stock, 12);
        assert_eq!(response.movement.quantity, 12);

        let history = movement_history(&db, &owner(), &part.id, None).await.unwrap();
        // initial stock row + this one
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].movement_type, MovementKind::In);
        assert_eq!(history[0].quantity, 12);
    }

    #[tokio::test]
    async fn test_cashier_cannot_move_stock() {
        let db = fixtures::db().await;
        let part = fixtures::part(&db, "LAMPU-H4", 35_000, 6).await;

        let err = record_stock_movement(&db, &cashier(), &movement(&part.id, MovementKind::In, 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let db = fixtures::db().await;
        let err = record_stock_movement(&db, &warehouse(), &movement("nope", MovementKind::Adjustment, 3))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_overview_levels() {
        let db = fixtures::db().await;
        fixtures::part(&db, "HEALTHY", 10_000, 20).await;
        fixtures::part(&db, "LOW", 20_000, 2).await;
        fixtures::part(&db, "EMPTY", 30_000, 0).await;

        let overview = stock_overview(&db, &warehouse(), None).await.unwrap();
        assert_eq!(overview.summary.total_products, 3);
        assert_eq!(overview.summary.low_stock, 2);
        assert_eq!(overview.summary.out_of_stock, 1);
        assert_eq!(overview.summary.inventory_value, Money::from_minor(240_000));
        assert_eq!(overview.products.len(), 3);

        let empty = stock_overview(&db, &warehouse(), Some(StockLevel::OutOfStock))
            .await
            .unwrap();
        assert_eq!(empty.products.len(), 1);
        assert_eq!(empty.products[0].product.part_number, "EMPTY");

        assert_eq!(recent_movements(&db, &warehouse(), Some(10)).await.unwrap().len(), 2);
    }
}
