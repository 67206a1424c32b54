//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Payment  │────►│ Receipt  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                               checkout.rs      │
//! │                   add_to_cart                                           │
//! │                   update_cart_item (0 removes, clamps to stock now)     │
//! │                   remove_from_cart                                      │
//! │                        │                                                │
//! │                   clear_cart ──────────────► back to empty              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The product is read fresh from the database on add, so the line carries
//! the current price and shelf count. Quantity changes read it again and
//! clamp to the shelf count at that moment.

use tracing::debug;

use crate::error::ApiError;
use crate::state::{CartResponse, CartState, ConfigState, DbState};

pub fn get_cart(cart: &CartState, config: &ConfigState) -> Result<CartResponse, ApiError> {
    Ok(cart.with_cart(|c| CartResponse::of(c, config.tax_rate))?)
}

/// Adds `quantity` (default 1) of a product, or bumps an existing line.
pub async fn add_to_cart(
    db: &DbState,
    cart: &CartState,
    config: &ConfigState,
    product_id: &str,
    quantity: Option<i64>,
) -> Result<CartResponse, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id = %product_id, quantity, "add_to_cart command");

    let product = db
        .inner()
        .products()
        .get_by_id(product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    cart.with_cart_mut(|c| {
        c.add_item(&product, quantity)?;
        CartResponse::of(c, config.tax_rate)
    })
    .map_err(ApiError::from)
}

/// Sets a line's quantity. Zero removes the line; more than the current
/// shelf count is clamped to it.
pub async fn update_cart_item(
    db: &DbState,
    cart: &CartState,
    config: &ConfigState,
    product_id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, quantity, "update_cart_item command");

    if quantity == 0 {
        return remove_from_cart(cart, config, product_id);
    }

    let product = db
        .inner()
        .products()
        .get_by_id(product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    cart.with_cart_mut(|c| {
        c.update_quantity(&product, quantity)?;
        CartResponse::of(c, config.tax_rate)
    })
    .map_err(ApiError::from)
}

pub fn remove_from_cart(
    cart: &CartState,
    config: &ConfigState,
    product_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, "remove_from_cart command");
    cart.with_cart_mut(|c| {
        c.remove_item(product_id)?;
        CartResponse::of(c, config.tax_rate)
    })
    .map_err(ApiError::from)
}

pub fn clear_cart(cart: &CartState, config: &ConfigState) -> Result<CartResponse, ApiError> {
    debug!("clear_cart command");
    cart.with_cart_mut(|c| {
        c.clear();
        CartResponse::of(c, config.tax_rate)
    })
    .map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use crate::error::ErrorCode;
    use partsdesk_core::stock::StockMovement;
    use partsdesk_core::{Money, MovementKind};

    #[tokio::test]
    async fn test_add_update_remove() {
        let db = fixtures::db().await;
        let cart = CartState::new();
        let config = ConfigState::default();
        let oil = fixtures::part(&db, "OLI-1L", 65_000, 4).await;

        let response = add_to_cart(&db, &cart, &config, &oil.id, None).await.unwrap();
        assert_eq!(response.totals.total_quantity, 1);

        let response = add_to_cart(&db, &cart, &config, &oil.id, Some(2)).await.unwrap();
        assert_eq!(response.items[0].quantity, 3);
        // 195_000 + 11%
        assert_eq!(response.totals.total, Money::from_minor(216_450));

        // clamped to the 4 on the shelf
        let response = update_cart_item(&db, &cart, &config, &oil.id, 10).await.unwrap();
        assert_eq!(response.items[0].quantity, 4);

        let response = update_cart_item(&db, &cart, &config, &oil.id, 0).await.unwrap();
        assert!(response.items.is_empty());

        let err = remove_from_cart(&cart, &config, &oil.id).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_update_clamps_to_stock_counted_after_add() {
        let db = fixtures::db().await;
        let cart = CartState::new();
        let config = ConfigState::default();
        let pad = fixtures::part(&db, "KAMPAS-DEPAN", 85_000, 10).await;
        add_to_cart(&db, &cart, &config, &pad.id, Some(1)).await.unwrap();

        // a stock count lowers the shelf to 2 while the line sits in the cart
        db.inner()
            .inventory()
            .record_movement(&StockMovement {
                product_id: pad.id.clone(),
                kind: MovementKind::Adjustment,
                quantity: 2,
                notes: None,
            })
            .await
            .unwrap();

        let response = update_cart_item(&db, &cart, &config, &pad.id, 10).await.unwrap();
        assert_eq!(response.items[0].quantity, 2);

        // sold out at the other counter
        db.inner()
            .inventory()
            .record_movement(&StockMovement {
                product_id: pad.id.clone(),
                kind: MovementKind::Adjustment,
                quantity: 0,
                notes: None,
            })
            .await
            .unwrap();

        let response = update_cart_item(&db, &cart, &config, &pad.id, 2).await.unwrap();
        assert!(response.items.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_stock_part_cannot_be_added() {
        let db = fixtures::db().await;
        let cart = CartState::new();
        let config = ConfigState::default();
        let empty = fixtures::part(&db, "AKI-GS", 350_000, 0).await;

        let err = add_to_cart(&db, &cart, &config, &empty.id, Some(1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(get_cart(&cart, &config).unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_deleted_product_cannot_be_added() {
        let db = fixtures::db().await;
        let cart = CartState::new();
        let config = ConfigState::default();
        let part = fixtures::part(&db, "RANTAI-428", 120_000, 5).await;
        db.inner().products().soft_delete(&part.id).await.unwrap();

        let err = add_to_cart(&db, &cart, &config, &part.id, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_clear_cart() {
        let db = fixtures::db().await;
        let cart = CartState::new();
        let config = ConfigState::default();
        let part = fixtures::part(&db, "SEKRING-10A", 2_500, 50).await;
        add_to_cart(&db, &cart, &config, &part.id, Some(5)).await.unwrap();

        let response = clear_cart(&cart, &config).unwrap();
        assert!(response.items.is_empty());
        assert_eq!(response.totals.total, Money::zero());
    }
}
