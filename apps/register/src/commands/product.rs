//! # Product Commands
//!
//! Catalog search for the counter and product maintenance for the back office.
//!
//! | Command | Screen |
//! |---|---|
//! | `search_products`, `get_product`, `get_product_by_part_number` | Produk, Kasir |
//! | `create_product`, `update_product`, `delete_product` | Atur Produk |
//! | `list_categories`, `list_brands` | any signed-in user |

use tracing::{debug, info};

use partsdesk_core::validation::validate_uuid;
use partsdesk_core::{Brand, Category, Product, ProductInput, Section, Session};

use crate::error::ApiError;
use crate::state::DbState;

/// Results per search when the caller gives no limit.
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;
const MAX_SEARCH_LIMIT: u32 = 500;

/// Searches active products by name, part number or barcode.
///
/// An empty query lists the catalog by name.
pub async fn search_products(
    db: &DbState,
    session: &Session,
    query: &str,
    limit: Option<u32>,
) -> Result<Vec<Product>, ApiError> {
    if !session.can_access(Section::Products) {
        session.require(Section::Pos)?;
    }

    let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);
    debug!(query = %query, limit, "search_products command");

    Ok(db.inner().products().search(query, limit).await?)
}

pub async fn get_product(db: &DbState, id: &str) -> Result<Product, ApiError> {
    validate_uuid(id).map_err(|e| ApiError::validation(e.to_string()))?;
    db.inner()
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))
}

pub async fn get_product_by_part_number(db: &DbState, part_number: &str) -> Result<Product, ApiError> {
    db.inner()
        .products()
        .get_by_part_number(part_number)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", part_number))
}

pub async fn create_product(
    db: &DbState,
    session: &Session,
    input: &ProductInput,
) -> Result<Product, ApiError> {
    session.require(Section::ProductManagement)?;

    let product = db.inner().products().insert(input).await?;
    info!(id = %product.id, by = %session.user_id, "create_product command");
    Ok(product)
}

pub async fn update_product(
    db: &DbState,
    session: &Session,
    id: &str,
    input: &ProductInput,
) -> Result<Product, ApiError> {
    session.require(Section::ProductManagement)?;

    let product = db.inner().products().update(id, input).await?;
    info!(id = %product.id, by = %session.user_id, "update_product command");
    Ok(product)
}

/// Soft-deletes a product. Its sales history stays intact.
pub async fn delete_product(db: &DbState, session: &Session, id: &str) -> Result<(), ApiError> {
    session.require(Section::ProductManagement)?;

    db.inner().products().soft_delete(id).await?;
    info!(id = %id, by = %session.user_id, "delete_product command");
    Ok(())
}

pub async fn list_categories(db: &DbState) -> Result<Vec<Category>, ApiError> {
    Ok(db.inner().products().list_categories().await?)
}

pub async fn list_brands(db: &DbState) -> Result<Vec<Brand>, ApiError> {
    Ok(db.inner().products().list_brands().await?)
}
