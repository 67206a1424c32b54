//! # Product Repository
//!
//! Database operations for the parts catalog.
//!
//! ## Key Operations
//! - Counter search by name, part number or scanned barcode
//! - Create and edit parts (stock edits land in the ledger)
//! - Soft delete
//! - Categories and brands
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier types / scans: "8991234567"                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  looks like a barcode? ── yes ──► exact barcode hit? ── yes ──► [hit]  │
//! │       │ no                                   │ no                       │
//! │       ▼                                      ▼                          │
//! │  name / part_number / barcode LIKE '%query%' (case-insensitive)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Active products ordered by name, up to `limit`                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use partsdesk_core::catalog::{like_pattern, looks_like_barcode};
use partsdesk_core::stock::{apply_stock_movement, StockChange};
use partsdesk_core::validation::{validate_product_input, validate_product_name, validate_search_query};
use partsdesk_core::{Brand, Category, MovementKind, Product, ProductInput};

use crate::error::{DbError, DbResult};
use crate::repository::{begin_write, generate_id};
use crate::repository::inventory::{append_movement, ledger_row};

/// Product columns plus the joined category and brand names.
const PRODUCT_SELECT: &str = r#"
    SELECT
        p.id, p.name, p.description, p.price, p.stock, p.min_stock,
        p.category_id, p.brand_id, p.part_number, p.barcode, p.image_url,
        p.weight, p.dimensions, p.is_active, p.created_at, p.updated_at,
        c.name AS category_name,
        b.name AS brand_name
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN brands b ON b.id = p.brand_id
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let hits = repo.search("brake pad", 20).await?;
/// let part = repo.get_by_part_number("BP-HND-001").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Searches active products.
    ///
    /// An empty query lists the catalog. A query that looks like a scanned
    /// barcode returns the exact match alone when there is one.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        if looks_like_barcode(&query) {
            if let Some(hit) = self.get_by_barcode(&query).await? {
                return Ok(vec![hit]);
            }
        }

        let sql = format!(
            r#"{PRODUCT_SELECT}
            WHERE p.is_active = 1
              AND (p.name LIKE ?1 ESCAPE '\'
                   OR p.part_number LIKE ?1 ESCAPE '\'
                   OR p.barcode LIKE ?1 ESCAPE '\')
            ORDER BY p.name
            LIMIT ?2"#
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(like_pattern(&query))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Active products sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.is_active = 1 ORDER BY p.name LIMIT ?1");
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Every active product, for the stock page.
    pub async fn list_all_active(&self) -> DbResult<Vec<Product>> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.is_active = 1 ORDER BY p.name");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Gets a product by id, including soft-deleted ones.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Exact barcode lookup among active products.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.barcode = ?1 AND p.is_active = 1 LIMIT 1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    pub async fn get_by_part_number(&self, part_number: &str) -> DbResult<Option<Product>> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.part_number = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(part_number.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Number of active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Number of active products at or below their reorder threshold.
    pub async fn count_low_stock(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE is_active = 1 AND stock <= min_stock",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Low-stock products, emptiest first.
    pub async fn low_stock(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "{PRODUCT_SELECT} WHERE p.is_active = 1 AND p.stock <= p.min_stock \
             ORDER BY p.stock ASC, p.name LIMIT ?1"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Creates a product.
    ///
    /// Opening stock above zero is written to the ledger as an `in` row so
    /// the ledger explains every unit on the shelf.
    ///
    /// ## Errors
    /// - `Domain(Validation)` for bad input
    /// - `UniqueViolation` for a part number already in use
    pub async fn insert(&self, input: &ProductInput) -> DbResult<Product> {
        validate_product_input(input)?;

        let id = generate_id();
        let now = Utc::now();
        let part_number = input.part_number.trim();

        debug!(id = %id, part_number = %part_number, "Inserting product");

        let mut tx = begin_write(&self.pool).await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price, stock, min_stock,
                category_id, brand_id, part_number, barcode, image_url,
                weight, dimensions, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 1, ?14, ?14)
            "#,
        )
        .bind(&id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .bind(input.min_stock)
        .bind(&input.category_id)
        .bind(&input.brand_id)
        .bind(part_number)
        .bind(&input.barcode)
        .bind(&input.image_url)
        .bind(input.weight)
        .bind(&input.dimensions)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| duplicate_part_number(e, part_number))?;

        if input.stock > 0 {
            let change = apply_stock_movement(0, MovementKind::In, input.stock);
            let row = ledger_row(
                &id,
                MovementKind::In,
                change,
                None,
                Some("initial stock".to_string()),
                now,
            );
            append_movement(&mut tx, &row).await?;
        }

        tx.commit().await.map_err(DbError::transaction)?;

        info!(id = %id, part_number = %part_number, "Product created");

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &id))
    }

    /// Replaces a product's editable fields.
    ///
    /// A changed stock count is recorded as an `adjustment` ledger row in
    /// the same transaction.
    pub async fn update(&self, id: &str, input: &ProductInput) -> DbResult<Product> {
        validate_product_input(input)?;

        let now = Utc::now();
        let part_number = input.part_number.trim();
        let mut tx = begin_write(&self.pool).await?;

        let previous: Option<i64> =
            sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1 AND is_active = 1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let previous = previous.ok_or_else(|| DbError::not_found("Product", id))?;

        sqlx::query(
            r#"
            UPDATE products SET
                name = ?2, description = ?3, price = ?4, stock = ?5, min_stock = ?6,
                category_id = ?7, brand_id = ?8, part_number = ?9, barcode = ?10,
                image_url = ?11, weight = ?12, dimensions = ?13, updated_at = ?14
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .bind(input.min_stock)
        .bind(&input.category_id)
        .bind(&input.brand_id)
        .bind(part_number)
        .bind(&input.barcode)
        .bind(&input.image_url)
        .bind(input.weight)
        .bind(&input.dimensions)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| duplicate_part_number(e, part_number))?;

        if previous != input.stock {
            let change = StockChange {
                new_stock: input.stock,
                ledger_delta: input.stock,
            };
            let row = ledger_row(
                id,
                MovementKind::Adjustment,
                change,
                None,
                Some(format!("edited from {previous}")),
                now,
            );
            append_movement(&mut tx, &row).await?;
        }

        tx.commit().await.map_err(DbError::transaction)?;

        info!(id = %id, "Product updated");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Hides a product from the catalog. Past sales keep referencing it.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(id = %id, "Product deactivated");
        Ok(())
    }

    // =========================================================================
    // Categories & Brands
    // =========================================================================

    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_brands(&self) -> DbResult<Vec<Brand>> {
        let rows = sqlx::query_as::<_, Brand>("SELECT id, name, country FROM brands ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn insert_category(&self, name: &str, description: Option<&str>) -> DbResult<Category> {
        validate_product_name(name)?;
        let category = Category {
            id: generate_id(),
            name: name.trim().to_string(),
            description: description.map(str::to_string),
        };

        sqlx::query("INSERT INTO categories (id, name, description) VALUES (?1, ?2, ?3)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(&category.description)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::duplicate("category", &category.name),
                other => other,
            })?;

        Ok(category)
    }

    pub async fn insert_brand(&self, name: &str, country: Option<&str>) -> DbResult<Brand> {
        validate_product_name(name)?;
        let brand = Brand {
            id: generate_id(),
            name: name.trim().to_string(),
            country: country.map(str::to_string),
        };

        sqlx::query("INSERT INTO brands (id, name, country) VALUES (?1, ?2, ?3)")
            .bind(&brand.id)
            .bind(&brand.name)
            .bind(&brand.country)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::duplicate("brand", &brand.name),
                other => other,
            })?;

        Ok(brand)
    }
}

fn duplicate_part_number(err: sqlx::Error, part_number: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } if field.ends_with("part_number") => {
            DbError::duplicate("part_number", part_number)
        }
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use partsdesk_core::CoreError;

    fn input(name: &str, part_number: &str, stock: i64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            part_number: part_number.to_string(),
            price: 150_000,
            stock,
            min_stock: 5,
            ..Default::default()
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_records_initial_stock() {
        let db = db().await;
        let product = db
            .products()
            .insert(&input("Brake Pad Front", "BP-HND-001", 12))
            .await
            .unwrap();

        assert_eq!(product.stock, 12);
        assert!(product.is_active);

        let history = db.inventory().history(&product.id, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].movement_type, MovementKind::In);
        assert_eq!(history[0].quantity, 12);
    }

    #[tokio::test]
    async fn test_insert_without_stock_has_no_ledger_row() {
        let db = db().await;
        let product = db
            .products()
            .insert(&input("Oil Filter", "OF-001", 0))
            .await
            .unwrap();
        assert!(db.inventory().history(&product.id, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_part_number() {
        let db = db().await;
        let repo = db.products();
        repo.insert(&input("Brake Pad Front", "BP-001", 1)).await.unwrap();

        let err = repo.insert(&input("Brake Pad Rear", "BP-001", 1)).await.unwrap_err();
        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "part_number");
                assert_eq!(value, "BP-001");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let db = db().await;
        let err = db.products().insert(&input("", "BP-001", 1)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_search_by_name_and_part_number() {
        let db = db().await;
        let repo = db.products();
        repo.insert(&input("Brake Pad Front", "BP-HND-001", 3)).await.unwrap();
        repo.insert(&input("Air Filter", "AF-YMH-002", 3)).await.unwrap();

        let hits = repo.search("brake", 20).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].part_number, "BP-HND-001");

        let hits = repo.search("ymh", 20).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Air Filter");

        assert_eq!(repo.search("", 20).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_agrees_with_in_memory_filter() {
        let db = db().await;
        let repo = db.products();
        repo.insert(&input("Brake Pad Front", "BP-HND-001", 3)).await.unwrap();
        repo.insert(&input("Brake Pad Rear", "BP-HND-002", 3)).await.unwrap();
        repo.insert(&input("Air Filter", "AF-YMH-002", 3)).await.unwrap();
        repo.insert(&input("Ölfilter Kawasaki", "OF-KWS-01", 3)).await.unwrap();
        let all = repo.list_all_active().await.unwrap();

        for query in ["pad", "hnd", "002", "FRONT", "filter x", "ÖL", "ölfilter", "kws"] {
            let mut sql: Vec<String> = repo
                .search(query, 20)
                .await
                .unwrap()
                .into_iter()
                .map(|p| p.id)
                .collect();
            let mut pure: Vec<String> = partsdesk_core::catalog::filter_products(&all, query)
                .into_iter()
                .map(|p| p.id.clone())
                .collect();
            sql.sort();
            pure.sort();
            assert_eq!(sql, pure, "query {:?}", query);
        }
    }

    #[tokio::test]
    async fn test_search_escapes_wildcards() {
        let db = db().await;
        let repo = db.products();
        repo.insert(&input("Brake Pad Front", "BP-001", 3)).await.unwrap();

        assert!(repo.search("%", 20).await.unwrap().is_empty());
        assert!(repo.search("_", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_by_scanned_barcode() {
        let db = db().await;
        let repo = db.products();
        let mut spark = input("Spark Plug", "SP-001", 3);
        spark.barcode = Some("8991234567890".into());
        repo.insert(&spark).await.unwrap();
        repo.insert(&input("Spark Plug Cap", "SP-002", 3)).await.unwrap();

        let hits = repo.search("8991234567890", 20).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].part_number, "SP-001");
    }

    #[tokio::test]
    async fn test_update_records_adjustment() {
        let db = db().await;
        let repo = db.products();
        let product = repo.insert(&input("Clutch Cable", "CC-001", 10)).await.unwrap();

        let mut edit = input("Clutch Cable Assy", "CC-001", 4);
        edit.price = 175_000;
        let updated = repo.update(&product.id, &edit).await.unwrap();

        assert_eq!(updated.name, "Clutch Cable Assy");
        assert_eq!(updated.stock, 4);
        assert_eq!(updated.price, 175_000);

        let history = db.inventory().history(&product.id, 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].movement_type, MovementKind::Adjustment);
        assert_eq!(history[0].quantity, 4);

        // same stock, no new ledger row
        edit.price = 180_000;
        repo.update(&product.id, &edit).await.unwrap();
        assert_eq!(db.inventory().history(&product.id, 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_product() {
        let db = db().await;
        let repo = db.products();
        let product = repo.insert(&input("Chain Kit", "CK-001", 2)).await.unwrap();

        repo.soft_delete(&product.id).await.unwrap();

        assert!(repo.search("chain", 20).await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 0);
        let hidden = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert!(!hidden.is_active);

        let err = repo.soft_delete(&product.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_low_stock() {
        let db = db().await;
        let repo = db.products();
        repo.insert(&input("Fuse 10A", "FS-10", 5)).await.unwrap();
        repo.insert(&input("Fuse 15A", "FS-15", 0)).await.unwrap();
        repo.insert(&input("Fuse 20A", "FS-20", 40)).await.unwrap();

        assert_eq!(repo.count_low_stock().await.unwrap(), 2);
        let low = repo.low_stock(10).await.unwrap();
        assert_eq!(low[0].part_number, "FS-15");
        assert_eq!(low[1].part_number, "FS-10");
    }

    #[tokio::test]
    async fn test_category_and_brand_names_are_joined() {
        let db = db().await;
        let repo = db.products();
        let category = repo.insert_category("Brakes", None).await.unwrap();
        let brand = repo.insert_brand("Brembo", Some("Italy")).await.unwrap();

        let mut pad = input("Brake Pad Front", "BP-001", 3);
        pad.category_id = Some(category.id.clone());
        pad.brand_id = Some(brand.id.clone());
        let product = repo.insert(&pad).await.unwrap();

        assert_eq!(product.category_name.as_deref(), Some("Brakes"));
        assert_eq!(product.brand_name.as_deref(), Some("Brembo"));
        assert_eq!(repo.list_categories().await.unwrap().len(), 1);

        let err = repo.insert_brand("Brembo", None).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
