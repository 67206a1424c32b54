//! # Report Repository
//!
//! Read-only figures for the dashboard and the stock page.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────┬──────────────────────┐
//! │ Pendapatan hari ini  │ Transaksi hari ini   │ Stok menipis         │
//! │ Σ total_amount       │ COUNT(*)             │ stock <= min_stock   │
//! │ since start of day   │ since start of day   │ active products      │
//! └──────────────────────┴──────────────────────┴──────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use partsdesk_core::stock::{summarize_stock, StockSummary};
use partsdesk_core::{Money, Transaction};

use crate::error::DbResult;
use crate::repository::product::ProductRepository;
use crate::repository::transaction::TransactionRepository;

/// Latest sales listed on the dashboard.
pub const DASHBOARD_RECENT_LIMIT: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub today_revenue: Money,
    pub today_transactions: i64,
    pub low_stock_count: i64,
    pub product_count: i64,
    pub recent_transactions: Vec<Transaction>,
}

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Dashboard figures for sales made at or after `since`.
    ///
    /// The caller picks `since` (usually local midnight) so the store's
    /// timezone stays out of SQL.
    pub async fn dashboard(&self, since: DateTime<Utc>) -> DbResult<DashboardStats> {
        let (revenue, count): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_amount), 0), COUNT(*)
            FROM transactions
            WHERE transaction_date >= ?1
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        let products = ProductRepository::new(self.pool.clone());
        let stats = DashboardStats {
            today_revenue: Money::from_minor(revenue),
            today_transactions: count,
            low_stock_count: products.count_low_stock().await?,
            product_count: products.count().await?,
            recent_transactions: TransactionRepository::new(self.pool.clone())
                .recent(DASHBOARD_RECENT_LIMIT)
                .await?,
        };

        debug!(
            revenue = revenue,
            transactions = count,
            low_stock = stats.low_stock_count,
            "Dashboard stats loaded"
        );
        Ok(stats)
    }

    /// Header cards of the stock page, over active products.
    pub async fn stock_summary(&self) -> DbResult<StockSummary> {
        let products = ProductRepository::new(self.pool.clone()).list_all_active().await?;
        Ok(summarize_stock(&products)?)
    }
}
