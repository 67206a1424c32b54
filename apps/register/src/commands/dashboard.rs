//! # Dashboard Commands
//!
//! Today's revenue and transaction count, low-stock and product counts, and
//! the latest sales. "Today" starts at local midnight in the shop's timezone.

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use partsdesk_core::{Product, Section, Session};
use partsdesk_db::DashboardStats;

use crate::error::ApiError;
use crate::state::{ConfigState, DbState};

/// Low-stock parts listed under the dashboard cards.
const LOW_STOCK_PREVIEW: u32 = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub stats: DashboardStats,
    /// Revenue formatted for the card, e.g. `Rp 1.250.000`
    pub today_revenue_display: String,
    pub low_stock_products: Vec<Product>,
}

pub async fn get_dashboard(
    db: &DbState,
    config: &ConfigState,
    session: &Session,
) -> Result<DashboardResponse, ApiError> {
    session.require(Section::Dashboard)?;

    let since = config.start_of_day(Utc::now());
    debug!(since = %since, "get_dashboard command");

    let stats = db.inner().reports().dashboard(since).await?;
    let low_stock_products = db.inner().products().low_stock(LOW_STOCK_PREVIEW).await?;

    Ok(DashboardResponse {
        today_revenue_display: config.format_currency(stats.today_revenue),
        stats,
        low_stock_products,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::add_to_cart;
    use crate::commands::checkout::{checkout, CheckoutRequest};
    use crate::commands::fixtures::{self, cashier, warehouse};
    use crate::state::CartState;
    use partsdesk_core::{Money, PaymentMethod};

    #[tokio::test]
    async fn test_dashboard_after_a_sale() {
        let db = fixtures::db().await;
        let cart = CartState::new();
        let config = ConfigState::default();
        let oil = fixtures::part(&db, "OLI-MPX2", 50_000, 3).await;
        fixtures::part(&db, "BAN-DALAM", 40_000, 30).await;

        db.inner().shifts().open(&cashier().user_id, Money::zero()).await.unwrap();
        add_to_cart(&db, &cart, &config, &oil.id, Some(2)).await.unwrap();
        checkout(&db, &cart, &config, &cashier(), CheckoutRequest::new(PaymentMethod::Cash))
            .await
            .unwrap();

        let dashboard = get_dashboard(&db, &config, &cashier()).await.unwrap();
        assert_eq!(dashboard.stats.today_revenue, Money::from_minor(111_000));
        assert_eq!(dashboard.today_revenue_display, "Rp 111.000");
        assert_eq!(dashboard.stats.today_transactions, 1);
        assert_eq!(dashboard.stats.product_count, 2);
        // oil is down to 1 with min_stock 2
        assert_eq!(dashboard.stats.low_stock_count, 1);
        assert_eq!(dashboard.low_stock_products[0].id, oil.id);
        assert_eq!(dashboard.stats.recent_transactions.len(), 1);
    }

    #[tokio::test]
    async fn test_every_role_sees_dashboard() {
        let db = fixtures::db().await;
        let dashboard = get_dashboard(&db, &ConfigState::default(), &warehouse())
            .await
            .unwrap();
        assert_eq!(dashboard.stats.today_revenue, Money::zero());
        assert!(dashboard.low_stock_products.is_empty());
    }
}
