use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ironmonger_core::{CategoryId, ProductId};

use crate::http::{ApiClient, ApiError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub orders: u64,
    #[serde(default)]
    pub revenue: Decimal,
    #[serde(default)]
    pub gross_sales: Decimal,
    #[serde(default)]
    pub discounts: Decimal,
    #[serde(default)]
    pub taxes: Decimal,
    #[serde(default)]
    pub avg_order_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySales {
    pub day: String,
    pub orders: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopProduct {
    pub product_id: ProductId,
    pub product_name: String,
    pub units: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySales {
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSales {
    pub payment_method_code: String,
    pub payment_method_name: String,
    pub orders: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Pos,
    Web,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSales {
    pub channel: Channel,
    pub orders: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlySales {
    pub hour_of_day: u8,
    pub orders: u64,
    pub revenue: Decimal,
}

/// Sales aggregates for a date range, as shown on the back-office landing
/// page. Breakdown lists missing from the response read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(default)]
    pub summary: DashboardSummary,
    #[serde(default)]
    pub daily: Vec<DailySales>,
    #[serde(default)]
    pub top_products: Vec<TopProduct>,
    #[serde(default)]
    pub by_category: Vec<CategorySales>,
    #[serde(default)]
    pub by_payment: Vec<PaymentSales>,
    #[serde(default)]
    pub by_channel: Vec<ChannelSales>,
    #[serde(default)]
    pub by_hour: Vec<HourlySales>,
}

#[derive(Debug, Serialize)]
struct Range {
    from: NaiveDate,
    to: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct AdminService {
    api: ApiClient,
}

impl AdminService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /admin/dashboard?from=YYYY-MM-DD&to=YYYY-MM-DD`
    pub async fn dashboard(&self, from: NaiveDate, to: NaiveDate) -> Result<Dashboard, ApiError> {
        self.api
            .get_query("/admin/dashboard", &Range { from, to })
            .await
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn dashboard_reads_the_aggregate_shape() {
        let body = r#"{
            "summary": {"orders": 3, "revenue": 150.5, "gross_sales": 160, "discounts": 9.5,
                        "taxes": 16.13, "avg_order_value": 50.17},
            "daily": [{"day": "2026-05-01", "orders": 3, "revenue": 150.5}],
            "topProducts": [{"product_id": 1, "product_name": "Martillo", "units": 4, "revenue": 40}],
            "byCategory": [{"category_id": null, "category_name": null, "revenue": 10}],
            "byPayment": [{"payment_method_code": "CASH", "payment_method_name": "Efectivo",
                           "orders": 2, "revenue": 100}],
            "byChannel": [{"channel": "WEB", "orders": 3, "revenue": 150.5}],
            "byHour": [{"hour_of_day": 14, "orders": 1, "revenue": 20}]
        }"#;
        let dashboard: Dashboard = serde_json::from_str(body).unwrap();

        assert_eq!(dashboard.summary.orders, 3);
        assert_eq!(dashboard.summary.avg_order_value, dec!(50.17));
        assert_eq!(dashboard.top_products[0].product_id, ProductId::new(1));
        assert_eq!(dashboard.by_category[0].category_id, None);
        assert_eq!(dashboard.by_channel[0].channel, Channel::Web);
        assert_eq!(dashboard.by_hour[0].hour_of_day, 14);
    }

    #[test]
    fn dashboard_tolerates_missing_sections() {
        let dashboard: Dashboard = serde_json::from_str(r#"{"summary":{"orders":3}}"#).unwrap();
        assert_eq!(dashboard.summary.orders, 3);
        assert_eq!(dashboard.summary.revenue, Decimal::ZERO);
        assert!(dashboard.daily.is_empty());
    }
}
