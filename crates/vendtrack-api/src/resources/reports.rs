// Read-only report endpoints: dashboard, analytics, inventory.
//
// These are the aggregate views that writes to the underlying families
// invalidate. Analytics payloads are typed with lenient defaults (a
// missing or null figure reads as zero); inventory reports are passed
// through as JSON because only the presentation layer interprets them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cache::AggregateView;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::decimal_or_zero;
use crate::params::QueryParams;

// ── Response types ───────────────────────────────────────────────────

/// Headline figures for `GET /dashboard/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSummary {
    pub locations: i64,
    pub machines: i64,
    pub products: i64,
    pub low_stock_items: Vec<Value>,
    pub low_stock_count: i64,
    pub recent_restocks: i64,
    #[serde(deserialize_with = "decimal_or_zero")]
    pub revenue_total: f64,
    #[serde(deserialize_with = "decimal_or_zero")]
    pub profit_total: f64,
    #[serde(deserialize_with = "decimal_or_zero")]
    pub profit_margin: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A figure together with its change versus the previous period (percent).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metric {
    #[serde(deserialize_with = "decimal_or_zero")]
    pub total: f64,
    #[serde(deserialize_with = "decimal_or_zero")]
    pub change: f64,
}

/// `GET /analytics/revenue-profit/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevenueProfit {
    pub revenue: Metric,
    pub profit: Metric,
    pub margin: Metric,
}

/// `GET /analytics/stock-levels/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockLevels {
    pub low_stock_count: i64,
    pub items: Vec<Value>,
}

/// Units sold of one product in one machine over one counting window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitCount {
    pub location_name: String,
    pub machine_name: String,
    pub product_name: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /analytics/demand/`, normalized.
///
/// Older backends answer with a bare array of per-product rows; newer ones
/// with `{products, unit_counts}`. Both decode into this shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DemandAnalysis {
    pub products: Vec<Value>,
    pub unit_counts: Vec<UnitCount>,
}

impl<'de> Deserialize<'de> for DemandAnalysis {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Current {
            #[serde(default)]
            products: Option<Vec<Value>>,
            #[serde(default)]
            unit_counts: Option<Vec<UnitCount>>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Legacy(Vec<Value>),
            Current(Current),
        }

        Ok(match Option::<Shape>::deserialize(deserializer)? {
            None => Self::default(),
            Some(Shape::Legacy(products)) => Self {
                products,
                unit_counts: Vec::new(),
            },
            Some(Shape::Current(body)) => Self {
                products: body.products.unwrap_or_default(),
                unit_counts: body.unit_counts.unwrap_or_default(),
            },
        })
    }
}

// ── Endpoints ────────────────────────────────────────────────────────

fn report_path(view: AggregateView, report: &str) -> String {
    format!("{}/{report}/", view.prefix())
}

impl ApiClient {
    /// `GET /dashboard/` (filters: `days`, `location`, `machine_type`).
    pub async fn dashboard(
        &self,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<DashboardSummary, Error> {
        let body: Option<DashboardSummary> = self
            .read_as(
                &format!("{}/", AggregateView::Dashboard.prefix()),
                params,
                skip_cache,
            )
            .await?;
        Ok(body.unwrap_or_default())
    }

    // ── Analytics ────────────────────────────────────────────────────

    pub async fn stock_levels(
        &self,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<StockLevels, Error> {
        let body: Option<StockLevels> = self
            .read_as(
                &report_path(AggregateView::Analytics, "stock-levels"),
                params,
                skip_cache,
            )
            .await?;
        Ok(body.unwrap_or_default())
    }

    pub async fn demand_analysis(
        &self,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<DemandAnalysis, Error> {
        self.read_as(
            &report_path(AggregateView::Analytics, "demand"),
            params,
            skip_cache,
        )
        .await
    }

    pub async fn revenue_profit(
        &self,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<RevenueProfit, Error> {
        let body: Option<RevenueProfit> = self
            .read_as(
                &report_path(AggregateView::Analytics, "revenue-profit"),
                params,
                skip_cache,
            )
            .await?;
        Ok(body.unwrap_or_default())
    }

    // ── Inventory ────────────────────────────────────────────────────

    /// Filters: `location`, `product`, `machine`.
    pub async fn current_stock_report(
        &self,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<Value, Error> {
        self.read(
            &report_path(AggregateView::Inventory, "current-stock"),
            params,
            skip_cache,
        )
        .await
    }

    /// Filters: `location`, `product`, then `start_date`+`end_date` or `days`.
    pub async fn restock_summary(
        &self,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<Value, Error> {
        self.read(
            &report_path(AggregateView::Inventory, "restock-summary"),
            params,
            skip_cache,
        )
        .await
    }

    /// Filters: `location`, `product`, `analysis_days`.
    pub async fn stock_coverage(
        &self,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<Value, Error> {
        self.read(
            &report_path(AggregateView::Inventory, "stock-coverage"),
            params,
            skip_cache,
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn demand_accepts_legacy_bare_array() {
        let demand: DemandAnalysis =
            serde_json::from_value(json!([{"product": "Cola", "daily_demand": 2.5}])).unwrap();
        assert_eq!(demand.products.len(), 1);
        assert!(demand.unit_counts.is_empty());
    }

    #[test]
    fn demand_accepts_current_shape() {
        let demand: DemandAnalysis = serde_json::from_value(json!({
            "products": [],
            "unit_counts": [{
                "location_name": "Depot", "machine_name": "Snack 1",
                "product_name": "Chips", "end_date": "2025-02-01", "units_sold": 9
            }]
        }))
        .unwrap();
        assert_eq!(demand.unit_counts[0].product_name, "Chips");
        assert_eq!(demand.unit_counts[0].extra["units_sold"], 9);
    }

    #[test]
    fn demand_null_is_empty() {
        let demand: DemandAnalysis = serde_json::from_value(Value::Null).unwrap();
        assert_eq!(demand, DemandAnalysis::default());
    }

    #[test]
    fn revenue_profit_missing_figures_read_as_zero() {
        let rp: RevenueProfit = serde_json::from_value(json!({
            "revenue": {"total": "120.50", "change": 4.2},
            "profit": {"total": null}
        }))
        .unwrap();
        assert_eq!(rp.revenue.total, 120.5);
        assert_eq!(rp.profit.total, 0.0);
        assert_eq!(rp.margin, Metric::default());
    }
}
