//! Analytics command handler.

use serde::Serialize;
use tabled::Tabled;
use vendtrack_api::{DemandAnalysis, Metric, RevenueProfit, StockLevels, UnitCount};
use vendtrack_core::{AnalyticsFilters, AnalyticsState, DateRange, Session};

use crate::cli::{AnalyticsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Field};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct UnitCountRow {
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Machine")]
    machine: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "From")]
    start: String,
    #[tabled(rename = "To")]
    end: String,
    #[tabled(rename = "Units")]
    units: String,
}

impl From<&UnitCount> for UnitCountRow {
    fn from(c: &UnitCount) -> Self {
        Self {
            location: c.location_name.clone(),
            machine: c.machine_name.clone(),
            product: c.product_name.clone(),
            start: c.start_date.clone().unwrap_or_default(),
            end: c.end_date.clone().unwrap_or_default(),
            units: c
                .extra
                .get("units_sold")
                .or_else(|| c.extra.get("units"))
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
struct AnalyticsView<'a> {
    revenue_profit: &'a RevenueProfit,
    stock_levels: &'a StockLevels,
    demand: &'a DemandAnalysis,
}

// ── Rendering ───────────────────────────────────────────────────────

fn metric(label: &'static str, m: Metric) -> Field {
    Field::new(label, format!("{} ({:+.1}%)", output::fixed2(m.total), m.change))
}

fn detail(state: &AnalyticsState) -> String {
    let rp = &state.revenue_profit;
    let mut out = output::render_fields(&[
        metric("Revenue", rp.revenue),
        metric("Profit", rp.profit),
        metric("Margin %", rp.margin),
        Field::new("Low stock items", state.stock_levels.low_stock_count),
        Field::new("Products with demand", state.demand.products.len()),
    ]);

    let counts = state.sorted_demand_counts();
    if !counts.is_empty() {
        let rows: Vec<UnitCountRow> = counts.iter().map(UnitCountRow::from).collect();
        out.push_str("\n\n");
        out.push_str(&tabled::Table::new(rows).with(tabled::settings::Style::rounded()).to_string());
    }
    out
}

fn filters(args: &AnalyticsArgs) -> AnalyticsFilters {
    let range = match (args.days, args.start_date, args.end_date) {
        (Some(days), _, _) => DateRange::Days(days),
        (None, None, None) => DateRange::default(),
        (None, start, end) => DateRange::Custom { start, end },
    };
    AnalyticsFilters {
        range,
        location: args.location,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: &AnalyticsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let loader = session.analytics();
    loader.set_filters(filters(args));
    loader.apply_filters().await;

    let state = loader.state();
    let view = AnalyticsView {
        revenue_profit: &state.revenue_profit,
        stock_levels: &state.stock_levels,
        demand: &state.demand,
    };
    let out = output::render_single(
        global.output,
        &view,
        |_| detail(&state),
        |v| output::fixed2(v.revenue_profit.revenue.total),
    )?;
    output::print_output(&out, global.quiet);
    util::finish(state.error.clone())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn args(days: Option<u32>, start: Option<NaiveDate>, end: Option<NaiveDate>) -> AnalyticsArgs {
        AnalyticsArgs {
            days,
            start_date: start,
            end_date: end,
            location: None,
        }
    }

    #[test]
    fn no_flags_use_the_default_window() {
        assert_eq!(filters(&args(None, None, None)).range, DateRange::Days(30));
    }

    #[test]
    fn a_single_date_makes_a_custom_range() {
        let end = NaiveDate::from_ymd_opt(2025, 3, 1);
        assert_eq!(
            filters(&args(None, None, end)).range,
            DateRange::Custom { start: None, end }
        );
    }
}
