//! Inventory report command handler.

use serde::Serialize;
use serde_json::Value;
use vendtrack_core::{InventoryFilters, InventoryReport, InventoryState, Session};

use crate::cli::{GlobalOpts, InventoryArgs, InventoryReportArg};
use crate::error::CliError;
use crate::output;

use super::util;

impl From<InventoryReportArg> for InventoryReport {
    fn from(arg: InventoryReportArg) -> Self {
        match arg {
            InventoryReportArg::CurrentStock => Self::CurrentStock,
            InventoryReportArg::RestockSummary => Self::RestockSummary,
            InventoryReportArg::StockCoverage => Self::StockCoverage,
        }
    }
}

/// Structured output; reports that were not requested or failed are null.
#[derive(Serialize)]
struct InventoryView<'a> {
    current_stock: Option<&'a Value>,
    restock_summary: Option<&'a Value>,
    stock_coverage: Option<&'a Value>,
}

impl<'a> From<&'a InventoryState> for InventoryView<'a> {
    fn from(state: &'a InventoryState) -> Self {
        Self {
            current_stock: state.current_stock.as_ref(),
            restock_summary: state.restock_summary.as_ref(),
            stock_coverage: state.stock_coverage.as_ref(),
        }
    }
}

fn filters(args: &InventoryArgs) -> InventoryFilters {
    InventoryFilters {
        location: args.location,
        product: args.product,
        machine: args.machine,
        start_date: args.start_date,
        end_date: args.end_date,
        days: Some(args.days),
        analysis_days: Some(args.analysis_days),
    }
}

fn detail(state: &InventoryState, only: Option<InventoryReport>) -> String {
    let reports: Vec<InventoryReport> = match only {
        Some(report) => vec![report],
        None => vec![
            InventoryReport::CurrentStock,
            InventoryReport::RestockSummary,
            InventoryReport::StockCoverage,
        ],
    };
    reports
        .into_iter()
        .map(|r| output::render_section(&r.to_string(), state.report(r)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub async fn handle(
    session: &Session,
    args: &InventoryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let loader = session.inventory();
    loader.set_filters(filters(args));

    let only = args.report.map(InventoryReport::from);
    match only {
        Some(report) => loader.refresh_section(&report.to_string()).await,
        None => loader.initialize().await,
    }

    let state = loader.state();
    let out = output::render_single(
        global.output,
        &InventoryView::from(&state),
        |_| detail(&state, only),
        |_| {
            only.map_or_else(|| "inventory".into(), |r| r.to_string())
        },
    )?;
    output::print_output(&out, global.quiet);
    util::finish(state.error)
}
