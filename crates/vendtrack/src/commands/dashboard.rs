//! Dashboard command handler.

use vendtrack_api::DashboardSummary;
use vendtrack_core::{DashboardFilters, Session};

use crate::cli::{DashboardArgs, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Field};

use super::util;

fn detail(summary: &DashboardSummary, location: Option<&str>) -> String {
    let mut fields = vec![
        Field::new("Locations", summary.locations),
        Field::new("Machines", summary.machines),
        Field::new("Products", summary.products),
        Field::new("Low stock items", summary.low_stock_count),
        Field::new("Recent restocks", summary.recent_restocks),
        Field::new("Revenue", output::fixed2(summary.revenue_total)),
        Field::new("Profit", output::fixed2(summary.profit_total)),
        Field::new("Margin %", output::fixed2(summary.profit_margin)),
    ];
    if let Some(name) = location {
        fields.insert(0, Field::new("Location", name));
    }
    output::render_fields(&fields)
}

pub async fn handle(
    session: &Session,
    args: DashboardArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let loader = session.dashboard();
    loader.set_filters(DashboardFilters {
        days: args.days,
        location: args.location,
        machine_type: args.machine_type,
    });
    loader.initialize().await;

    let state = loader.state();
    let location = args.location.and_then(|id| {
        state
            .reference
            .locations
            .iter()
            .find(|l| l.id == id)
            .map(|l| l.name.clone())
    });
    let out = output::render_single(
        global.output,
        &state.summary,
        |s| detail(s, location.as_deref()),
        |s| s.machines.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    util::finish(state.error)
}
