// ── Inventory reports screen ──
//
// Three reports (current stock, restock summary, stock coverage) loaded in
// parallel next to the filter dropdown data. A failing report clears only
// its own slot; the others still land and the screen shows a count-based
// summary instead of an error page.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use vendtrack_api::{AggregateView, ApiClient, QueryParams, ResourceFamily};

use crate::error::CoreError;
use crate::loaders::reference::{ReferenceData, ReferenceKind, load_reference};
use crate::loading::{LoadingSnapshot, LoadingStates};
use crate::settle::{BatchReport, settle};

const REFERENCE: &[ReferenceKind] = &[
    ReferenceKind::Locations,
    ReferenceKind::Machines,
    ReferenceKind::Products,
];

// ── Filters ──────────────────────────────────────────────────────────

/// Filters applied to every inventory report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryFilters {
    pub location: Option<i64>,
    pub product: Option<i64>,
    pub machine: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Look-back window of the restock summary when no date range is set.
    pub days: Option<u32>,
    /// Window the coverage estimate averages demand over.
    pub analysis_days: Option<u32>,
}

impl Default for InventoryFilters {
    fn default() -> Self {
        Self {
            location: None,
            product: None,
            machine: None,
            start_date: None,
            end_date: None,
            days: Some(7),
            analysis_days: Some(30),
        }
    }
}

impl InventoryFilters {
    /// Whether any entity filter narrows the reports.
    pub fn has_filters(&self) -> bool {
        self.location.is_some() || self.product.is_some() || self.machine.is_some()
    }

    pub fn current_stock_params(&self) -> QueryParams {
        QueryParams::new()
            .with_opt("location", self.location)
            .with_opt("product", self.product)
            .with_opt("machine", self.machine)
    }

    /// An explicit date range wins over `days`; half a range is ignored.
    pub fn restock_summary_params(&self) -> QueryParams {
        let params = QueryParams::new()
            .with_opt("location", self.location)
            .with_opt("product", self.product);
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => params
                .with("start_date", start.format("%Y-%m-%d"))
                .with("end_date", end.format("%Y-%m-%d")),
            _ => params.with_opt("days", self.days),
        }
    }

    pub fn stock_coverage_params(&self) -> QueryParams {
        QueryParams::new()
            .with_opt("location", self.location)
            .with_opt("product", self.product)
            .with_opt("analysis_days", self.analysis_days)
    }
}

// ── Reports ──────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum InventoryReport {
    CurrentStock,
    RestockSummary,
    StockCoverage,
}

impl InventoryReport {
    fn section(self) -> &'static str {
        self.into()
    }

    fn params(self, filters: &InventoryFilters) -> QueryParams {
        match self {
            Self::CurrentStock => filters.current_stock_params(),
            Self::RestockSummary => filters.restock_summary_params(),
            Self::StockCoverage => filters.stock_coverage_params(),
        }
    }
}

// ── State ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryState {
    pub reference: ReferenceData,
    pub filters: InventoryFilters,
    pub current_stock: Option<Value>,
    pub restock_summary: Option<Value>,
    pub stock_coverage: Option<Value>,
    pub error: Option<String>,
}

impl InventoryState {
    pub fn report(&self, report: InventoryReport) -> Option<&Value> {
        match report {
            InventoryReport::CurrentStock => self.current_stock.as_ref(),
            InventoryReport::RestockSummary => self.restock_summary.as_ref(),
            InventoryReport::StockCoverage => self.stock_coverage.as_ref(),
        }
    }

    fn slot(&mut self, report: InventoryReport) -> &mut Option<Value> {
        match report {
            InventoryReport::CurrentStock => &mut self.current_stock,
            InventoryReport::RestockSummary => &mut self.restock_summary,
            InventoryReport::StockCoverage => &mut self.stock_coverage,
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────

pub struct InventoryLoader {
    api: Arc<ApiClient>,
    skip_cache: bool,
    loading: LoadingStates,
    state: watch::Sender<InventoryState>,
}

impl InventoryLoader {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let (state, _) = watch::channel(InventoryState::default());
        Self {
            api,
            skip_cache: false,
            loading: LoadingStates::new(&[
                "locations",
                "machines",
                "products",
                "current-stock",
                "restock-summary",
                "stock-coverage",
            ]),
            state,
        }
    }

    /// Bypass the response cache on every read (fresh data, still cached).
    pub fn with_skip_cache(mut self, skip_cache: bool) -> Self {
        self.skip_cache = skip_cache;
        self
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn state(&self) -> InventoryState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<InventoryState> {
        self.state.subscribe()
    }

    pub fn loading_states(&self) -> &LoadingStates {
        &self.loading
    }

    pub fn loading(&self) -> LoadingSnapshot {
        self.loading.snapshot()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn filters(&self) -> InventoryFilters {
        self.state.borrow().filters.clone()
    }

    pub fn has_filters(&self) -> bool {
        self.state.borrow().filters.has_filters()
    }

    // ── Filters ──────────────────────────────────────────────────────

    /// Replace the filters; takes effect on the next load.
    pub fn set_filters(&self, filters: InventoryFilters) {
        self.state.send_modify(|s| s.filters = filters);
    }

    pub fn reset_filters(&self) {
        self.set_filters(InventoryFilters::default());
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Load reference data (if not yet loaded) and every report.
    ///
    /// Never fails: every failed request (reference kind or report) is
    /// named and counted in `error`; a failed reference kind keeps the rows
    /// it already had.
    pub async fn initialize(&self) {
        self.load_all(false).await;
    }

    /// Reload every report with the current filters.
    pub async fn apply_filters(&self) {
        self.loading.set_loading(true);
        self.state.send_modify(|s| s.error = None);

        let filters = self.filters();
        let results = self.fetch_reports(&filters).await;
        let report = self.store_reports(results);
        if !report.all_ok() {
            warn!(failed = report.failed, "inventory reports failed to reload");
            self.state.send_modify(|s| {
                s.error = Some("Some reports could not be reloaded with the new filters.".into());
            });
        }

        self.loading.set_loading(false);
    }

    /// Re-run one report by section name; unknown names reload all reports.
    /// A successful retry clears the banner.
    pub async fn refresh_section(&self, name: &str) {
        let Ok(report) = name.parse::<InventoryReport>() else {
            debug!(section = name, "unknown inventory section, reloading all");
            self.apply_filters().await;
            return;
        };

        let filters = self.filters();
        let result = self.fetch_report(report, &filters).await;
        let failed = result.is_err();
        self.store_report(report, result);
        self.state.send_modify(|s| {
            s.error = failed.then(|| format!("Failed to refresh {report} report"));
        });
    }

    /// Drop cached inventory, location and product responses, forget the
    /// reference data and initialize from scratch.
    pub async fn force_refresh(&self) {
        let dropped = self.api.invalidate_cache(AggregateView::Inventory.prefix())
            + self.api.invalidate_cache(ResourceFamily::Locations.prefix())
            + self.api.invalidate_cache(ResourceFamily::Products.prefix());
        info!(dropped, "inventory force refresh");

        self.state.send_modify(|s| s.reference.clear());
        self.load_all(true).await;
    }

    /// Forget report payloads and the error banner; filters stay.
    pub fn clear_data(&self) {
        self.state.send_modify(|s| {
            s.current_stock = None;
            s.restock_summary = None;
            s.stock_coverage = None;
            s.error = None;
        });
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn load_all(&self, force: bool) {
        self.loading.set_loading(true);
        self.state.send_modify(|s| s.error = None);

        let (reference_current, filters) = {
            let s = self.state.borrow();
            (s.reference.clone(), s.filters.clone())
        };

        let (mut reference, results) = tokio::join!(
            load_reference(
                &self.api,
                REFERENCE,
                &reference_current,
                &self.loading,
                force,
                self.skip_cache,
            ),
            self.fetch_reports(&filters),
        );

        let mut failed: Vec<&'static str> = Vec::new();
        for (kind, e) in &reference.failures {
            warn!(kind = %kind, error = %e, "reference data failed to load");
            failed.push((*kind).into());
        }
        failed.extend(
            results
                .iter()
                .filter(|(_, r)| r.is_err())
                .map(|(report, _)| report.section()),
        );
        let batch = BatchReport {
            total: reference.attempted + results.len(),
            failed: failed.len(),
        };

        self.state.send_modify(|s| reference.apply(&mut s.reference));
        self.store_reports(results);
        if let Some(summary) = batch.summary("requests") {
            warn!(failed = batch.failed, total = batch.total, "inventory load incomplete");
            self.state.send_modify(|s| {
                s.error = Some(format!(
                    "Some inventory data could not be loaded ({}). {summary}.",
                    failed.join(", ")
                ));
            });
        }

        self.loading.set_loading(false);
    }

    async fn fetch_reports(
        &self,
        filters: &InventoryFilters,
    ) -> Vec<(InventoryReport, Result<Value, CoreError>)> {
        let reports: Vec<InventoryReport> = InventoryReport::iter().collect();
        let results = settle(reports.iter().map(|r| self.fetch_report(*r, filters))).await;
        reports.into_iter().zip(results).collect()
    }

    async fn fetch_report(
        &self,
        report: InventoryReport,
        filters: &InventoryFilters,
    ) -> Result<Value, CoreError> {
        let section = report.section();
        self.loading.set(section, true);
        let params = report.params(filters);
        let result = match report {
            InventoryReport::CurrentStock => {
                self.api.current_stock_report(&params, self.skip_cache).await
            }
            InventoryReport::RestockSummary => {
                self.api.restock_summary(&params, self.skip_cache).await
            }
            InventoryReport::StockCoverage => {
                self.api.stock_coverage(&params, self.skip_cache).await
            }
        };
        self.loading.set(section, false);
        result.map_err(CoreError::from)
    }

    fn store_reports(
        &self,
        results: Vec<(InventoryReport, Result<Value, CoreError>)>,
    ) -> BatchReport {
        let batch = BatchReport {
            total: results.len(),
            failed: results.iter().filter(|(_, r)| r.is_err()).count(),
        };
        for (report, result) in results {
            self.store_report(report, result);
        }
        batch
    }

    fn store_report(&self, report: InventoryReport, result: Result<Value, CoreError>) {
        let payload = match result {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(report = %report, error = %e, "inventory report failed");
                None
            }
        };
        self.state.send_modify(|s| *s.slot(report) = payload);
    }
}
