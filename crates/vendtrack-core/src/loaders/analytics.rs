// ── Analytics screen ──
//
// Revenue/profit, stock levels and demand for a date window, fetched
// together. Each failed fetch resets its own panel to zeros and adds its
// message to the banner.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{Days, Local, NaiveDate};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use tokio::sync::watch;
use tracing::{debug, warn};
use vendtrack_api::{ApiClient, DemandAnalysis, QueryParams, RevenueProfit, StockLevels, UnitCount};

use crate::error::CoreError;
use crate::loaders::reference::{ReferenceData, ReferenceKind, load_reference};
use crate::loading::{LoadingSnapshot, LoadingStates};
use crate::settle::{BatchReport, settle};

const REFERENCE: &[ReferenceKind] = &[ReferenceKind::Locations];
const DEFAULT_WINDOW_DAYS: u32 = 30;
const LOCATIONS_FAILED: &str = "Failed to load locations";

// ── Filters ──────────────────────────────────────────────────────────

/// Reporting window: the last N days, or an explicit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Days(u32),
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl Default for DateRange {
    fn default() -> Self {
        Self::Days(DEFAULT_WINDOW_DAYS)
    }
}

impl DateRange {
    /// Fill a half-specified custom range: end defaults to `today`, start
    /// to 30 days before `today`.
    pub fn resolve(self, today: NaiveDate) -> Self {
        match self {
            Self::Custom { start, end } if start.is_none() || end.is_none() => Self::Custom {
                start: start.or_else(|| today.checked_sub_days(Days::new(30))),
                end: end.or(Some(today)),
            },
            other => other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyticsFilters {
    pub range: DateRange,
    pub location: Option<i64>,
}

impl AnalyticsFilters {
    /// Window + location, for revenue/profit and demand.
    pub fn window_params(&self) -> QueryParams {
        let params = match self.range {
            DateRange::Days(days) => QueryParams::new().with("days", days),
            DateRange::Custom { start, end } => QueryParams::new()
                .with_opt("start_date", start.map(|d| d.format("%Y-%m-%d")))
                .with_opt("end_date", end.map(|d| d.format("%Y-%m-%d"))),
        };
        params.with_opt("location", self.location)
    }

    /// Stock levels are a snapshot: location only.
    pub fn stock_params(&self) -> QueryParams {
        QueryParams::new().with_opt("location", self.location)
    }
}

// ── Sections ─────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum AnalyticsSection {
    RevenueProfit,
    StockLevels,
    Demand,
}

impl AnalyticsSection {
    fn failure_message(self) -> &'static str {
        match self {
            Self::RevenueProfit => "Failed to load revenue and profit data",
            Self::StockLevels => "Failed to load stock level data",
            Self::Demand => "Failed to load demand analysis data",
        }
    }
}

// ── State ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsState {
    pub reference: ReferenceData,
    pub filters: AnalyticsFilters,
    pub revenue_profit: RevenueProfit,
    pub stock_levels: StockLevels,
    pub demand: DemandAnalysis,
    pub error: Option<String>,
}

impl AnalyticsState {
    /// Unit counts by location, machine and product, newest window first.
    pub fn sorted_demand_counts(&self) -> Vec<UnitCount> {
        let mut counts = self.demand.unit_counts.clone();
        counts.sort_by(compare_unit_counts);
        counts
    }
}

fn compare_unit_counts(a: &UnitCount, b: &UnitCount) -> Ordering {
    a.location_name
        .cmp(&b.location_name)
        .then_with(|| a.machine_name.cmp(&b.machine_name))
        .then_with(|| a.product_name.cmp(&b.product_name))
        .then_with(|| b.end_date.cmp(&a.end_date))
}

enum Fetched {
    RevenueProfit(RevenueProfit),
    StockLevels(StockLevels),
    Demand(DemandAnalysis),
}

// ── Loader ───────────────────────────────────────────────────────────

pub struct AnalyticsLoader {
    api: Arc<ApiClient>,
    skip_cache: bool,
    loading: LoadingStates,
    state: watch::Sender<AnalyticsState>,
}

impl AnalyticsLoader {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let (state, _) = watch::channel(AnalyticsState::default());
        Self {
            api,
            skip_cache: false,
            loading: LoadingStates::new(&["locations", "revenue-profit", "stock-levels", "demand"]),
            state,
        }
    }

    pub fn with_skip_cache(mut self, skip_cache: bool) -> Self {
        self.skip_cache = skip_cache;
        self
    }

    pub fn state(&self) -> AnalyticsState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalyticsState> {
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

    pub fn filters(&self) -> AnalyticsFilters {
        self.state.borrow().filters.clone()
    }

    pub fn set_filters(&self, filters: AnalyticsFilters) {
        self.state.send_modify(|s| s.filters = filters);
    }

    pub fn sorted_demand_counts(&self) -> Vec<UnitCount> {
        self.state.borrow().sorted_demand_counts()
    }

    /// Locations for the filter dropdown, then every panel.
    pub async fn initialize(&self) {
        self.loading.set_loading(true);
        let (current, filters) = self.begin(Local::now().date_naive());

        let (mut reference, results) = tokio::join!(
            load_reference(
                &self.api,
                REFERENCE,
                &current,
                &self.loading,
                false,
                self.skip_cache,
            ),
            self.fetch_all(&filters),
        );
        let mut messages = Vec::new();
        for (kind, e) in &reference.failures {
            warn!(kind = %kind, error = %e, "reference data failed to load");
            messages.push(LOCATIONS_FAILED);
        }
        let prior = BatchReport {
            total: reference.attempted,
            failed: reference.failures.len(),
        };
        self.state.send_modify(|s| reference.apply(&mut s.reference));

        self.store_all(results, prior, messages);
        self.loading.set_loading(false);
    }

    /// Re-fetch every panel for the current filters.
    pub async fn apply_filters(&self) {
        self.loading.set_loading(true);
        let (_, filters) = self.begin(Local::now().date_naive());
        let results = self.fetch_all(&filters).await;
        self.store_all(results, BatchReport::default(), Vec::new());
        self.loading.set_loading(false);
    }

    /// Re-run one panel; unknown names reload all panels. A successful
    /// retry clears the banner.
    pub async fn refresh_section(&self, name: &str) {
        let Ok(section) = name.parse::<AnalyticsSection>() else {
            debug!(section = name, "unknown analytics section, reloading all");
            self.apply_filters().await;
            return;
        };
        let filters = self.filters();
        let result = self.fetch(section, &filters).await;
        if let Err(e) = &result {
            warn!(section = %section, error = %e, "analytics refresh failed");
        }
        let error = result.is_err().then(|| section.failure_message().to_owned());
        self.state.send_modify(|s| {
            store(s, section, result);
            s.error = error;
        });
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Clear the banner and settle a half-specified custom range in place.
    fn begin(&self, today: NaiveDate) -> (ReferenceData, AnalyticsFilters) {
        self.state.send_modify(|s| {
            s.error = None;
            s.filters.range = s.filters.range.resolve(today);
        });
        let s = self.state.borrow();
        (s.reference.clone(), s.filters.clone())
    }

    async fn fetch_all(
        &self,
        filters: &AnalyticsFilters,
    ) -> Vec<(AnalyticsSection, Result<Fetched, CoreError>)> {
        let sections: Vec<AnalyticsSection> = AnalyticsSection::iter().collect();
        let results = settle(sections.iter().map(|s| self.fetch(*s, filters))).await;
        sections.into_iter().zip(results).collect()
    }

    async fn fetch(
        &self,
        section: AnalyticsSection,
        filters: &AnalyticsFilters,
    ) -> Result<Fetched, CoreError> {
        let name: &'static str = section.into();
        self.loading.set(name, true);
        let result = match section {
            AnalyticsSection::RevenueProfit => self
                .api
                .revenue_profit(&filters.window_params(), self.skip_cache)
                .await
                .map(Fetched::RevenueProfit),
            AnalyticsSection::StockLevels => self
                .api
                .stock_levels(&filters.stock_params(), self.skip_cache)
                .await
                .map(Fetched::StockLevels),
            AnalyticsSection::Demand => self
                .api
                .demand_analysis(&filters.window_params(), self.skip_cache)
                .await
                .map(Fetched::Demand),
        };
        self.loading.set(name, false);
        result.map_err(CoreError::from)
    }

    /// Store every panel. `prior` and `messages` carry the outcome of the
    /// reference fetches that ran alongside.
    fn store_all(
        &self,
        results: Vec<(AnalyticsSection, Result<Fetched, CoreError>)>,
        prior: BatchReport,
        mut messages: Vec<&'static str>,
    ) {
        let panels = BatchReport {
            total: results.len(),
            failed: results.iter().filter(|(_, r)| r.is_err()).count(),
        };
        messages.extend(
            results
                .iter()
                .filter(|(_, r)| r.is_err())
                .map(|(section, _)| section.failure_message()),
        );
        let batch = BatchReport {
            total: prior.total + panels.total,
            failed: prior.failed + panels.failed,
        };

        self.state.send_modify(|s| {
            for (section, result) in results {
                store(s, section, result);
            }
            if let Some(summary) = batch.summary("requests") {
                s.error = Some(format!("{} ({summary})", messages.join("; ")));
            }
        });
        if !batch.all_ok() {
            warn!(failed = batch.failed, total = batch.total, "analytics panels failed");
        }
    }
}

/// A failed fetch resets its panel so stale figures never show.
fn store(state: &mut AnalyticsState, section: AnalyticsSection, result: Result<Fetched, CoreError>) {
    match (section, result) {
        (_, Ok(Fetched::RevenueProfit(body))) => state.revenue_profit = body,
        (_, Ok(Fetched::StockLevels(body))) => state.stock_levels = body,
        (_, Ok(Fetched::Demand(body))) => state.demand = body,
        (AnalyticsSection::RevenueProfit, Err(_)) => state.revenue_profit = RevenueProfit::default(),
        (AnalyticsSection::StockLevels, Err(_)) => state.stock_levels = StockLevels::default(),
        (AnalyticsSection::Demand, Err(_)) => state.demand = DemandAnalysis::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|e| panic!("{e}"))
    }

    fn count(location: &str, machine: &str, product: &str, end: &str) -> UnitCount {
        UnitCount {
            location_name: location.into(),
            machine_name: machine.into(),
            product_name: product.into(),
            end_date: Some(end.into()),
            ..UnitCount::default()
        }
    }

    #[test]
    fn default_window_is_thirty_days() {
        assert_eq!(
            AnalyticsFilters::default().window_params().to_query_string(),
            "days=30"
        );
    }

    #[test]
    fn custom_range_fills_missing_dates_from_today() {
        let range = DateRange::Custom {
            start: None,
            end: None,
        }
        .resolve(date("2025-03-31"));
        assert_eq!(
            range,
            DateRange::Custom {
                start: Some(date("2025-03-01")),
                end: Some(date("2025-03-31")),
            }
        );
    }

    #[test]
    fn complete_custom_range_is_untouched() {
        let range = DateRange::Custom {
            start: Some(date("2025-01-01")),
            end: Some(date("2025-01-15")),
        };
        assert_eq!(range.resolve(date("2025-06-01")), range);
    }

    #[test]
    fn custom_range_sends_dates_not_days() {
        let filters = AnalyticsFilters {
            range: DateRange::Custom {
                start: Some(date("2025-01-01")),
                end: Some(date("2025-01-15")),
            },
            location: Some(3),
        };
        assert_eq!(
            filters.window_params().to_query_string(),
            "end_date=2025-01-15&location=3&start_date=2025-01-01"
        );
        assert_eq!(filters.stock_params().to_query_string(), "location=3");
    }

    #[test]
    fn demand_counts_sort_by_place_then_newest_first() {
        let state = AnalyticsState {
            demand: DemandAnalysis {
                products: Vec::new(),
                unit_counts: vec![
                    count("Plaza", "A", "Chips", "2025-01-07"),
                    count("Depot", "B", "Cola", "2025-01-07"),
                    count("Depot", "A", "Cola", "2025-01-07"),
                    count("Depot", "A", "Cola", "2025-01-14"),
                ],
            },
            ..AnalyticsState::default()
        };

        let sorted: Vec<(String, String, Option<String>)> = state
            .sorted_demand_counts()
            .into_iter()
            .map(|c| (c.location_name, c.machine_name, c.end_date))
            .collect();

        assert_eq!(
            sorted,
            vec![
                ("Depot".into(), "A".into(), Some("2025-01-14".into())),
                ("Depot".into(), "A".into(), Some("2025-01-07".into())),
                ("Depot".into(), "B".into(), Some("2025-01-07".into())),
                ("Plaza".into(), "A".into(), Some("2025-01-07".into())),
            ]
        );
    }
}
