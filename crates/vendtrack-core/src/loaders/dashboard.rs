// ── Dashboard screen ──
//
// Headline figures plus the location dropdown.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};
use vendtrack_api::{ApiClient, DashboardSummary, QueryParams};

use crate::error::CoreError;
use crate::loaders::reference::{ReferenceData, ReferenceKind, load_reference};
use crate::loading::{LoadingSnapshot, LoadingStates};
use crate::settle::BatchReport;

const REFERENCE: &[ReferenceKind] = &[ReferenceKind::Locations];
const LOCATIONS_FAILED: &str = "Failed to load locations";
const DASHBOARD_FAILED: &str = "Failed to load dashboard data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardFilters {
    pub days: u32,
    pub location: Option<i64>,
    pub machine_type: Option<String>,
}

impl Default for DashboardFilters {
    fn default() -> Self {
        Self {
            days: 30,
            location: None,
            machine_type: None,
        }
    }
}

impl DashboardFilters {
    pub fn params(&self) -> QueryParams {
        QueryParams::new()
            .with("days", self.days)
            .with_opt("location", self.location)
            .with_opt("machine_type", self.machine_type.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub reference: ReferenceData,
    pub filters: DashboardFilters,
    pub summary: DashboardSummary,
    pub error: Option<String>,
}

pub struct DashboardLoader {
    api: Arc<ApiClient>,
    skip_cache: bool,
    loading: LoadingStates,
    state: watch::Sender<DashboardState>,
}

impl DashboardLoader {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            api,
            skip_cache: false,
            loading: LoadingStates::new(&["locations", "dashboard"]),
            state,
        }
    }

    pub fn with_skip_cache(mut self, skip_cache: bool) -> Self {
        self.skip_cache = skip_cache;
        self
    }

    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
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

    pub fn filters(&self) -> DashboardFilters {
        self.state.borrow().filters.clone()
    }

    pub fn set_filters(&self, filters: DashboardFilters) {
        self.state.send_modify(|s| s.filters = filters);
    }

    /// Locations and dashboard figures together.
    pub async fn initialize(&self) {
        self.loading.set_loading(true);
        self.state.send_modify(|s| s.error = None);
        let (current, filters) = {
            let s = self.state.borrow();
            (s.reference.clone(), s.filters.clone())
        };

        let (mut reference, summary) = tokio::join!(
            load_reference(
                &self.api,
                REFERENCE,
                &current,
                &self.loading,
                false,
                self.skip_cache,
            ),
            self.fetch(&filters),
        );

        let mut messages = Vec::new();
        for (kind, e) in &reference.failures {
            warn!(kind = %kind, error = %e, "reference data failed to load");
            messages.push(LOCATIONS_FAILED);
        }
        let dashboard_failed = summary.is_err();
        if dashboard_failed {
            messages.push(DASHBOARD_FAILED);
        }
        let batch = BatchReport {
            total: reference.attempted + 1,
            failed: reference.failures.len() + usize::from(dashboard_failed),
        };

        self.state.send_modify(|s| {
            reference.apply(&mut s.reference);
            if let Ok(body) = summary {
                s.summary = body;
            }
            if let Some(counts) = batch.summary("requests") {
                s.error = Some(format!("{} ({counts})", messages.join("; ")));
            }
        });
        self.loading.set_loading(false);
    }

    /// Re-fetch the figures for the current filters.
    pub async fn apply_filters(&self) {
        self.loading.set_loading(true);
        self.state.send_modify(|s| s.error = None);
        let filters = self.filters();
        let result = self.fetch(&filters).await;
        self.state.send_modify(|s| match result {
            Ok(body) => s.summary = body,
            Err(_) => s.error = Some(DASHBOARD_FAILED.to_owned()),
        });
        self.loading.set_loading(false);
    }

    /// `locations` reloads the dropdown; anything else reloads the figures.
    pub async fn refresh_section(&self, name: &str) {
        if name != "locations" {
            debug!(section = name, "refreshing dashboard figures");
            self.apply_filters().await;
            return;
        }
        let mut outcome = load_reference(
            &self.api,
            REFERENCE,
            &ReferenceData::default(),
            &self.loading,
            true,
            self.skip_cache,
        )
        .await;
        let failed = !outcome.failures.is_empty();
        self.state.send_modify(|s| {
            outcome.apply(&mut s.reference);
            s.error = failed.then(|| LOCATIONS_FAILED.to_owned());
        });
    }

    async fn fetch(&self, filters: &DashboardFilters) -> Result<DashboardSummary, CoreError> {
        self.loading.set("dashboard", true);
        let result = self
            .api
            .dashboard(&filters.params(), self.skip_cache)
            .await
            .map_err(CoreError::from);
        self.loading.set("dashboard", false);
        if let Err(e) = &result {
            warn!(error = %e, "dashboard request failed");
        }
        result
    }
}
