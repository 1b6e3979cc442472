// Reference data (locations, machines, products) shared by the filter
// dropdowns of every screen.
//
// Loaded at most once per loader: a kind already holding rows is skipped
// unless the caller forces a reload.

use strum::{Display, IntoStaticStr};
use tracing::debug;
use vendtrack_api::{ApiClient, Location, Machine, Product, QueryParams};

use crate::error::CoreError;
use crate::loading::LoadingStates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ReferenceKind {
    Locations,
    Machines,
    Products,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    pub locations: Vec<Location>,
    pub machines: Vec<Machine>,
    pub products: Vec<Product>,
}

impl ReferenceData {
    pub fn is_loaded(&self, kind: ReferenceKind) -> bool {
        match kind {
            ReferenceKind::Locations => !self.locations.is_empty(),
            ReferenceKind::Machines => !self.machines.is_empty(),
            ReferenceKind::Products => !self.products.is_empty(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// What one reference load changed.
#[derive(Debug, Default)]
pub(crate) struct ReferenceOutcome {
    pub locations: Option<Vec<Location>>,
    pub machines: Option<Vec<Machine>>,
    pub products: Option<Vec<Product>>,
    pub attempted: usize,
    pub failures: Vec<(ReferenceKind, CoreError)>,
}

impl ReferenceOutcome {
    /// Merge successful fetches into `data`, leaving failed kinds untouched.
    pub fn apply(&mut self, data: &mut ReferenceData) {
        if let Some(rows) = self.locations.take() {
            data.locations = rows;
        }
        if let Some(rows) = self.machines.take() {
            data.machines = rows;
        }
        if let Some(rows) = self.products.take() {
            data.products = rows;
        }
    }
}

/// Fetch every kind in `kinds` that `current` lacks (all of them with
/// `force`), concurrently.
pub(crate) async fn load_reference(
    api: &ApiClient,
    kinds: &[ReferenceKind],
    current: &ReferenceData,
    loading: &LoadingStates,
    force: bool,
    skip_cache: bool,
) -> ReferenceOutcome {
    let wanted: Vec<ReferenceKind> = kinds
        .iter()
        .copied()
        .filter(|k| force || !current.is_loaded(*k))
        .collect();
    if wanted.is_empty() {
        debug!("reference data already loaded");
        return ReferenceOutcome::default();
    }

    let sections: Vec<&'static str> = wanted.iter().map(|k| <&'static str>::from(*k)).collect();
    loading.set_many(&sections, true);

    let want = |kind| wanted.contains(&kind);
    let all = QueryParams::new();
    let (locations, machines, products) = tokio::join!(
        async {
            if want(ReferenceKind::Locations) {
                Some(api.list_locations(skip_cache).await)
            } else {
                None
            }
        },
        async {
            if want(ReferenceKind::Machines) {
                Some(api.list_machines(&all, skip_cache).await)
            } else {
                None
            }
        },
        async {
            if want(ReferenceKind::Products) {
                Some(api.list_products(&all, skip_cache).await)
            } else {
                None
            }
        },
    );

    loading.set_many(&sections, false);

    let mut outcome = ReferenceOutcome {
        attempted: wanted.len(),
        ..ReferenceOutcome::default()
    };
    outcome.locations = settle_kind(ReferenceKind::Locations, locations, &mut outcome.failures);
    outcome.machines = settle_kind(ReferenceKind::Machines, machines, &mut outcome.failures);
    outcome.products = settle_kind(ReferenceKind::Products, products, &mut outcome.failures);
    outcome
}

fn settle_kind<T>(
    kind: ReferenceKind,
    result: Option<Result<Vec<T>, vendtrack_api::Error>>,
    failures: &mut Vec<(ReferenceKind, CoreError)>,
) -> Option<Vec<T>> {
    match result? {
        Ok(rows) => Some(rows),
        Err(e) => {
            failures.push((kind, CoreError::from(e)));
            None
        }
    }
}
