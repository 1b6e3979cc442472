// Per-screen loaders: concurrent fetches, all-settle joins, per-section
// loading flags and a single error banner.

pub mod analytics;
pub mod dashboard;
pub mod inventory;
pub mod reference;

pub use analytics::{AnalyticsFilters, AnalyticsLoader, AnalyticsSection, AnalyticsState, DateRange};
pub use dashboard::{DashboardFilters, DashboardLoader, DashboardState};
pub use inventory::{InventoryFilters, InventoryLoader, InventoryReport, InventoryState};
pub use reference::{ReferenceData, ReferenceKind};
