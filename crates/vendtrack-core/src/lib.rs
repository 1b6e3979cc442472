// vendtrack-core: screen-level data loading between vendtrack-api and consumers (CLI).

pub mod config;
pub mod error;
pub mod loaders;
pub mod loading;
pub mod restock;
pub mod session;
pub mod settle;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ClientConfig, Credentials, TlsVerification};
pub use error::CoreError;
pub use loaders::{
    AnalyticsFilters, AnalyticsLoader, AnalyticsSection, AnalyticsState, DashboardFilters,
    DashboardLoader, DashboardState, DateRange, InventoryFilters, InventoryLoader,
    InventoryReport, InventoryState, ReferenceData, ReferenceKind,
};
pub use loading::{LoadingSnapshot, LoadingStates};
pub use restock::{FormError, MachineRows, ProductRow, RestockEditor, RestockForm};
pub use session::Session;
pub use settle::{BatchReport, settle};
