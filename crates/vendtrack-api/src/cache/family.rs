// ── Resource families & invalidation table ──
//
// A write to one family makes some aggregate views stale. The mapping is
// data, not code: `INVALIDATION_TABLE` lists every family once together
// with the path prefixes its writes remove from the cache.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// A writable REST collection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ResourceFamily {
    Locations,
    Machines,
    Products,
    MachineItems,
    Suppliers,
    Purchases,
    Visits,
    Restocks,
    RestockEntries,
    ProductCosts,
}

/// Read-only report views whose contents derive from several families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum AggregateView {
    Analytics,
    Dashboard,
    Inventory,
}

impl AggregateView {
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Analytics => "/analytics",
            Self::Dashboard => "/dashboard",
            Self::Inventory => "/inventory",
        }
    }
}

const ANALYTICS: &str = AggregateView::Analytics.prefix();
const DASHBOARD: &str = AggregateView::Dashboard.prefix();
const INVENTORY: &str = AggregateView::Inventory.prefix();
// Restocking moves `current_stock` on slot assignments.
const MACHINE_ITEMS: &str = ResourceFamily::MachineItems.prefix();

/// Family → prefixes invalidated in addition to the family's own prefix.
///
/// Matching is by substring, so `/restocks` does not cover
/// `/restock-entries`; both are listed wherever both go stale.
pub const INVALIDATION_TABLE: &[(ResourceFamily, &[&str])] = &[
    (ResourceFamily::Locations, &[ANALYTICS, DASHBOARD, INVENTORY]),
    (ResourceFamily::Machines, &[DASHBOARD, INVENTORY]),
    (
        ResourceFamily::Products,
        &[ANALYTICS, DASHBOARD, INVENTORY, "/product-costs"],
    ),
    (ResourceFamily::MachineItems, &[INVENTORY]),
    (ResourceFamily::Suppliers, &[]),
    (
        ResourceFamily::Purchases,
        &["/products", "/product-costs", ANALYTICS, DASHBOARD, INVENTORY],
    ),
    (
        ResourceFamily::Visits,
        &[
            "/restocks",
            "/restock-entries",
            MACHINE_ITEMS,
            ANALYTICS,
            DASHBOARD,
            INVENTORY,
        ],
    ),
    (
        ResourceFamily::Restocks,
        &[MACHINE_ITEMS, ANALYTICS, DASHBOARD, INVENTORY],
    ),
    (
        ResourceFamily::RestockEntries,
        &[MACHINE_ITEMS, ANALYTICS, DASHBOARD, INVENTORY],
    ),
    (ResourceFamily::ProductCosts, &[ANALYTICS, INVENTORY]),
];

impl ResourceFamily {
    /// Path prefix shared by every endpoint of this family.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Locations => "/locations",
            Self::Machines => "/machines",
            Self::Products => "/products",
            Self::MachineItems => "/machine-items",
            Self::Suppliers => "/suppliers",
            Self::Purchases => "/purchases",
            Self::Visits => "/visits",
            Self::Restocks => "/restocks",
            Self::RestockEntries => "/restock-entries",
            Self::ProductCosts => "/product-costs",
        }
    }

    /// Collection path, e.g. `/machines/`.
    pub fn collection_path(self) -> String {
        format!("{}/", self.prefix())
    }

    /// Item path, e.g. `/machines/7/`.
    pub fn item_path(self, id: i64) -> String {
        format!("{}/{id}/", self.prefix())
    }

    /// Prefixes other than this family's own that a write makes stale.
    pub fn dependents(self) -> &'static [&'static str] {
        INVALIDATION_TABLE
            .iter()
            .find(|(family, _)| *family == self)
            .map(|(_, deps)| *deps)
            .unwrap_or_default()
    }

    /// Every pattern to invalidate after a successful write, own prefix first.
    pub fn invalidation_patterns(self) -> Vec<&'static str> {
        std::iter::once(self.prefix())
            .chain(self.dependents().iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_family_has_exactly_one_table_row() {
        for family in ResourceFamily::iter() {
            let rows = INVALIDATION_TABLE
                .iter()
                .filter(|(f, _)| *f == family)
                .count();
            assert_eq!(rows, 1, "{family} should appear once");
        }
    }

    #[test]
    fn visits_invalidate_reports_and_restocks() {
        let patterns = ResourceFamily::Visits.invalidation_patterns();
        assert_eq!(patterns[0], "/visits");
        for p in ["/dashboard", "/analytics", "/inventory", "/restocks", "/restock-entries"] {
            assert!(patterns.contains(&p), "missing {p}");
        }
    }

    #[test]
    fn purchases_invalidate_products() {
        assert!(
            ResourceFamily::Purchases
                .invalidation_patterns()
                .contains(&"/products")
        );
    }

    #[test]
    fn suppliers_touch_only_themselves() {
        assert_eq!(
            ResourceFamily::Suppliers.invalidation_patterns(),
            vec!["/suppliers"]
        );
    }

    #[test]
    fn family_names_are_kebab_case() {
        assert_eq!(ResourceFamily::RestockEntries.to_string(), "restock-entries");
        assert_eq!(
            "machine-items".parse::<ResourceFamily>().ok(),
            Some(ResourceFamily::MachineItems)
        );
    }

    #[test]
    fn paths_are_slash_terminated() {
        assert_eq!(ResourceFamily::Machines.collection_path(), "/machines/");
        assert_eq!(ResourceFamily::Machines.item_path(7), "/machines/7/");
    }
}
