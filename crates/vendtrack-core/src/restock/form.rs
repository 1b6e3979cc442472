// ── Restock visit form ──
//
// One visit covers every machine at a location; each machine lists its
// slotted products with three free-text counts. Rows the operator left
// blank are not part of the visit: only active rows (and machines with at
// least one) are encoded.

use chrono::Local;
use thiserror::Error;
use vendtrack_api::{
    BulkVisit, BulkVisitPayload, MachineItem, MachineRestockPayload, RestockEntryPayload, Visit,
};

/// Format of `visit_date` as entered on the form.
pub const VISIT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Why a form cannot be submitted. `Display` is the operator-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please select a location")]
    MissingLocation,

    #[error("Please record stock levels for at least one product")]
    NoRestockData,

    #[error(
        "Please complete all fields for products being restocked (stock before and restock amount are required)"
    )]
    IncompleteRow,

    #[error("Stock counts must be whole numbers ({field}: \"{value}\")")]
    InvalidNumber { field: &'static str, value: String },
}

// ── Rows ─────────────────────────────────────────────────────────────

/// One product line of one machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRow {
    pub product: i64,
    pub product_name: String,
    pub stock_before: String,
    pub discarded: String,
    pub restocked: String,
}

impl ProductRow {
    pub fn new(product: i64, product_name: impl Into<String>) -> Self {
        Self {
            product,
            product_name: product_name.into(),
            ..Self::default()
        }
    }

    /// At least one count was entered.
    pub fn is_active(&self) -> bool {
        [&self.stock_before, &self.discarded, &self.restocked]
            .iter()
            .any(|v| !v.trim().is_empty())
    }

    fn is_complete(&self) -> bool {
        !self.stock_before.trim().is_empty() && !self.restocked.trim().is_empty()
    }

    pub(crate) fn encode(&self) -> Result<RestockEntryPayload, FormError> {
        Ok(RestockEntryPayload {
            product: self.product,
            stock_before: parse_count("stock_before", &self.stock_before)?,
            discarded: parse_count("discarded", &self.discarded)?,
            restocked: parse_count("restocked", &self.restocked)?,
        })
    }
}

/// Empty reads as zero; anything else must be a non-negative integer.
fn parse_count(field: &'static str, raw: &str) -> Result<i64, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<u32>()
        .map(i64::from)
        .map_err(|_| FormError::InvalidNumber {
            field,
            value: raw.to_owned(),
        })
}

/// A machine and its product rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineRows {
    pub machine: i64,
    pub label: String,
    pub notes: String,
    pub products: Vec<ProductRow>,
}

impl MachineRows {
    pub fn new(machine: i64, label: impl Into<String>) -> Self {
        Self {
            machine,
            label: label.into(),
            ..Self::default()
        }
    }

    /// One blank row per product slotted into this machine.
    pub fn from_slots(machine: i64, label: impl Into<String>, slots: &[MachineItem]) -> Self {
        let mut rows = Self::new(machine, label);
        rows.products = slots
            .iter()
            .filter(|item| item.machine == machine)
            .map(|item| {
                ProductRow::new(
                    item.product,
                    item.product_name.clone().unwrap_or_default(),
                )
            })
            .collect();
        rows
    }

    pub fn has_activity(&self) -> bool {
        self.products.iter().any(ProductRow::is_active)
    }

    pub fn active_rows(&self) -> impl Iterator<Item = &ProductRow> {
        self.products.iter().filter(|p| p.is_active())
    }

    pub fn row_mut(&mut self, product: i64) -> Option<&mut ProductRow> {
        self.products.iter_mut().find(|p| p.product == product)
    }
}

// ── Form ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestockForm {
    /// Set when editing an existing visit.
    pub id: Option<i64>,
    pub location: Option<i64>,
    pub visit_date: String,
    pub notes: String,
    pub machines: Vec<MachineRows>,
}

impl RestockForm {
    /// Blank form for a new visit, dated now.
    pub fn new_visit() -> Self {
        Self {
            visit_date: Local::now().format(VISIT_DATE_FORMAT).to_string(),
            ..Self::default()
        }
    }

    /// Edit form pre-filled from an existing visit's header.
    pub fn edit(visit: &Visit) -> Self {
        Self {
            id: Some(visit.id),
            location: Some(visit.location),
            visit_date: visit.visit_date.clone(),
            notes: visit.notes.clone().unwrap_or_default(),
            machines: Vec::new(),
        }
    }

    /// Edit mode for `Some`, a fresh visit for `None`.
    pub fn initialize(existing: Option<&Visit>) -> Self {
        existing.map_or_else(Self::new_visit, Self::edit)
    }

    pub fn is_editing(&self) -> bool {
        self.id.is_some()
    }

    pub fn machine_mut(&mut self, machine: i64) -> Option<&mut MachineRows> {
        self.machines.iter_mut().find(|m| m.machine == machine)
    }

    /// Machines that will appear in the payload.
    pub fn active_machines(&self) -> impl Iterator<Item = &MachineRows> {
        self.machines.iter().filter(|m| m.has_activity())
    }

    /// Check the rows without encoding them.
    pub fn validate(&self) -> Result<(), FormError> {
        if !self.machines.iter().any(MachineRows::has_activity) {
            return Err(FormError::NoRestockData);
        }
        let rows = || self.active_machines().flat_map(MachineRows::active_rows);
        if rows().any(|row| !row.is_complete()) {
            return Err(FormError::IncompleteRow);
        }
        rows().try_for_each(|row| row.encode().map(|_| ()))?;
        if self.location.is_none() {
            return Err(FormError::MissingLocation);
        }
        Ok(())
    }

    /// Validate and build the sparse whole-visit payload.
    pub fn encode(&self, user: Option<i64>) -> Result<BulkVisitPayload, FormError> {
        self.validate()?;
        let location = self.location.ok_or(FormError::MissingLocation)?;

        let machine_restocks = self
            .active_machines()
            .map(|machine| {
                Ok(MachineRestockPayload {
                    machine: machine.machine,
                    notes: machine.notes.clone(),
                    restock_entries: machine
                        .active_rows()
                        .map(ProductRow::encode)
                        .collect::<Result<_, _>>()?,
                })
            })
            .collect::<Result<_, FormError>>()?;

        Ok(BulkVisitPayload {
            visit: BulkVisit {
                location,
                visit_date: self.visit_date.clone(),
                notes: self.notes.clone(),
                user,
            },
            machine_restocks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(product: i64, before: &str, discarded: &str, restocked: &str) -> ProductRow {
        ProductRow {
            product,
            product_name: format!("p{product}"),
            stock_before: before.into(),
            discarded: discarded.into(),
            restocked: restocked.into(),
        }
    }

    fn machine(id: i64, rows: Vec<ProductRow>) -> MachineRows {
        MachineRows {
            machine: id,
            label: format!("m{id}"),
            notes: String::new(),
            products: rows,
        }
    }

    fn form(machines: Vec<MachineRows>) -> RestockForm {
        RestockForm {
            id: None,
            location: Some(3),
            visit_date: "2025-02-01T09:30".into(),
            notes: "Morning run".into(),
            machines,
        }
    }

    #[test]
    fn empty_form_asks_for_at_least_one_product() {
        let form = form(vec![machine(1, vec![row(10, "", "", "")])]);
        assert_eq!(form.validate(), Err(FormError::NoRestockData));
        assert_eq!(
            FormError::NoRestockData.to_string(),
            "Please record stock levels for at least one product"
        );
    }

    #[test]
    fn row_missing_restocked_is_incomplete() {
        let form = form(vec![machine(1, vec![row(10, "4", "", "")])]);
        assert_eq!(form.validate(), Err(FormError::IncompleteRow));
    }

    #[test]
    fn discarded_only_row_is_active_and_incomplete() {
        let form = form(vec![machine(1, vec![row(10, "", "2", "")])]);
        assert_eq!(form.validate(), Err(FormError::IncompleteRow));
    }

    #[test]
    fn non_numeric_count_is_rejected() {
        let form = form(vec![machine(1, vec![row(10, "4", "", "a few")])]);
        assert_eq!(
            form.validate(),
            Err(FormError::InvalidNumber {
                field: "restocked",
                value: "a few".into(),
            })
        );
    }

    #[test]
    fn missing_location_is_reported_after_rows() {
        let mut form = form(vec![machine(1, vec![row(10, "4", "", "6")])]);
        form.location = None;
        assert_eq!(form.validate(), Err(FormError::MissingLocation));
    }

    #[test]
    fn encoding_is_sparse() {
        let form = form(vec![
            machine(1, vec![row(10, "4", "", "6"), row(11, "", "", "")]),
            machine(2, vec![row(12, "", "", "")]),
            machine(3, vec![row(13, "0", "1", "8")]),
        ]);

        let payload = form.encode(Some(7)).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(payload.visit.location, 3);
        assert_eq!(payload.visit.user, Some(7));
        assert_eq!(
            payload
                .machine_restocks
                .iter()
                .map(|m| m.machine)
                .collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(
            payload.machine_restocks[0].restock_entries,
            vec![RestockEntryPayload {
                product: 10,
                stock_before: 4,
                discarded: 0,
                restocked: 6,
            }]
        );
        assert_eq!(payload.machine_restocks[1].restock_entries[0].discarded, 1);
    }

    #[test]
    fn edit_form_carries_visit_header() {
        let visit: Visit = serde_json::from_value(serde_json::json!({
            "id": 42, "location": 3, "visit_date": "2025-01-05T08:00", "notes": null
        }))
        .unwrap_or_else(|e| panic!("{e}"));

        let form = RestockForm::initialize(Some(&visit));
        assert!(form.is_editing());
        assert_eq!(form.location, Some(3));
        assert_eq!(form.notes, "");

        let fresh = RestockForm::initialize(None);
        assert!(!fresh.is_editing());
        assert_eq!(fresh.visit_date.len(), "2025-01-05T08:00".len());
    }

    #[test]
    fn slots_become_blank_rows() {
        let slots: Vec<MachineItem> = serde_json::from_value(serde_json::json!([
            {"id": 1, "machine": 5, "product": 10, "product_name": "Cola"},
            {"id": 2, "machine": 6, "product": 11, "product_name": "Chips"}
        ]))
        .unwrap_or_else(|e| panic!("{e}"));

        let rows = MachineRows::from_slots(5, "Lobby", &slots);
        assert_eq!(rows.products, vec![ProductRow::new(10, "Cola")]);
        assert!(!rows.has_activity());
    }
}
