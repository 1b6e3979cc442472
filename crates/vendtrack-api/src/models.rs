// Response and request types for the vendtrack REST backend.
//
// Field names follow the backend serializers (snake_case). Read-only
// derived fields (`location_name`, `machine_info`, ...) are optional so
// the same type deserializes list and detail responses. Anything the
// backend adds later lands in `extra` rather than failing the decode.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ── Collection envelope ──────────────────────────────────────────────

/// A paginated collection response.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// Either shape a collection endpoint may answer with.
///
/// `Page` is tried first so a body carrying `results` always wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page(Page<T>),
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Page(page) => page.results,
            Self::Bare(items) => items,
        }
    }
}

// ── Auth ─────────────────────────────────────────────────────────────

/// The logged-in user as returned by `GET /profile/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// "First Last" when a first name is set, otherwise the username.
    pub fn display_name(&self) -> String {
        match self.first_name.as_deref() {
            Some(first) if !first.is_empty() => {
                let last = self.last_name.as_deref().unwrap_or_default();
                format!("{first} {last}").trim_end().to_owned()
            }
            _ => self.username.clone(),
        }
    }
}

// ── Reference data ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    pub location: i64,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Machine {
    /// Name if set, otherwise "type model".
    pub fn label(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_owned();
        }
        [self.machine_type.as_deref(), self.model.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub unit_type: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "decimal")]
    pub average_cost: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A product slotted into a machine, with its sell price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineItem {
    pub id: i64,
    pub machine: i64,
    #[serde(default)]
    pub machine_info: Option<String>,
    pub product: i64,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "decimal")]
    pub price: Option<f64>,
    #[serde(default)]
    pub slot: Option<i64>,
    #[serde(default)]
    pub current_stock: Option<i64>,
    #[serde(default, deserialize_with = "decimal")]
    pub profit_margin: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub purchase_count: Option<i64>,
    #[serde(default, deserialize_with = "decimal")]
    pub total_spent: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Transactions ─────────────────────────────────────────────────────

/// A wholesale purchase of stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub product: i64,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: i64,
    #[serde(default, deserialize_with = "decimal")]
    pub total_cost: Option<f64>,
    #[serde(default, deserialize_with = "decimal")]
    pub unit_cost: Option<f64>,
    #[serde(default)]
    pub purchased_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: i64,
    pub location: i64,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub user: Option<i64>,
    #[serde(default)]
    pub user_name: Option<String>,
    pub visit_date: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One machine serviced during a visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restock {
    pub id: i64,
    pub visit: i64,
    #[serde(default)]
    pub visit_info: Option<String>,
    pub machine: i64,
    #[serde(default)]
    pub machine_info: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stock counts for one product within one machine restock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestockEntry {
    pub id: i64,
    pub visit_machine_restock: i64,
    pub product: i64,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub machine_info: Option<String>,
    #[serde(default)]
    pub visit_date: Option<String>,
    pub stock_before: i64,
    #[serde(default)]
    pub discarded: i64,
    pub restocked: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One cost observation in a product's cost history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCost {
    pub id: i64,
    pub product: i64,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub unit_type: Option<String>,
    pub date: String,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "decimal")]
    pub unit_cost: Option<f64>,
    #[serde(default, deserialize_with = "decimal")]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub purchase: Option<i64>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Bulk visit payload ───────────────────────────────────────────────

/// Whole-visit body for `POST /visits/bulk-save/` and
/// `PUT /visits/{id}/bulk-update/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkVisitPayload {
    pub visit: BulkVisit,
    pub machine_restocks: Vec<MachineRestockPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkVisit {
    pub location: i64,
    pub visit_date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineRestockPayload {
    pub machine: i64,
    #[serde(default)]
    pub notes: String,
    pub restock_entries: Vec<RestockEntryPayload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockEntryPayload {
    pub product: i64,
    pub stock_before: i64,
    pub discarded: i64,
    pub restocked: i64,
}

// ── Helpers ──────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

/// Money and ratio fields arrive as decimal strings (`"1.50"`) or plain
/// numbers depending on the serializer; accept both, and null.
pub(crate) fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Like `decimal`, but null and missing collapse to zero.
pub(crate) fn decimal_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    decimal(deserializer).map(Option::unwrap_or_default)
}
