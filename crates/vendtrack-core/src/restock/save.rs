// ── Saving a restock visit ──
//
// The normal path is a single bulk request carrying the visit header and
// every active machine/product row. The sequential path writes the visit,
// each machine restock and each entry one request at a time; it stays for
// backends without the bulk endpoints.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use vendtrack_api::{ApiClient, QueryParams, Visit};

use crate::error::CoreError;
use crate::restock::form::{FormError, MachineRows, ProductRow, RestockForm};

/// Banner text when the backend gives no usable reason.
pub const SAVE_FAILED: &str = "Failed to save visit. Please try again.";

// ── Sequential request bodies ────────────────────────────────────────

#[derive(Debug, Serialize)]
struct VisitBody<'a> {
    location: i64,
    visit_date: &'a str,
    notes: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<i64>,
}

#[derive(Debug, Serialize)]
struct RestockBody<'a> {
    visit: i64,
    machine: i64,
    notes: &'a str,
}

#[derive(Debug, Serialize)]
struct EntryBody {
    visit_machine_restock: i64,
    product: i64,
    stock_before: i64,
    discarded: i64,
    restocked: i64,
}

// ── Editor ───────────────────────────────────────────────────────────

/// Holds one form together with its save status.
pub struct RestockEditor {
    api: Arc<ApiClient>,
    form: RestockForm,
    saving: bool,
    error: Option<String>,
}

impl RestockEditor {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            form: RestockForm::new_visit(),
            saving: false,
            error: None,
        }
    }

    /// Start editing `existing`, or a new visit for `None`.
    pub fn initialize_form(&mut self, existing: Option<&Visit>) {
        self.form = RestockForm::initialize(existing);
        self.error = None;
    }

    pub fn reset(&mut self) {
        self.initialize_form(None);
    }

    pub fn form(&self) -> &RestockForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RestockForm {
        &mut self.form
    }

    pub fn is_editing(&self) -> bool {
        self.form.is_editing()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Save the whole visit in one request: `POST /visits/bulk-save/`, or
    /// `PUT /visits/{id}/bulk-update/` when editing.
    pub async fn save(&mut self, user: Option<i64>) -> Result<Visit, CoreError> {
        self.error = None;
        let payload = match self.form.encode(user) {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(CoreError::Validation { message: e.to_string() })),
        };

        self.saving = true;
        let result = match self.form.id {
            Some(id) => self.api.update_visit_bulk(id, &payload).await,
            None => self.api.create_visit_bulk(&payload).await,
        };
        self.saving = false;

        match result {
            Ok(visit) => {
                info!(
                    visit = visit.id,
                    machines = payload.machine_restocks.len(),
                    "visit saved"
                );
                Ok(visit)
            }
            Err(e) => Err(self.fail(CoreError::from(e))),
        }
    }

    /// Save request by request. Slower, but works against backends without
    /// the bulk endpoints. When editing, existing restocks and entries are
    /// updated in place rather than duplicated.
    pub async fn save_sequential(&mut self, user: Option<i64>) -> Result<Visit, CoreError> {
        self.error = None;
        if let Err(e) = self.form.validate() {
            return Err(self.fail(CoreError::Validation { message: e.to_string() }));
        }
        warn!("saving visit through the sequential fallback");

        self.saving = true;
        let result = self.write_sequential(user).await;
        self.saving = false;

        result.map_err(|e| {
            warn!(error = %e, "sequential visit save failed");
            self.error = Some(SAVE_FAILED.to_owned());
            e
        })
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Record the banner for a failed save and hand the error back.
    ///
    /// A reason from the backend (or from client-side validation) is shown
    /// as is; transport and session failures show the generic message.
    fn fail(&mut self, err: CoreError) -> CoreError {
        warn!(error = %err, "visit save failed");
        self.error = Some(match &err {
            CoreError::Validation { message } | CoreError::Api { message, .. }
                if !message.is_empty() =>
            {
                message.clone()
            }
            _ => SAVE_FAILED.to_owned(),
        });
        err
    }

    async fn write_sequential(&self, user: Option<i64>) -> Result<Visit, CoreError> {
        let form = &self.form;
        let location = form.location.ok_or_else(|| CoreError::Validation {
            message: FormError::MissingLocation.to_string(),
        })?;
        let body = VisitBody {
            location,
            visit_date: &form.visit_date,
            notes: &form.notes,
            user,
        };
        let visit = match form.id {
            Some(id) => self.api.update_visit(id, &body).await?,
            None => self.api.create_visit(&body).await?,
        };

        for machine in form.active_machines() {
            let restock_id = self.upsert_restock(visit.id, machine).await?;
            for row in machine.active_rows() {
                self.upsert_entry(restock_id, row).await?;
            }
        }
        Ok(visit)
    }

    async fn upsert_restock(&self, visit: i64, machine: &MachineRows) -> Result<i64, CoreError> {
        if self.form.is_editing() {
            let query = QueryParams::new()
                .with("visit", visit)
                .with("machine", machine.machine);
            if let Some(existing) = self.api.list_restocks(&query, true).await?.into_iter().next() {
                let notes = existing.notes.clone().unwrap_or_default();
                let body = RestockBody {
                    visit,
                    machine: machine.machine,
                    notes: &notes,
                };
                self.api.update_restock(existing.id, &body).await?;
                debug!(restock = existing.id, "updated machine restock");
                return Ok(existing.id);
            }
        }
        let body = RestockBody {
            visit,
            machine: machine.machine,
            notes: &machine.notes,
        };
        let created = self.api.create_restock(&body).await?;
        debug!(restock = created.id, "created machine restock");
        Ok(created.id)
    }

    async fn upsert_entry(&self, restock: i64, row: &ProductRow) -> Result<(), CoreError> {
        let body = entry_body(restock, row)?;
        if self.form.is_editing() {
            let query = QueryParams::new()
                .with("visit_machine_restock", restock)
                .with("product", row.product);
            let existing = self.api.list_restock_entries(&query, true).await?;
            if let Some(entry) = existing.first() {
                self.api.update_restock_entry(entry.id, &body).await?;
                return Ok(());
            }
        }
        self.api.create_restock_entry(&body).await?;
        Ok(())
    }
}

fn entry_body(restock: i64, row: &ProductRow) -> Result<EntryBody, CoreError> {
    let encoded = row.encode().map_err(|e| CoreError::Validation {
        message: e.to_string(),
    })?;
    Ok(EntryBody {
        visit_machine_restock: restock,
        product: encoded.product,
        stock_before: encoded.stock_before,
        discarded: encoded.discarded,
        restocked: encoded.restocked,
    })
}
