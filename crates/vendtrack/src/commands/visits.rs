//! Visit command handlers: listing and submitting restock visits.

use serde::Deserialize;
use tabled::Tabled;
use tracing::debug;
use vendtrack_api::{QueryParams, Visit};
use vendtrack_core::{CoreError, MachineRows, ProductRow, RestockForm, Session};

use crate::cli::{GlobalOpts, VisitArgs, VisitCommand, VisitsArgs, VisitsCommand};
use crate::error::CliError;
use crate::output::{self, Field};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct VisitRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "By")]
    user: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

impl From<&Visit> for VisitRow {
    fn from(v: &Visit) -> Self {
        Self {
            id: v.id,
            date: v.visit_date.clone(),
            location: v
                .location_name
                .clone()
                .unwrap_or_else(|| v.location.to_string()),
            user: output::opt(v.user_name.as_ref()),
            notes: output::opt(v.notes.as_ref()),
        }
    }
}

fn visit_detail(v: &Visit) -> String {
    output::render_fields(&[
        Field::new("ID", v.id),
        Field::new("Date", &v.visit_date),
        Field::new(
            "Location",
            v.location_name.clone().unwrap_or_else(|| v.location.to_string()),
        ),
        Field::new("Notes", output::opt(v.notes.as_ref())),
    ])
}

// ── Visit file ──────────────────────────────────────────────────────

/// A stock count as typed: a number, text, or absent.
#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum Count {
    #[default]
    Blank,
    Number(i64),
    Text(String),
}

impl Count {
    fn into_field(self) -> String {
        match self {
            Self::Blank => String::new(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductEntry {
    product: i64,
    #[serde(default)]
    product_name: String,
    #[serde(default)]
    stock_before: Count,
    #[serde(default)]
    discarded: Count,
    #[serde(default)]
    restocked: Count,
}

#[derive(Debug, Deserialize)]
struct MachineEntry {
    machine: i64,
    #[serde(default)]
    label: String,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    products: Vec<ProductEntry>,
}

/// `visit submit --from-file` input.
#[derive(Debug, Deserialize)]
struct VisitFile {
    location: Option<i64>,
    /// `YYYY-MM-DDTHH:MM`; defaults to now (or the edited visit's date).
    visit_date: Option<String>,
    notes: Option<String>,
    #[serde(default)]
    machines: Vec<MachineEntry>,
}

impl VisitFile {
    /// Overlay the file onto a freshly initialized form.
    fn apply(self, form: &mut RestockForm) {
        if self.location.is_some() {
            form.location = self.location;
        }
        if let Some(date) = self.visit_date {
            form.visit_date = date;
        }
        if let Some(notes) = self.notes {
            form.notes = notes;
        }
        form.machines = self
            .machines
            .into_iter()
            .map(|m| {
                let mut rows = MachineRows::new(m.machine, m.label);
                rows.notes = m.notes;
                rows.products = m
                    .products
                    .into_iter()
                    .map(|p| ProductRow {
                        stock_before: p.stock_before.into_field(),
                        discarded: p.discarded.into_field(),
                        restocked: p.restocked.into_field(),
                        ..ProductRow::new(p.product, p.product_name)
                    })
                    .collect();
                rows
            })
            .collect();
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list(session: &Session, args: &VisitsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let VisitsCommand::List { location } = args.command;
    let params = QueryParams::new().with_opt("location", location);
    let visits = session.api().list_visits(&params, session.skip_cache()).await?;
    let out = output::render_list(
        global.output,
        &visits,
        |v| VisitRow::from(v),
        |v| v.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn submit(session: &Session, args: VisitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let VisitCommand::Submit {
        from_file,
        id,
        sequential,
    } = args.command;
    let file: VisitFile = util::read_json_file(&from_file)?;

    let mut editor = session.restock_editor();
    let existing = match id {
        Some(id) => Some(session.api().get_visit(id).await?),
        None => None,
    };
    editor.initialize_form(existing.as_ref());
    file.apply(editor.form_mut());

    let user = session.current_user().map(|u| u.id);
    debug!(editing = editor.is_editing(), sequential, "submitting visit");
    let result = if sequential {
        editor.save_sequential(user).await
    } else {
        editor.save(user).await
    };

    let visit = result.map_err(|e| match e {
        CoreError::Validation { message } => CliError::Validation {
            field: "visit".into(),
            reason: message,
        },
        other => CliError::from(other),
    })?;

    output::note(
        global,
        &format!(
            "Visit {} {}",
            visit.id,
            if existing.is_some() { "updated" } else { "saved" }
        ),
    );
    let out = output::render_single(global.output, &visit, visit_detail, |v| v.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
