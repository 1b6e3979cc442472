//! Supplier command handlers.

use tabled::Tabled;
use vendtrack_api::{QueryParams, Supplier};
use vendtrack_core::Session;

use crate::cli::{GlobalOpts, SuppliersArgs, SuppliersCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SupplierRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Contact")]
    contact: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Active")]
    active: &'static str,
}

impl From<&Supplier> for SupplierRow {
    fn from(s: &Supplier) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            contact: output::opt(s.contact_person.as_ref()),
            phone: output::opt(s.phone.as_ref()),
            active: if s.is_active { "yes" } else { "no" },
        }
    }
}

pub async fn handle(
    session: &Session,
    args: &SuppliersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let api = session.api();
    let SuppliersCommand::List { active } = args.command;
    let suppliers = if active {
        api.list_active_suppliers(session.skip_cache()).await?
    } else {
        api.list_suppliers(&QueryParams::new(), session.skip_cache())
            .await?
    };
    let out = output::render_list(global.output, &suppliers, |s| SupplierRow::from(s), |s| {
        s.id.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
