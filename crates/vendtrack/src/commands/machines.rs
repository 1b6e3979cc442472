//! Machine command handlers.

use tabled::Tabled;
use vendtrack_api::{Machine, MachineItem, QueryParams};
use vendtrack_core::Session;

use crate::cli::{GlobalOpts, MachinesArgs, MachinesCommand};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct MachineRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Type")]
    machine_type: String,
    #[tabled(rename = "Model")]
    model: String,
}

impl From<&Machine> for MachineRow {
    fn from(m: &Machine) -> Self {
        Self {
            id: m.id,
            name: output::opt(m.name.as_ref()),
            location: m
                .location_name
                .clone()
                .unwrap_or_else(|| m.location.to_string()),
            machine_type: output::opt(m.machine_type.as_ref()),
            model: output::opt(m.model.as_ref()),
        }
    }
}

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Slot")]
    slot: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Stock")]
    stock: String,
}

impl From<&MachineItem> for SlotRow {
    fn from(i: &MachineItem) -> Self {
        Self {
            slot: output::opt(i.slot.as_ref()),
            product: i
                .product_name
                .clone()
                .unwrap_or_else(|| i.product.to_string()),
            price: i.price.map(output::fixed2).unwrap_or_default(),
            stock: output::opt(i.current_stock.as_ref()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: &MachinesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let api = session.api();
    let out = match args.command {
        MachinesCommand::List { location } => {
            let params = QueryParams::new().with_opt("location", location);
            let machines = api.list_machines(&params, session.skip_cache()).await?;
            output::render_list(global.output, &machines, |m| MachineRow::from(m), |m| {
                m.id.to_string()
            })?
        }
        MachinesCommand::Slots { machine } => {
            let params = QueryParams::new().with("machine", machine);
            let slots = api.list_machine_items(&params, session.skip_cache()).await?;
            output::render_list(global.output, &slots, |i| SlotRow::from(i), |i| i.id.to_string())?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
