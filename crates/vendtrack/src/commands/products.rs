//! Product command handlers.

use tabled::Tabled;
use vendtrack_api::{Product, ProductCost, QueryParams};
use vendtrack_core::Session;

use crate::cli::{GlobalOpts, ProductsArgs, ProductsCommand};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "Unit")]
    unit_type: String,
    #[tabled(rename = "Avg cost")]
    average_cost: String,
}

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            sku: output::opt(p.sku.as_ref()),
            unit_type: output::opt(p.unit_type.as_ref()),
            average_cost: p.average_cost.map(output::fixed2).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct CostRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Qty")]
    quantity: String,
    #[tabled(rename = "Unit cost")]
    unit_cost: String,
    #[tabled(rename = "Total")]
    total_cost: String,
    #[tabled(rename = "Supplier")]
    supplier: String,
}

impl From<&ProductCost> for CostRow {
    fn from(c: &ProductCost) -> Self {
        Self {
            date: c.date.clone(),
            quantity: output::opt(c.quantity.as_ref()),
            unit_cost: c.unit_cost.map(output::fixed2).unwrap_or_default(),
            total_cost: c.total_cost.map(output::fixed2).unwrap_or_default(),
            supplier: output::opt(c.supplier.as_ref()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: &ProductsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let api = session.api();
    let out = match args.command {
        ProductsCommand::List => {
            let products = api
                .list_products(&QueryParams::new(), session.skip_cache())
                .await?;
            output::render_list(global.output, &products, |p| ProductRow::from(p), |p| {
                p.id.to_string()
            })?
        }
        ProductsCommand::Costs { product } => {
            let costs = api
                .product_cost_history(product, session.skip_cache())
                .await?;
            output::render_list(global.output, &costs, |c| CostRow::from(c), |c| c.id.to_string())?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
