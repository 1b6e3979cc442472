//! Location command handlers.

use tabled::Tabled;
use vendtrack_api::Location;
use vendtrack_core::Session;

use crate::cli::{GlobalOpts, LocationsArgs, LocationsCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LocationRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Route")]
    route: String,
    #[tabled(rename = "Address")]
    address: String,
}

impl From<&Location> for LocationRow {
    fn from(l: &Location) -> Self {
        Self {
            id: l.id,
            name: l.name.clone(),
            route: output::opt(l.route.as_ref()),
            address: output::opt(l.address.as_ref()),
        }
    }
}

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "Route")]
    route: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: &LocationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let api = session.api();
    let out = match args.command {
        LocationsCommand::List => {
            let locations = api.list_locations(session.skip_cache()).await?;
            output::render_list(global.output, &locations, |l| LocationRow::from(l), |l| {
                l.id.to_string()
            })?
        }
        LocationsCommand::Routes => {
            let routes = api.list_routes(session.skip_cache()).await?;
            output::render_list(
                global.output,
                &routes,
                |r| RouteRow { route: r.clone() },
                Clone::clone,
            )?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
