//! Command dispatch: bridges CLI args -> core loaders -> output formatting.

pub mod analytics;
pub mod config_cmd;
pub mod dashboard;
pub mod inventory;
pub mod locations;
pub mod login;
pub mod machines;
pub mod products;
pub mod suppliers;
pub mod util;
pub mod visits;

use vendtrack_core::Session;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Dashboard(args) => dashboard::handle(session, args, global).await,
        Command::Inventory(args) => inventory::handle(session, &args, global).await,
        Command::Analytics(args) => analytics::handle(session, &args, global).await,
        Command::Locations(args) => locations::handle(session, &args, global).await,
        Command::Machines(args) => machines::handle(session, &args, global).await,
        Command::Products(args) => products::handle(session, &args, global).await,
        Command::Suppliers(args) => suppliers::handle(session, &args, global).await,
        Command::Visits(args) => visits::list(session, &args, global).await,
        Command::Visit(args) => visits::submit(session, args, global).await,
        Command::Config(_) | Command::Completions(_) | Command::Login(_) => {
            Err(CliError::Internal("command is handled before dispatch".into()))
        }
    }
}
