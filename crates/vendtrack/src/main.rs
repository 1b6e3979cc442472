mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vendtrack_core::Session;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a backend
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "vendtrack", &mut std::io::stdout());
            Ok(())
        }

        // Login may prompt, so it builds an anonymous session itself
        Command::Login(args) => {
            let resolved = config::resolve_profile(&cli.global)?;
            commands::login::handle(&resolved, &args, &cli.global).await
        }

        cmd => {
            let resolved = config::resolve_profile(&cli.global)?;
            let session =
                Session::new(resolved.client_config()?)?.with_skip_cache(cli.global.no_cache);
            session.connect().await?;

            tracing::debug!(command = ?cmd, profile = %resolved.name, "dispatching command");
            commands::dispatch(cmd, &session, &cli.global).await
        }
    }
}
