//! Clap derive structures for the `vendtrack` CLI.
//!
//! Defines the command tree, global flags, and shared value types.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vendtrack -- vending route operations from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "vendtrack",
    version,
    about = "Track vending machines, stock and restock visits from the command line",
    long_about = "Read dashboards, inventory and analytics reports from a vendtrack\n\
        backend, browse locations, machines and products, and record restock visits.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "VENDTRACK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, short = 'a', env = "VENDTRACK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Login name (overrides profile)
    #[arg(long, short = 'u', env = "VENDTRACK_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "VENDTRACK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "VENDTRACK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "VENDTRACK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Bypass cached responses (fresh data is still cached)
    #[arg(long, env = "VENDTRACK_NO_CACHE", global = true)]
    pub no_cache: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one identifier per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and show the current user
    Login(LoginArgs),

    /// Headline figures for the fleet
    #[command(alias = "dash")]
    Dashboard(DashboardArgs),

    /// Current stock, restock summary and stock coverage reports
    #[command(alias = "inv")]
    Inventory(InventoryArgs),

    /// Revenue, stock level and demand analytics
    Analytics(AnalyticsArgs),

    /// Browse locations
    #[command(alias = "loc")]
    Locations(LocationsArgs),

    /// Browse machines
    Machines(MachinesArgs),

    /// Browse products
    Products(ProductsArgs),

    /// Browse suppliers
    Suppliers(SuppliersArgs),

    /// Browse restock visits
    Visits(VisitsArgs),

    /// Record a restock visit
    Visit(VisitArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGIN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Store the password in the system keyring after a successful login
    #[arg(long)]
    pub save_password: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REPORTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Reporting window in days
    #[arg(long, short = 'd', default_value = "30")]
    pub days: u32,

    /// Only this location
    #[arg(long, short = 'l')]
    pub location: Option<i64>,

    /// Only machines of this type
    #[arg(long)]
    pub machine_type: Option<String>,
}

#[derive(Debug, Args)]
pub struct InventoryArgs {
    /// Load a single report instead of all three
    #[arg(long, short = 'r', value_enum)]
    pub report: Option<InventoryReportArg>,

    #[arg(long, short = 'l')]
    pub location: Option<i64>,

    #[arg(long)]
    pub product: Option<i64>,

    #[arg(long, short = 'm')]
    pub machine: Option<i64>,

    /// Restock summary start date (YYYY-MM-DD)
    #[arg(long, requires = "end_date")]
    pub start_date: Option<NaiveDate>,

    /// Restock summary end date (YYYY-MM-DD)
    #[arg(long, requires = "start_date")]
    pub end_date: Option<NaiveDate>,

    /// Restock summary window when no date range is given
    #[arg(long, short = 'd', default_value = "7")]
    pub days: u32,

    /// Stock coverage analysis window
    #[arg(long, default_value = "30")]
    pub analysis_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InventoryReportArg {
    CurrentStock,
    RestockSummary,
    StockCoverage,
}

#[derive(Debug, Args)]
pub struct AnalyticsArgs {
    /// Trailing window in days
    #[arg(long, short = 'd', conflicts_with_all = ["start_date", "end_date"])]
    pub days: Option<u32>,

    /// Custom range start (YYYY-MM-DD); defaults to 30 days before the end
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Custom range end (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    #[arg(long, short = 'l')]
    pub location: Option<i64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REFERENCE DATA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LocationsArgs {
    #[command(subcommand)]
    pub command: LocationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LocationsCommand {
    /// List all locations
    #[command(alias = "ls")]
    List,

    /// List the distinct route names
    Routes,
}

#[derive(Debug, Args)]
pub struct MachinesArgs {
    #[command(subcommand)]
    pub command: MachinesCommand,
}

#[derive(Debug, Subcommand)]
pub enum MachinesCommand {
    /// List machines
    #[command(alias = "ls")]
    List {
        /// Only machines at this location
        #[arg(long, short = 'l')]
        location: Option<i64>,
    },

    /// List the products slotted into a machine
    Slots {
        /// Machine ID
        machine: i64,
    },
}

#[derive(Debug, Args)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProductsCommand {
    /// List products
    #[command(alias = "ls")]
    List,

    /// Show the purchase cost history of a product
    Costs {
        /// Product ID
        product: i64,
    },
}

#[derive(Debug, Args)]
pub struct SuppliersArgs {
    #[command(subcommand)]
    pub command: SuppliersCommand,
}

#[derive(Debug, Subcommand)]
pub enum SuppliersCommand {
    /// List suppliers
    #[command(alias = "ls")]
    List {
        /// Only active suppliers
        #[arg(long)]
        active: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VISITS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VisitsArgs {
    #[command(subcommand)]
    pub command: VisitsCommand,
}

#[derive(Debug, Subcommand)]
pub enum VisitsCommand {
    /// List restock visits
    #[command(alias = "ls")]
    List {
        /// Only visits to this location
        #[arg(long, short = 'l')]
        location: Option<i64>,
    },
}

#[derive(Debug, Args)]
pub struct VisitArgs {
    #[command(subcommand)]
    pub command: VisitCommand,
}

#[derive(Debug, Subcommand)]
pub enum VisitCommand {
    /// Validate and save a visit described in a JSON file
    Submit {
        /// JSON file with location, visit_date, notes and machine rows
        #[arg(long, short = 'f')]
        from_file: PathBuf,

        /// Update this existing visit instead of creating one
        #[arg(long)]
        id: Option<i64>,

        /// Save request by request instead of one bulk request
        #[arg(long)]
        sequential: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
