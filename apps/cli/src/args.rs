use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

pub const DEFAULT_PORT: u16 = 3210;

#[derive(Debug, Parser)]
#[command(name = "llm-cost-monitor", version)]
#[command(about = "Track token usage and spend across LLM providers")]
pub struct Cli {
    /// Config file (defaults to ./config/config.toml, then ~/.llm-cost-monitor/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pull usage from the provider APIs into the ledger
    Fetch(FetchArgs),
    /// Print a cost report
    Report(ReportArgs),
    /// Compare spend against the budget
    Alert(AlertArgs),
    /// Send a message to notification channels
    Notify(NotifyArgs),
    /// Serve the local report API
    Serve(ServeArgs),
    /// Show the pricing table
    Pricing(PricingArgs),
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("day").args(["date", "today", "yesterday", "last_days"])))]
pub struct FetchArgs {
    /// Specific date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub today: bool,
    /// Default when no date is given
    #[arg(long)]
    pub yesterday: bool,
    /// The N days before today
    #[arg(long, value_name = "N")]
    pub last_days: Option<u32>,
    /// Fetch and price without writing to the ledger
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("format").args(["json", "html"])))]
pub struct ReportArgs {
    #[arg(long, value_parser = ["today", "yesterday", "week", "month"])]
    pub period: Option<String>,
    /// Specific date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "period")]
    pub date: Option<String>,
    #[arg(long = "from", value_name = "DATE", conflicts_with_all = ["period", "date"])]
    pub from: Option<String>,
    #[arg(long = "to", value_name = "DATE", requires = "from")]
    pub to: Option<String>,
    #[arg(long)]
    pub json: bool,
    #[arg(long)]
    pub html: bool,
    /// Write the HTML report to a file instead of stdout
    #[arg(long, requires = "html")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AlertArgs {
    /// Budget limit in USD (defaults to budget.monthly_limit)
    #[arg(long)]
    pub budget: Option<f64>,
    /// exit: 2 when exceeded, 1 past the threshold; warn: 1 past the threshold
    #[arg(long, default_value = "exit", value_parser = ["exit", "warn"])]
    pub mode: String,
    #[arg(long, default_value = "month", value_parser = ["today", "week", "month"])]
    pub period: String,
}

#[derive(Debug, Args)]
pub struct NotifyArgs {
    #[arg(short, long)]
    pub message: String,
    /// Comma separated channel names
    #[arg(short, long, value_delimiter = ',')]
    pub channel: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

#[derive(Debug, Args)]
pub struct PricingArgs {
    /// Show which entry prices this model
    #[arg(long)]
    pub model: Option<String>,
}
