mod cli;

use clap::{Parser, Subcommand};

use cli::usage_cmd::{View, DEFAULT_REPORT_DAYS};

#[derive(Parser)]
#[command(name = "chatmeter", about = "Usage analytics for the assistant chat service", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Scope queries to one user ID
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Bearer token (overrides env and config)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Service base URL (overrides config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Output JSON instead of text
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Today's usage
    Today,
    /// This week, Monday through today
    Week,
    /// This calendar month
    Month,
    /// Trailing 30-day trend
    Trend,
    /// This month versus the previous one
    Compare,
    /// Projected month-end totals
    Projection,
    /// Weekday activity patterns
    Patterns,
    /// Full usage report (default)
    Report {
        /// Days of history behind the trend window (max 89)
        #[arg(long, default_value_t = DEFAULT_REPORT_DAYS)]
        days: u32,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init,
    /// Validate config file
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let output_opts = cli::output::OutputOptions {
        format: if cli.json {
            cli::output::OutputFormat::Json
        } else {
            cli::output::OutputFormat::Text
        },
        pretty: cli.pretty,
        use_color: cli::output::detect_color(!cli.no_color),
        verbose: cli.verbose,
    };

    let (view, days) = match cli.command {
        Some(Commands::Config { action }) => {
            match action {
                ConfigAction::Init => cli::config_cmd::init(&output_opts)?,
                ConfigAction::Check => cli::config_cmd::check(&output_opts)?,
            }
            return Ok(());
        }
        Some(Commands::Today) => (View::Today, DEFAULT_REPORT_DAYS),
        Some(Commands::Week) => (View::Week, DEFAULT_REPORT_DAYS),
        Some(Commands::Month) => (View::Month, DEFAULT_REPORT_DAYS),
        Some(Commands::Trend) => (View::Trend, DEFAULT_REPORT_DAYS),
        Some(Commands::Compare) => (View::Compare, DEFAULT_REPORT_DAYS),
        Some(Commands::Projection) => (View::Projection, DEFAULT_REPORT_DAYS),
        Some(Commands::Patterns) => (View::Patterns, DEFAULT_REPORT_DAYS),
        Some(Commands::Report { days }) => (View::Report, days),
        None => (View::Report, DEFAULT_REPORT_DAYS),
    };

    cli::usage_cmd::run(view, days, cli.user, cli.token, cli.api_url, &output_opts).await
}
