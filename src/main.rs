use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use dealscope::cli::scorecard::ScorecardOptions;
use dealscope::cli::screen::ScreenOptions;
use dealscope::core::log::init_logging;
use dealscope::core::records::DealTerms;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ScreenArgs {
    /// Deal id or company name from the journal
    #[arg(short, long)]
    deal: Option<String>,
    /// Annual revenue
    #[arg(long)]
    revenue: Option<f64>,
    /// Annual EBITDA
    #[arg(long)]
    ebitda: Option<f64>,
    /// Asking price
    #[arg(long)]
    asking_price: Option<f64>,
    /// Down payment as a percentage of the asking price
    #[arg(long)]
    down_payment: Option<f64>,
    /// Seller note as a percentage of the asking price
    #[arg(long)]
    seller_note: Option<f64>,
    /// SBA loan annual interest rate (%)
    #[arg(long)]
    sba_rate: Option<f64>,
    /// SBA loan term in years
    #[arg(long)]
    sba_term: Option<f64>,
    /// Seller note annual interest rate (%)
    #[arg(long)]
    seller_note_rate: Option<f64>,
    /// Seller note term in years
    #[arg(long)]
    seller_note_term: Option<f64>,
    /// Print the analysis as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ScorecardArgs {
    /// Evaluate goals as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    as_of: Option<NaiveDate>,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration and an example journal
    Setup,
    /// Screen a deal's financials and financing structure
    Screen(ScreenArgs),
    /// Display outreach goal pacing and KPIs
    Scorecard(ScorecardArgs),
}

impl From<ScreenArgs> for ScreenOptions {
    fn from(args: ScreenArgs) -> ScreenOptions {
        ScreenOptions {
            deal: args.deal,
            terms: DealTerms {
                revenue: args.revenue,
                ebitda: args.ebitda,
                asking_price: args.asking_price,
                down_payment_pct: args.down_payment,
                seller_note_pct: args.seller_note,
                sba_rate_annual_pct: args.sba_rate,
                sba_term_years: args.sba_term,
                seller_note_rate_annual_pct: args.seller_note_rate,
                seller_note_term_years: args.seller_note_term,
            },
            json: args.json,
        }
    }
}

impl From<Commands> for dealscope::AppCommand {
    fn from(cmd: Commands) -> dealscope::AppCommand {
        match cmd {
            Commands::Screen(args) => dealscope::AppCommand::Screen(args.into()),
            Commands::Scorecard(args) => dealscope::AppCommand::Scorecard(ScorecardOptions {
                as_of: args.as_of,
                json: args.json,
            }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => dealscope::cli::setup::setup(),
        Some(cmd) => dealscope::run_command(cmd.into(), cli.config_path.as_deref()),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
