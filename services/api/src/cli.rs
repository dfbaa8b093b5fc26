use crate::commands::{
    run_dashboard, run_image_comparison, run_resolution, run_severity, CompareArgs, DashboardArgs,
    ResolutionArgs, SeverityArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use incident_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Incident Analytics",
    about = "Estimate incident severity and resolution time, and run AI-assisted assessments",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Estimate severity for an incident type in a taluk
    Severity(SeverityArgs),
    /// Estimate resolution time for an incident type in a taluk
    Resolution(ResolutionArgs),
    /// Print dashboard aggregations over the incident ledger
    Dashboard(DashboardArgs),
    /// AI-assisted image assessments
    Images {
        #[command(subcommand)]
        command: ImagesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ImagesCommand {
    /// Compare before/after images of an incident site
    Compare(CompareArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Severity(args) => run_severity(args).await,
        Command::Resolution(args) => run_resolution(args),
        Command::Dashboard(args) => run_dashboard(args),
        Command::Images {
            command: ImagesCommand::Compare(args),
        } => run_image_comparison(args).await,
    }
}
