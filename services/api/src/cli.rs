use crate::lookup::{run_lookup, run_suggest, LookupArgs, SuggestArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use neighborhood_insights::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Neighborhood Insights",
    about = "Serve or query address autocomplete and neighborhood insights from the command line",
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
    /// Look up schools, comparable homes and pricing for an address
    Lookup(LookupArgs),
    /// Print address suggestions for partial input
    Suggest(SuggestArgs),
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
        Command::Lookup(args) => run_lookup(args).await,
        Command::Suggest(args) => run_suggest(args).await,
    }
}
