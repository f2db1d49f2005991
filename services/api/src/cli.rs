use crate::demo::{run_cafes, run_compose, run_demo, run_match, CafesArgs, ComposeArgs, MatchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use smoothie_match::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Smoothie Match",
    about = "Score, rank, and compose smoothies against a taste and health profile",
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
    /// Rank catalog smoothies for a profile
    Match(MatchArgs),
    /// Rank cafés by the average fit of their menu
    Cafes(CafesArgs),
    /// Compose profitable recipes from the ingredient inventory
    Compose(ComposeArgs),
    /// Run an end-to-end walkthrough over the bundled seed data
    Demo,
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
        Command::Match(args) => run_match(args),
        Command::Cafes(args) => run_cafes(args),
        Command::Compose(args) => run_compose(args),
        Command::Demo => run_demo(),
    }
}
