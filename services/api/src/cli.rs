use crate::render::{run_lookup, run_queue, LookupArgs, QueueArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use return_tracker::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Tax Return Status Tracker",
    about = "Look up tax return progress and serve the status API",
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
    /// Look up one client's return by full name or email
    Lookup(LookupArgs),
    /// Print the full ranked queue with projected completion dates
    Queue(QueueArgs),
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
        Command::Queue(args) => run_queue(args).await,
    }
}
