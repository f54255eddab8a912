use crate::commands::{run_bonus, run_evaluate, run_quota_status, EvaluateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use redacai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "RedacAI",
    about = "Serve and exercise the RedacAI essay correction workflow",
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
    /// Submit an essay for correction against today's free allowance
    Evaluate(EvaluateArgs),
    /// Inspect or adjust today's free allowance
    Quota {
        #[command(subcommand)]
        command: QuotaCommand,
    },
}

#[derive(Subcommand, Debug)]
enum QuotaCommand {
    /// Show used and remaining free evaluations for today
    Status,
    /// Claim the one-time bonus evaluation (requires APP_SESSION_USER)
    Bonus,
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
        Command::Evaluate(args) => run_evaluate(args).await,
        Command::Quota {
            command: QuotaCommand::Status,
        } => run_quota_status(),
        Command::Quota {
            command: QuotaCommand::Bonus,
        } => run_bonus(),
    }
}
