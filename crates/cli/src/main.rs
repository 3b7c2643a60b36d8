use std::process::ExitCode;

use clap::{ArgAction, Parser};

mod commands;
mod printer;

use commands::Command;
use snapdiff_runtime::logging;

#[derive(Debug, Parser)]
#[command(
    name = "snapdiff",
    version,
    about = "Reconcile two file tree snapshots",
    propagate_version = true
)]
pub struct Cli {
    /// Raise diagnostic verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_with_verbosity(cli.verbose).ok();

    match cli.command {
        Command::Reconcile(args) => commands::reconcile::run(args),
        Command::Inspect(args) => commands::inspect::run(args),
    }
}
