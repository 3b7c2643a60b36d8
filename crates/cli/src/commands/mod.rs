pub mod inspect;
pub mod reconcile;

use std::process::ExitCode;

use clap::Subcommand;
pub use inspect::InspectArgs;
pub use reconcile::ReconcileArgs;
use snapdiff_runtime::ConfigError;
use snapdiff_snapshot::{FilterError, SnapshotError};

/// Common error type for command handlers
pub type CommandResult<T> = anyhow::Result<T>;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconcile two snapshots into moved, renamed, modified, deleted and added.
    ///
    /// Example:
    ///   snapdiff reconcile before.tsv after.tsv
    ///   snapdiff diff --table --ignore-modtime old.tsv new.tsv
    #[command(visible_alias = "diff")]
    Reconcile(ReconcileArgs),

    /// Summarize a single snapshot: record counts and available fields.
    Inspect(InspectArgs),
}

/// Print a failed command's error chain and pick its exit status.
///
/// Problems with what the user asked for (missing snapshot, bad pattern,
/// bad settings file) exit with 2; everything else with 1.
pub fn report_failure(command: &str, e: &anyhow::Error) -> ExitCode {
    eprintln!("[error] {command}: {e:#}");

    let usage = matches!(
        e.downcast_ref::<SnapshotError>(),
        Some(SnapshotError::NotFound(_))
    ) || e.is::<FilterError>()
        || e.is::<ConfigError>();

    if usage {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}
