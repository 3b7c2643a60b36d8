use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use snapdiff_runtime::Settings;
use snapdiff_snapshot::{Capabilities, SnapshotReader};

use crate::commands::reconcile::FilterOptions;
use crate::commands::{CommandResult, report_failure};

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Snapshot file to summarize
    pub snapshot: PathBuf,

    #[command(flatten)]
    pub filter: FilterOptions,
}

pub fn run(args: InspectArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => report_failure("inspect", &e),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn execute(args: InspectArgs) -> CommandResult<ExitCode> {
    let settings = Settings::load()?;
    let reader = SnapshotReader::new(args.filter.build(&settings)?);
    let snapshot = reader.open(&args.snapshot)?;

    let stats = snapshot.stats;
    let caps: Capabilities = snapshot.capabilities;

    println!("{:<22}{}", "snapshot:", snapshot.label);
    println!("{:<22}{}", "records:", snapshot.len());
    println!("{:<22}{}", "lines:", stats.lines);
    println!("{:<22}{}", "comments:", stats.comments);
    println!("{:<22}{}", "malformed:", stats.malformed);
    println!("{:<22}{}", "skipped:", stats.skipped);
    println!("{:<22}{}", "hashes:", yes_no(caps.has_all_hashes()));
    println!("{:<22}{}", "modification times:", yes_no(caps.has_all_mod_times()));
    println!(
        "{:<22}{}",
        "nanosecond precision:",
        yes_no(caps.has_nanoseconds_everywhere())
    );

    Ok(ExitCode::SUCCESS)
}
