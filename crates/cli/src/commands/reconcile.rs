use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Args;
use log::{debug, info, warn};
use snapdiff_engine::{
    IdentityPolicy, Overrides, Resolution, Severity, reconcile, reconcile_timed,
};
use snapdiff_runtime::{ReportFormat, Settings};
use snapdiff_snapshot::{SkipFilter, Snapshot, SnapshotReader};

use crate::commands::{CommandResult, report_failure};
use crate::printer::{PrinterConfig, ReportContext, ReportPrinter, make_printer, print_report};

#[derive(Debug, Args)]
pub struct OutputOptions {
    /// Print both sides of every change in fixed columns
    #[arg(long, conflicts_with = "json")]
    pub table: bool,

    /// Output changes as NDJSON (one JSON object per line)
    #[arg(long)]
    pub json: bool,

    /// Show per-stage timing on stderr
    #[arg(long)]
    pub timing: bool,
}

impl OutputOptions {
    /// Flags win over the settings file.
    pub fn config(&self, settings: &Settings) -> PrinterConfig {
        let format = if self.json {
            ReportFormat::Json
        } else if self.table {
            ReportFormat::Table
        } else {
            settings.format
        };

        PrinterConfig {
            format,
            show_timing: self.timing,
        }
    }
}

#[derive(Debug, Args)]
pub struct FilterOptions {
    /// Leave out paths matching a gitignore-style pattern (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub excludes: Vec<String>,

    /// Keep .DS_Store and ._* sidecar files
    #[arg(long)]
    pub no_default_excludes: bool,
}

impl FilterOptions {
    pub fn build(&self, settings: &Settings) -> CommandResult<SkipFilter> {
        let mut settings = settings.clone();
        if self.no_default_excludes {
            settings.default_excludes = false;
        }
        let patterns = settings
            .skip_patterns()
            .into_iter()
            .chain(self.excludes.iter().cloned());

        Ok(SkipFilter::new(patterns)?)
    }
}

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Older snapshot
    #[arg(value_name = "SNAPSHOT_A")]
    pub snapshot_a: PathBuf,

    /// Newer snapshot
    #[arg(value_name = "SNAPSHOT_B")]
    pub snapshot_b: PathBuf,

    /// Ignore modification times and match on hashes alone
    #[arg(long, conflicts_with = "ignore_hash")]
    pub ignore_modtime: bool,

    /// Ignore hashes and match on size and modification time
    #[arg(long)]
    pub ignore_hash: bool,

    /// Compare modification times with sub-second precision
    #[arg(long)]
    pub nanosecond: bool,

    /// Swap the two snapshots
    #[arg(long, short = 'r')]
    pub reverse: bool,

    #[command(flatten)]
    pub filter: FilterOptions,

    #[command(flatten)]
    pub output: OutputOptions,
}

pub fn run(args: ReconcileArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => report_failure("reconcile", &e),
    }
}

fn execute(args: ReconcileArgs) -> CommandResult<ExitCode> {
    let settings = Settings::load()?;
    let reader = SnapshotReader::new(args.filter.build(&settings)?);

    let (older, newer) = if args.reverse {
        (&args.snapshot_b, &args.snapshot_a)
    } else {
        (&args.snapshot_a, &args.snapshot_b)
    };

    let left = reader.open(older)?;
    let right = reader.open(newer)?;

    let overrides = Overrides {
        ignore_mod_time: args.ignore_modtime,
        ignore_hash: args.ignore_hash,
        nanosecond: args.nanosecond || settings.nanosecond,
    };

    let cfg = args.output.config(&settings);
    let mut printer = make_printer(cfg);

    report(printer.as_mut(), &left, &right, overrides, cfg.show_timing)?;

    Ok(ExitCode::SUCCESS)
}

fn report(
    printer: &mut dyn ReportPrinter,
    left: &Snapshot,
    right: &Snapshot,
    overrides: Overrides,
    timed: bool,
) -> CommandResult<()> {
    for snapshot in [left, right] {
        printer.comment(&format!(
            "Read {} items from {}",
            snapshot.len(),
            snapshot.label
        ))?;
        debug!("[reconcile] {}: {:?}", snapshot.label, snapshot.stats);
    }

    let Resolution { policy, notices } =
        IdentityPolicy::resolve(left.capabilities, right.capabilities, overrides)
            .context("cannot reconcile these snapshots")?;

    for notice in notices {
        match notice.severity() {
            Severity::Comment => printer.comment(&notice.to_string())?,
            Severity::Info => info!("[reconcile] {notice}"),
            Severity::Warning => warn!("[reconcile] {notice}"),
        }
    }
    for line in policy.describe() {
        printer.comment(&line)?;
    }

    let (result, metrics) = if timed {
        let (result, metrics) = reconcile_timed(policy, left, right);
        (result, Some(metrics))
    } else {
        (reconcile(policy, left, right), None)
    };

    if result.is_empty() {
        info!(
            "[reconcile] no differences between {} and {}",
            left.label, right.label
        );
    }
    if result.duplicates > 0 {
        info!("[reconcile] dropped {} duplicate records", result.duplicates);
    }

    let ctx = ReportContext {
        left: &left.label,
        right: &right.label,
        metrics: metrics.as_ref(),
    };
    print_report(printer, &result, &ctx)?;

    Ok(())
}
