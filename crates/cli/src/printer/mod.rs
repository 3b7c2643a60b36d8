use std::io::{self, Write};

use serde_json::{Value, json};
use snapdiff_engine::{Change, ChangeKind, Entry, Reconciliation, Stage, StageMetrics};
use snapdiff_runtime::ReportFormat;

/// Placeholder for a field or side that does not exist.
const ABSENT: &str = "-";

/// Configuration for printing a reconciliation report.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrinterConfig {
    pub format: ReportFormat,
    /// Whether to show per-stage timing on stderr.
    pub show_timing: bool,
}

/// Static context about a report run.
#[derive(Debug)]
pub struct ReportContext<'a> {
    /// Label of the older snapshot.
    pub left: &'a str,
    /// Label of the newer snapshot.
    pub right: &'a str,
    /// Optional timing metrics.
    pub metrics: Option<&'a StageMetrics>,
}

/// Trait for printing a reconciliation.
///
/// Sections arrive in report order, each exactly once, empty ones included.
pub trait ReportPrinter {
    /// Audit line such as read counts or the identity policy in use.
    fn comment(&mut self, text: &str) -> io::Result<()>;

    /// Called once per change category.
    fn section(
        &mut self,
        kind: ChangeKind,
        changes: &[Change<'_>],
        ctx: &ReportContext<'_>,
    ) -> io::Result<()>;

    /// Called once after all sections are printed.
    fn finish(&mut self, report: &Reconciliation<'_>, ctx: &ReportContext<'_>)
    -> io::Result<()>;
}

/// Print every section of `report` followed by the footer.
pub fn print_report(
    printer: &mut dyn ReportPrinter,
    report: &Reconciliation<'_>,
    ctx: &ReportContext<'_>,
) -> io::Result<()> {
    for (kind, changes) in report.sections() {
        printer.section(kind, changes, ctx)?;
    }
    printer.finish(report, ctx)
}

fn section_header(kind: ChangeKind, count: usize, ctx: &ReportContext<'_>) -> String {
    match kind {
        ChangeKind::Moved => format!("Moved {count} items between {} and {}", ctx.left, ctx.right),
        ChangeKind::Renamed => {
            format!("Renamed {count} items between {} and {}", ctx.left, ctx.right)
        }
        ChangeKind::Modified => {
            format!("Modified {count} items between {} and {}", ctx.left, ctx.right)
        }
        ChangeKind::Deleted => format!("Deleted {count} items since {}", ctx.left),
        ChangeKind::Added => format!("Added {count} items in {}", ctx.right),
    }
}

fn or_absent(value: Option<&str>) -> &str {
    value.unwrap_or(ABSENT)
}

fn size_field(entry: &Entry<'_>) -> String {
    entry
        .size()
        .map_or_else(|| ABSENT.to_owned(), |s| s.to_string())
}

/// `modtime<TAB>size<TAB>hash<TAB>path`, or four placeholders.
fn record_fields(entry: Option<&Entry<'_>>) -> String {
    match entry {
        Some(e) => format!(
            "{}\t{}\t{}\t{}",
            or_absent(e.mod_time),
            size_field(e),
            or_absent(e.hash()),
            e.path()
        ),
        None => [ABSENT; 4].join("\t"),
    }
}

fn narrative_row(change: &Change<'_>) -> String {
    let tag = change.kind.tag();
    let left = change.left.as_ref();
    let right = change.right.as_ref();

    match change.kind {
        ChangeKind::Deleted => format!("{tag}\t{}", record_fields(left)),
        ChangeKind::Added => format!("{tag}\t{}", record_fields(right)),
        ChangeKind::Moved | ChangeKind::Renamed => format!(
            "{tag}\t{}\t->\t{}",
            record_fields(left),
            or_absent(right.map(|e| e.path()))
        ),
        ChangeKind::Modified => format!(
            "{tag}\t{}\t{}\t->\t{}",
            or_absent(left.and_then(|e| e.mod_time)),
            left.map_or_else(|| ABSENT.to_owned(), size_field),
            record_fields(right)
        ),
    }
}

fn table_row(change: &Change<'_>) -> String {
    format!(
        "{}\t{}\t{}",
        change.kind.tag(),
        record_fields(change.left.as_ref()),
        record_fields(change.right.as_ref())
    )
}

/// Tab-separated printer for the narrative and table layouts.
pub struct TextPrinter<W: Write, E: Write> {
    out: W,
    err: E,
    cfg: PrinterConfig,
}

impl<W: Write, E: Write> TextPrinter<W, E> {
    pub fn new(out: W, err: E, cfg: PrinterConfig) -> Self {
        Self { out, err, cfg }
    }

    pub fn into_inner(self) -> (W, E) {
        (self.out, self.err)
    }

    fn row(&self, change: &Change<'_>) -> String {
        match self.cfg.format {
            ReportFormat::Table => table_row(change),
            ReportFormat::Narrative | ReportFormat::Json => narrative_row(change),
        }
    }
}

impl TextPrinter<io::Stdout, io::Stderr> {
    /// Create a printer that writes to stdout and stderr.
    pub fn stdout(cfg: PrinterConfig) -> Self {
        Self::new(io::stdout(), io::stderr(), cfg)
    }
}

impl<W: Write, E: Write> ReportPrinter for TextPrinter<W, E> {
    fn comment(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "# {text}")
    }

    fn section(
        &mut self,
        kind: ChangeKind,
        changes: &[Change<'_>],
        ctx: &ReportContext<'_>,
    ) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "# {}", section_header(kind, changes.len(), ctx))?;
        for change in changes {
            let row = self.row(change);
            writeln!(self.out, "{row}")?;
        }
        Ok(())
    }

    fn finish(&mut self, report: &Reconciliation<'_>, ctx: &ReportContext<'_>) -> io::Result<()> {
        self.out.flush()?;

        if self.cfg.show_timing
            && let Some(m) = ctx.metrics
        {
            let stages: Vec<String> = Stage::ALL
                .into_iter()
                .map(|stage| {
                    let ms = m.get(stage).unwrap_or_default().as_secs_f64() * 1000.0;
                    format!("{}: {ms:.2}ms", stage.label())
                })
                .collect();

            writeln!(
                self.err,
                "\n[reconcile] {} changes, {} unchanged in {:.2}ms ({})",
                report.total_changes(),
                report.unchanged,
                m.total().as_secs_f64() * 1000.0,
                stages.join(", ")
            )?;
        }

        Ok(())
    }
}

/// NDJSON printer: one object per change, then a summary object.
pub struct JsonPrinter<W: Write, E: Write> {
    out: W,
    err: E,
    cfg: PrinterConfig,
}

impl<W: Write, E: Write> JsonPrinter<W, E> {
    pub fn new(out: W, err: E, cfg: PrinterConfig) -> Self {
        Self { out, err, cfg }
    }

    pub fn into_inner(self) -> (W, E) {
        (self.out, self.err)
    }
}

impl JsonPrinter<io::Stdout, io::Stderr> {
    /// Create a printer that writes to stdout and stderr.
    pub fn stdout(cfg: PrinterConfig) -> Self {
        Self::new(io::stdout(), io::stderr(), cfg)
    }
}

fn entry_json(entry: Option<&Entry<'_>>) -> Value {
    match entry {
        Some(e) => json!({
            "mod_time": e.mod_time,
            "size": e.size(),
            "hash": e.hash(),
            "path": e.path(),
        }),
        None => Value::Null,
    }
}

impl<W: Write, E: Write> ReportPrinter for JsonPrinter<W, E> {
    fn comment(&mut self, _text: &str) -> io::Result<()> {
        Ok(())
    }

    fn section(
        &mut self,
        kind: ChangeKind,
        changes: &[Change<'_>],
        _ctx: &ReportContext<'_>,
    ) -> io::Result<()> {
        for change in changes {
            let obj = json!({
                "kind": kind.label(),
                "left": entry_json(change.left.as_ref()),
                "right": entry_json(change.right.as_ref()),
            });
            writeln!(self.out, "{obj}")?;
        }
        Ok(())
    }

    fn finish(&mut self, report: &Reconciliation<'_>, ctx: &ReportContext<'_>) -> io::Result<()> {
        let mut summary = json!({
            "type": "summary",
            "left": ctx.left,
            "right": ctx.right,
            "unchanged": report.unchanged,
            "duplicates": report.duplicates,
        });
        for (kind, changes) in report.sections() {
            summary[kind.label()] = json!(changes.len());
        }
        writeln!(self.out, "{summary}")?;

        if self.cfg.show_timing
            && let Some(m) = ctx.metrics
        {
            let mut timing = serde_json::Map::new();
            for stage in Stage::ALL {
                let ms = m.get(stage).unwrap_or_default().as_secs_f64() * 1000.0;
                timing.insert(stage.label().to_owned(), json!(ms));
            }
            timing.insert("total".to_owned(), json!(m.total().as_secs_f64() * 1000.0));
            let obj = json!({ "type": "timing", "timing_ms": timing });
            writeln!(self.err, "{obj}")?;
        }

        Ok(())
    }
}

/// Create a printer on stdout/stderr for `cfg`.
pub fn make_printer(cfg: PrinterConfig) -> Box<dyn ReportPrinter> {
    match cfg.format {
        ReportFormat::Narrative | ReportFormat::Table => Box::new(TextPrinter::stdout(cfg)),
        ReportFormat::Json => Box::new(JsonPrinter::stdout(cfg)),
    }
}

#[cfg(test)]
#[path = "printer_tests.rs"]
mod tests;
