use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use log::{debug, warn};

use crate::{
    Capabilities, FileRecord, SkipFilter,
    record::{HASH_PLACEHOLDER, NANOSECOND_PRECISION_WIDTH, truncate_timestamp},
};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("failed reading snapshot {label}: {source}")]
    Read {
        label: String,
        #[source]
        source: io::Error,
    },
}

/// Line accounting for one snapshot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReadStats {
    pub lines: usize,
    pub comments: usize,
    pub malformed: usize,
    /// Records dropped by the skip filter.
    pub skipped: usize,
}

/// All records of one snapshot together with what they have in common.
///
/// `capabilities` is only meaningful once the whole input has been read,
/// which is why a `Snapshot` is produced in one go and never extended.
#[derive(Debug, Default)]
pub struct Snapshot {
    /// Display name of the input, usually its path.
    pub label: String,
    pub records: Vec<FileRecord>,
    pub capabilities: Capabilities,
    pub stats: ReadStats,
}

impl Snapshot {
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Line {
    Blank,
    Comment,
    Record(FileRecord),
    Malformed,
}

/// Normalize a hash column: keep the first token, `-` or nothing means absent.
fn parse_hash(field: &str) -> Option<String> {
    field
        .split_whitespace()
        .next()
        .filter(|h| *h != HASH_PLACEHOLDER)
        .map(str::to_owned)
}

fn parse_mod_time(field: &str) -> Option<String> {
    let ts = field.trim();
    if ts.is_empty() {
        return None;
    }
    Some(truncate_timestamp(ts, NANOSECOND_PRECISION_WIDTH).to_owned())
}

/// `modtime<TAB>size<TAB>hash|-<TAB>path`
fn parse_full(mod_time: &str, size: &str, hash: &str, path: &str) -> Line {
    if path.is_empty() {
        return Line::Malformed;
    }
    let Ok(size) = size.trim().parse::<u64>() else {
        return Line::Malformed;
    };

    Line::Record(FileRecord::new(
        path,
        parse_mod_time(mod_time),
        Some(size),
        parse_hash(hash),
    ))
}

/// `hash<TAB>path`, as written by plain checksum tools.
///
/// A `-` hash still yields a record; it carries nothing to compare on and
/// takes the hash capability away from the whole snapshot.
fn parse_hash_only(hash: &str, path: &str) -> Line {
    if path.is_empty() {
        return Line::Malformed;
    }
    Line::Record(FileRecord::new(path, None, None, parse_hash(hash)))
}

pub(crate) fn parse_line(line: &str) -> Line {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line.trim().is_empty() {
        return Line::Blank;
    }
    if line.starts_with('#') {
        return Line::Comment;
    }

    let fields: Vec<&str> = line.splitn(4, '\t').collect();
    match fields.as_slice() {
        [mod_time, size, hash, path] => parse_full(mod_time, size, hash, path),
        [hash, path] => parse_hash_only(hash, path),
        _ => Line::Malformed,
    }
}

/// Turns tab-separated snapshot listings into [`Snapshot`]s.
#[derive(Default)]
pub struct SnapshotReader {
    filter: SkipFilter,
}

impl SnapshotReader {
    pub fn new(filter: SkipFilter) -> Self {
        Self { filter }
    }

    /// Read a snapshot file.
    ///
    /// A path that does not exist is an error. A file that exists but cannot
    /// be opened reads as an empty snapshot, with a warning.
    pub fn open(&self, path: &Path) -> Result<Snapshot, SnapshotError> {
        let label = path.display().to_string();

        if !path.exists() {
            return Err(SnapshotError::NotFound(path.to_path_buf()));
        }

        match File::open(path) {
            Ok(file) => self.read(&label, BufReader::new(file)),
            Err(e) => {
                warn!("[read] cannot open {label}: {e}; treating it as an empty snapshot");
                Ok(Snapshot {
                    label,
                    ..Snapshot::default()
                })
            }
        }
    }

    pub fn read<R: BufRead>(&self, label: &str, mut input: R) -> Result<Snapshot, SnapshotError> {
        let mut snapshot = Snapshot {
            label: label.to_owned(),
            ..Snapshot::default()
        };
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let n = input
                .read_until(b'\n', &mut buf)
                .map_err(|source| SnapshotError::Read {
                    label: label.to_owned(),
                    source,
                })?;
            if n == 0 {
                break;
            }

            snapshot.stats.lines += 1;
            let line = String::from_utf8_lossy(&buf);
            let raw = line.strip_suffix('\n').unwrap_or(&*line);

            match parse_line(raw) {
                Line::Blank => {}
                Line::Comment => snapshot.stats.comments += 1,
                Line::Malformed => {
                    snapshot.stats.malformed += 1;
                    warn!(
                        "[read] skipping malformed line {} in {label}: '{raw}'",
                        snapshot.stats.lines
                    );
                }
                Line::Record(record) if self.filter.is_skipped(&record.path) => {
                    snapshot.stats.skipped += 1;
                    debug!("[read] skipping excluded path {}", record.path);
                }
                Line::Record(record) => {
                    snapshot.capabilities.observe(&record);
                    snapshot.records.push(record);
                }
            }
        }

        debug!(
            "[read] {label}: {} records, capabilities {:?}",
            snapshot.records.len(),
            snapshot.capabilities
        );

        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
