/// Width of a second-precision timestamp, `YYYYMMDD_HHMMSS`.
pub const SECOND_PRECISION_WIDTH: usize = 15;
/// Width of a nanosecond-precision timestamp, `YYYYMMDD_HHMMSS.123456789`.
pub const NANOSECOND_PRECISION_WIDTH: usize = 25;
/// Hash column value written by producers that did not hash the file.
pub const HASH_PLACEHOLDER: &str = "-";

/// One line of a snapshot. Records are never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Full path as written by the producer, `/`-separated.
    pub path: String,
    /// Zero-padded modification time; lexicographic order is chronological.
    pub mod_time: Option<String>,
    /// File size in bytes
    pub size: Option<u64>,
    /// Content digest
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Second,
    Nanosecond,
}

impl Precision {
    #[inline]
    pub fn width(self) -> usize {
        match self {
            Precision::Second => SECOND_PRECISION_WIDTH,
            Precision::Nanosecond => NANOSECOND_PRECISION_WIDTH,
        }
    }
}

/// Cut a timestamp down to at most `width` bytes, backing off to a char
/// boundary. Shorter input is returned as is.
#[inline]
pub fn truncate_timestamp(ts: &str, width: usize) -> &str {
    let mut end = width.min(ts.len());
    while !ts.is_char_boundary(end) {
        end -= 1;
    }
    &ts[..end]
}

impl FileRecord {
    /// Record with modification time, size and (optionally) hash.
    pub fn new(
        path: impl Into<String>,
        mod_time: Option<String>,
        size: Option<u64>,
        hash: Option<String>,
    ) -> Self {
        Self {
            path: path.into(),
            mod_time,
            size,
            hash,
        }
    }

    /// Final path component, extension included.
    #[inline]
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Modification time truncated to `precision`.
    #[inline]
    pub fn mod_time_at(&self, precision: Precision) -> Option<&str> {
        self.mod_time
            .as_deref()
            .map(|ts| truncate_timestamp(ts, precision.width()))
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
