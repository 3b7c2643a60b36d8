use std::fmt;

use snapdiff_snapshot::{Capabilities, FileRecord, Precision};

use crate::{Entry, IdentityKey};

/// Explicit user requests that narrow what the data would allow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub ignore_mod_time: bool,
    pub ignore_hash: bool,
    /// Keep sub-second digits when comparing modification times.
    pub nanosecond: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error(
        "input files not compatible for comparison (missing modification dates and/or hashes)"
    )]
    IncompatibleInputs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Part of the report itself.
    Comment,
    Info,
    Warning,
}

/// Something worth telling the user about how the policy was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    IgnoringModTimes,
    IgnoringHashes,
    ModTimesAlreadyMissing,
    HashesAlreadyMissing,
    NanosecondsUnavailable,
    SubsecondsDiscarded,
}

impl Notice {
    pub fn severity(self) -> Severity {
        match self {
            Notice::IgnoringModTimes | Notice::IgnoringHashes => Severity::Comment,
            Notice::SubsecondsDiscarded => Severity::Info,
            Notice::ModTimesAlreadyMissing
            | Notice::HashesAlreadyMissing
            | Notice::NanosecondsUnavailable => Severity::Warning,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Notice::IgnoringModTimes => "Ignoring file modification dates (using hashes instead)",
            Notice::IgnoringHashes => {
                "Ignoring hashes (using file modification dates and file size instead)"
            }
            Notice::ModTimesAlreadyMissing => {
                "Can't ignore file modification dates because these aren't available for all entries in the first place"
            }
            Notice::HashesAlreadyMissing => {
                "Can't ignore hashes because these aren't available for all entries in the first place"
            }
            Notice::NanosecondsUnavailable => {
                "Can't use nanosecond modification dates because this precision isn't available for all entries in the input files"
            }
            Notice::SubsecondsDiscarded => {
                "Reducing modification date precision to 1 second for increased compatibility of timestamps"
            }
        };
        f.write_str(msg)
    }
}

/// Run-wide choice of which fields identify a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityPolicy {
    pub use_mod_time: bool,
    pub use_hash: bool,
    pub use_nanosecond: bool,
}

/// A resolved policy plus what the user should be told about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub policy: IdentityPolicy,
    pub notices: Vec<Notice>,
}

impl IdentityPolicy {
    /// Decide the policy from both snapshots' final capabilities.
    ///
    /// Must only be called once both snapshots are fully read: a single
    /// record late in either file can still take a capability away.
    pub fn resolve(
        left: Capabilities,
        right: Capabilities,
        overrides: Overrides,
    ) -> Result<Resolution, PolicyError> {
        let available = left & right;
        let mut notices = Vec::new();

        let mut use_mod_time = available.has_all_mod_times();
        if overrides.ignore_mod_time {
            if use_mod_time {
                notices.push(Notice::IgnoringModTimes);
                use_mod_time = false;
            } else {
                notices.push(Notice::ModTimesAlreadyMissing);
            }
        }

        let mut use_hash = available.has_all_hashes();
        if overrides.ignore_hash {
            if use_hash {
                notices.push(Notice::IgnoringHashes);
                use_hash = false;
            } else {
                notices.push(Notice::HashesAlreadyMissing);
            }
        }

        if !use_mod_time && !use_hash {
            return Err(PolicyError::IncompatibleInputs);
        }

        let nanos_available = available.has_nanoseconds_everywhere();
        let use_nanosecond = overrides.nanosecond && nanos_available;
        if overrides.nanosecond && !nanos_available {
            notices.push(Notice::NanosecondsUnavailable);
        }
        // Several copy and sharing paths silently zero the fraction, which
        // would otherwise show up as spurious modifications.
        if !overrides.nanosecond && nanos_available && use_mod_time {
            notices.push(Notice::SubsecondsDiscarded);
        }

        Ok(Resolution {
            policy: IdentityPolicy {
                use_mod_time,
                use_hash,
                use_nanosecond,
            },
            notices,
        })
    }

    #[inline]
    pub fn precision(&self) -> Precision {
        if self.use_nanosecond {
            Precision::Nanosecond
        } else {
            Precision::Second
        }
    }

    pub fn identity_of<'a>(&self, record: &'a FileRecord) -> IdentityKey<'a> {
        if self.use_hash {
            IdentityKey::Hash(record.hash.as_deref().unwrap_or_default())
        } else {
            IdentityKey::SizeTime {
                size: record.size.unwrap_or_default(),
                mod_time: record.mod_time_at(self.precision()).unwrap_or_default(),
            }
        }
    }

    /// Materialize the comparison fields of `record` under this policy.
    pub fn entry<'a>(&self, record: &'a FileRecord) -> Entry<'a> {
        let mod_time = record.mod_time_at(self.precision());
        Entry {
            record,
            identity: self.identity_of(record),
            mod_time,
            match_time: mod_time.filter(|_| self.use_mod_time),
        }
    }

    /// Human summary of what identifies a file in this run.
    pub fn describe(&self) -> [String; 2] {
        let fields = if self.use_mod_time {
            format!(
                "Using file modification dates and {}",
                if self.use_hash { "hashes" } else { "file size" }
            )
        } else {
            "Using hashes only, ignoring file modification dates and file size".to_owned()
        };
        let precision = format!(
            "Using {} precision file modification dates",
            if self.use_nanosecond {
                "nanosecond"
            } else {
                "1-second"
            }
        );
        [fields, precision]
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
