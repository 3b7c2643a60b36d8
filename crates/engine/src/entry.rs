use snapdiff_snapshot::FileRecord;

/// What decides whether two records hold the same content.
///
/// Ordering is derived so that keyed collections sort by identity first and
/// then, when paired with a path, by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IdentityKey<'a> {
    Hash(&'a str),
    SizeTime { size: u64, mod_time: &'a str },
}

/// A record with its comparison fields materialized for one run.
///
/// Entries borrow from the snapshot; the record itself is never touched.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub record: &'a FileRecord,
    pub identity: IdentityKey<'a>,
    /// Modification time cut to the run's precision, used for display.
    pub mod_time: Option<&'a str>,
    /// Modification time as a match component; `None` when times are ignored.
    pub match_time: Option<&'a str>,
}

impl<'a> Entry<'a> {
    #[inline]
    pub fn path(&self) -> &'a str {
        &self.record.path
    }

    #[inline]
    pub fn name(&self) -> &'a str {
        self.record.name()
    }

    #[inline]
    pub fn size(&self) -> Option<u64> {
        self.record.size
    }

    #[inline]
    pub fn hash(&self) -> Option<&'a str> {
        self.record.hash.as_deref()
    }
}
