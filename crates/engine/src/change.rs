use crate::Entry;

/// Change categories, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Same identity and file name, different directory.
    Moved,
    /// Same identity, different file name.
    Renamed,
    /// Same path, different identity.
    Modified,
    Deleted,
    Added,
}

impl ChangeKind {
    pub const ALL: [ChangeKind; 5] = [
        ChangeKind::Moved,
        ChangeKind::Renamed,
        ChangeKind::Modified,
        ChangeKind::Deleted,
        ChangeKind::Added,
    ];

    /// Single character line prefix.
    pub fn tag(self) -> char {
        match self {
            ChangeKind::Moved => '=',
            ChangeKind::Renamed => '>',
            ChangeKind::Modified => '*',
            ChangeKind::Deleted => '-',
            ChangeKind::Added => '+',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChangeKind::Moved => "moved",
            ChangeKind::Renamed => "renamed",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Added => "added",
        }
    }
}

/// One classified difference. `left` is the record in the older snapshot,
/// `right` its counterpart in the newer one.
#[derive(Debug, Clone, Copy)]
pub struct Change<'a> {
    pub kind: ChangeKind,
    pub left: Option<Entry<'a>>,
    pub right: Option<Entry<'a>>,
}

impl<'a> Change<'a> {
    pub fn pair(kind: ChangeKind, left: Entry<'a>, right: Entry<'a>) -> Self {
        Self {
            kind,
            left: Some(left),
            right: Some(right),
        }
    }

    pub fn deleted(left: Entry<'a>) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            left: Some(left),
            right: None,
        }
    }

    pub fn added(right: Entry<'a>) -> Self {
        Self {
            kind: ChangeKind::Added,
            left: None,
            right: Some(right),
        }
    }

    pub fn left_path(&self) -> Option<&'a str> {
        self.left.map(|e| e.path())
    }

    pub fn right_path(&self) -> Option<&'a str> {
        self.right.map(|e| e.path())
    }

    fn sort_key(&self) -> (Option<&'a str>, Option<&'a str>) {
        (self.left_path(), self.right_path())
    }
}

pub(crate) fn sort_by_path(changes: &mut [Change<'_>]) {
    changes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Outcome of a run: every record of both snapshots lands in exactly one
/// place, either `unchanged` or one of the change lists.
#[derive(Debug, Default)]
pub struct Reconciliation<'a> {
    pub unchanged: usize,
    /// Records dropped because their identity and path were already present.
    pub duplicates: usize,
    pub moved: Vec<Change<'a>>,
    pub renamed: Vec<Change<'a>>,
    pub modified: Vec<Change<'a>>,
    pub deleted: Vec<Change<'a>>,
    pub added: Vec<Change<'a>>,
}

impl<'a> Reconciliation<'a> {
    pub fn changes(&self, kind: ChangeKind) -> &[Change<'a>] {
        match kind {
            ChangeKind::Moved => &self.moved,
            ChangeKind::Renamed => &self.renamed,
            ChangeKind::Modified => &self.modified,
            ChangeKind::Deleted => &self.deleted,
            ChangeKind::Added => &self.added,
        }
    }

    pub(crate) fn changes_mut(&mut self, kind: ChangeKind) -> &mut Vec<Change<'a>> {
        match kind {
            ChangeKind::Moved => &mut self.moved,
            ChangeKind::Renamed => &mut self.renamed,
            ChangeKind::Modified => &mut self.modified,
            ChangeKind::Deleted => &mut self.deleted,
            ChangeKind::Added => &mut self.added,
        }
    }

    /// Sections in report order, empty ones included.
    pub fn sections(&self) -> impl Iterator<Item = (ChangeKind, &[Change<'a>])> {
        ChangeKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.changes(kind)))
    }

    pub fn total_changes(&self) -> usize {
        self.sections().map(|(_, changes)| changes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }
}
