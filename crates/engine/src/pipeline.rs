use std::collections::BTreeMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use log::{debug, warn};
use snapdiff_snapshot::Snapshot;

use crate::{
    Change, ChangeKind, Entry, IdentityKey, IdentityPolicy, Reconciliation,
    change::sort_by_path, multi_index::MultiIndex,
};

/// One side keyed by `(identity, path)`, unique by construction.
type KeyedSide<'a> = BTreeMap<(IdentityKey<'a>, &'a str), Entry<'a>>;

/// Snapshots attached, nothing keyed yet.
pub struct Loaded<'a> {
    left: &'a Snapshot,
    right: &'a Snapshot,
}

/// Identity keys materialized under the final policy.
pub struct Keyed<'a> {
    left: KeyedSide<'a>,
    right: KeyedSide<'a>,
    duplicates: usize,
}

/// Unmatched residue plus everything classified so far.
struct Residual<'a> {
    left: Vec<Entry<'a>>,
    right: Vec<Entry<'a>>,
    report: Reconciliation<'a>,
}

/// Identical `(identity, path)` pairs removed.
pub struct Pruned<'a>(Residual<'a>);

/// Moved files paired off.
pub struct MovesMatched<'a>(Residual<'a>);

/// Renamed files paired off.
pub struct RenamesMatched<'a>(Residual<'a>);

/// Modified files paired off; what remains is deleted or added.
pub struct ModificationsMatched<'a>(Residual<'a>);

/// Stages for which we record timings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Key,
    Prune,
    Moved,
    Renamed,
    Modified,
    Residual,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Key,
        Stage::Prune,
        Stage::Moved,
        Stage::Renamed,
        Stage::Modified,
        Stage::Residual,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stage::Key => "key",
            Stage::Prune => "prune",
            Stage::Moved => "moved",
            Stage::Renamed => "renamed",
            Stage::Modified => "modified",
            Stage::Residual => "residual",
        }
    }
}

/// Timing metrics collected while reconciling.
#[derive(Debug, Clone, Default)]
pub struct StageMetrics {
    pub key_time: Option<Duration>,
    pub prune_time: Option<Duration>,
    pub moved_time: Option<Duration>,
    pub renamed_time: Option<Duration>,
    pub modified_time: Option<Duration>,
    pub residual_time: Option<Duration>,
}

impl StageMetrics {
    pub fn get(&self, stage: Stage) -> Option<Duration> {
        match stage {
            Stage::Key => self.key_time,
            Stage::Prune => self.prune_time,
            Stage::Moved => self.moved_time,
            Stage::Renamed => self.renamed_time,
            Stage::Modified => self.modified_time,
            Stage::Residual => self.residual_time,
        }
    }

    /// Total time across all measured stages.
    pub fn total(&self) -> Duration {
        Stage::ALL
            .into_iter()
            .filter_map(|stage| self.get(stage))
            .sum()
    }
}

/// Strategy trait for timing behavior.
pub trait Timer {
    /// Run `f`, optionally measuring and recording the duration for `stage`.
    fn measure<F, R>(&mut self, stage: Stage, f: F) -> R
    where
        F: FnOnce() -> R;

    /// Return metrics if timing is enabled.
    fn metrics(&self) -> Option<&StageMetrics> {
        None
    }
}

/// Timer implementation that does nothing
#[derive(Debug, Default)]
pub struct NoopTimer;

impl Timer for NoopTimer {
    #[inline]
    fn measure<F, R>(&mut self, _stage: Stage, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        f()
    }
}

/// Timer implementation that collects [`StageMetrics`].
#[derive(Debug, Default)]
pub struct MetricsTimer {
    metrics: StageMetrics,
}

impl Timer for MetricsTimer {
    fn measure<F, R>(&mut self, stage: Stage, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = Some(start.elapsed());

        match stage {
            Stage::Key => self.metrics.key_time = elapsed,
            Stage::Prune => self.metrics.prune_time = elapsed,
            Stage::Moved => self.metrics.moved_time = elapsed,
            Stage::Renamed => self.metrics.renamed_time = elapsed,
            Stage::Modified => self.metrics.modified_time = elapsed,
            Stage::Residual => self.metrics.residual_time = elapsed,
        }

        result
    }

    fn metrics(&self) -> Option<&StageMetrics> {
        Some(&self.metrics)
    }
}

/// Staged reconciliation of two snapshots.
///
/// The typestate `S` fixes the stage order at compile time: every stage
/// consumes the residue of the one before it, so a record paired at one
/// stage can never be seen by a later one. Timing is controlled by the
/// `Timer` strategy `T`:
///
/// - `T = NoopTimer`    => untimed
/// - `T = MetricsTimer` => per-stage durations
pub struct Reconciler<S, T: Timer = NoopTimer> {
    policy: IdentityPolicy,
    state: S,
    timer: T,
}

impl<'a> Reconciler<Loaded<'a>, NoopTimer> {
    /// `left` is the older snapshot, `right` the newer one.
    pub fn new(policy: IdentityPolicy, left: &'a Snapshot, right: &'a Snapshot) -> Self {
        Self {
            policy,
            state: Loaded { left, right },
            timer: NoopTimer,
        }
    }
}

impl<'a> Reconciler<Loaded<'a>, MetricsTimer> {
    pub fn new_timed(policy: IdentityPolicy, left: &'a Snapshot, right: &'a Snapshot) -> Self {
        Self {
            policy,
            state: Loaded { left, right },
            timer: MetricsTimer::default(),
        }
    }
}

impl<S, T: Timer> Reconciler<S, T> {
    /// Access timing metrics, if enabled.
    pub fn metrics(&self) -> Option<&StageMetrics> {
        self.timer.metrics()
    }
}

fn key_side<'a>(policy: &IdentityPolicy, snapshot: &'a Snapshot) -> (KeyedSide<'a>, usize) {
    let mut side = KeyedSide::new();
    let mut duplicates = 0;

    for record in &snapshot.records {
        let entry = policy.entry(record);
        if let Some(previous) = side.insert((entry.identity, entry.path()), entry) {
            duplicates += 1;
            warn!(
                "[key] {} appears twice with the same identity in {}; keeping the later entry",
                previous.path(),
                snapshot.label
            );
        }
    }

    (side, duplicates)
}

/// Pair off residual entries whose `key` is equal.
///
/// Right entries are visited in residual order; each takes the earliest
/// unmatched left entry with the same key. Unpaired entries on both sides
/// stay in residual order for the next stage.
fn match_stage<'a, K, F>(residual: &mut Residual<'a>, kind: ChangeKind, key: F)
where
    K: Eq + Hash,
    F: Fn(&Entry<'a>) -> K,
{
    let left = std::mem::take(&mut residual.left);
    let right = std::mem::take(&mut residual.right);

    let mut index = MultiIndex::with_capacity(left.len());
    for (pos, entry) in left.iter().enumerate() {
        index.insert(key(entry), pos);
    }

    let mut taken = vec![false; left.len()];
    let mut matched = Vec::new();

    for entry in right {
        match index.take(&key(&entry)) {
            Some(pos) => {
                taken[pos] = true;
                matched.push(Change::pair(kind, left[pos], entry));
            }
            None => residual.right.push(entry),
        }
    }

    residual.left = left
        .into_iter()
        .zip(taken)
        .filter_map(|(entry, taken)| (!taken).then_some(entry))
        .collect();

    sort_by_path(&mut matched);
    debug!(
        "[{}] {} pairs; {} left ({} keys) / {} right remaining",
        kind.label(),
        matched.len(),
        residual.left.len(),
        index.key_count(),
        residual.right.len()
    );
    *residual.report.changes_mut(kind) = matched;
}

impl<'a, T: Timer> Reconciler<Loaded<'a>, T> {
    /// Materialize identity keys; duplicates within one side keep the later record.
    pub fn key(self) -> Reconciler<Keyed<'a>, T> {
        let Reconciler {
            policy,
            state: Loaded { left, right },
            mut timer,
        } = self;

        let keyed = timer.measure(Stage::Key, || {
            let (left, dup_left) = key_side(&policy, left);
            let (right, dup_right) = key_side(&policy, right);
            Keyed {
                left,
                right,
                duplicates: dup_left + dup_right,
            }
        });

        Reconciler {
            policy,
            state: keyed,
            timer,
        }
    }
}

impl<'a, T: Timer> Reconciler<Keyed<'a>, T> {
    /// Drop entries present with the same identity at the same path on both sides.
    pub fn prune_unchanged(self) -> Reconciler<Pruned<'a>, T> {
        let Reconciler {
            policy,
            state:
                Keyed {
                    mut left,
                    right,
                    duplicates,
                },
            mut timer,
        } = self;

        let residual = timer.measure(Stage::Prune, || {
            let mut report = Reconciliation {
                duplicates,
                ..Reconciliation::default()
            };
            let mut right_residual = Vec::new();

            for (key, entry) in right {
                if left.remove(&key).is_some() {
                    report.unchanged += 1;
                } else {
                    right_residual.push(entry);
                }
            }

            debug!(
                "[prune] {} unchanged; {} left / {} right remaining",
                report.unchanged,
                left.len(),
                right_residual.len()
            );

            Residual {
                left: left.into_values().collect(),
                right: right_residual,
                report,
            }
        });

        Reconciler {
            policy,
            state: Pruned(residual),
            timer,
        }
    }
}

impl<'a, T: Timer> Reconciler<Pruned<'a>, T> {
    /// Same identity, file name and time: the file changed directory.
    pub fn match_moved(self) -> Reconciler<MovesMatched<'a>, T> {
        let Reconciler {
            policy,
            state: Pruned(mut residual),
            mut timer,
        } = self;

        timer.measure(Stage::Moved, || {
            match_stage(&mut residual, ChangeKind::Moved, |e: &Entry<'a>| {
                (e.identity, e.name(), e.match_time)
            })
        });

        Reconciler {
            policy,
            state: MovesMatched(residual),
            timer,
        }
    }
}

impl<'a, T: Timer> Reconciler<MovesMatched<'a>, T> {
    /// Same identity and time under another name.
    pub fn match_renamed(self) -> Reconciler<RenamesMatched<'a>, T> {
        let Reconciler {
            policy,
            state: MovesMatched(mut residual),
            mut timer,
        } = self;

        timer.measure(Stage::Renamed, || {
            match_stage(&mut residual, ChangeKind::Renamed, |e: &Entry<'a>| {
                (e.identity, e.match_time)
            })
        });

        Reconciler {
            policy,
            state: RenamesMatched(residual),
            timer,
        }
    }
}

impl<'a, T: Timer> Reconciler<RenamesMatched<'a>, T> {
    /// Same path, different content.
    pub fn match_modified(self) -> Reconciler<ModificationsMatched<'a>, T> {
        let Reconciler {
            policy,
            state: RenamesMatched(mut residual),
            mut timer,
        } = self;

        timer.measure(Stage::Modified, || {
            match_stage(&mut residual, ChangeKind::Modified, |e: &Entry<'a>| {
                e.path()
            })
        });

        Reconciler {
            policy,
            state: ModificationsMatched(residual),
            timer,
        }
    }
}

impl<'a, T: Timer> Reconciler<ModificationsMatched<'a>, T> {
    /// Whatever is still unpaired was deleted (left) or added (right).
    pub fn finish(self) -> (Reconciliation<'a>, T) {
        let Reconciler {
            state:
                ModificationsMatched(Residual {
                    left,
                    right,
                    mut report,
                }),
            mut timer,
            ..
        } = self;

        timer.measure(Stage::Residual, || {
            report.deleted = left.into_iter().map(Change::deleted).collect();
            report.added = right.into_iter().map(Change::added).collect();
            sort_by_path(&mut report.deleted);
            sort_by_path(&mut report.added);
        });

        (report, timer)
    }
}

/// Run every stage in order.
pub fn reconcile<'a>(
    policy: IdentityPolicy,
    left: &'a Snapshot,
    right: &'a Snapshot,
) -> Reconciliation<'a> {
    let (report, _) = Reconciler::new(policy, left, right)
        .key()
        .prune_unchanged()
        .match_moved()
        .match_renamed()
        .match_modified()
        .finish();
    report
}

/// Run every stage in order, recording how long each one took.
pub fn reconcile_timed<'a>(
    policy: IdentityPolicy,
    left: &'a Snapshot,
    right: &'a Snapshot,
) -> (Reconciliation<'a>, StageMetrics) {
    let (report, timer) = Reconciler::new_timed(policy, left, right)
        .key()
        .prune_unchanged()
        .match_moved()
        .match_renamed()
        .match_modified()
        .finish();
    (report, timer.metrics)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
