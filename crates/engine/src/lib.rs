mod change;
mod entry;
mod multi_index;
mod pipeline;
mod policy;

pub use change::{Change, ChangeKind, Reconciliation};
pub use entry::{Entry, IdentityKey};
pub use multi_index::MultiIndex;
pub use pipeline::{
    Keyed, Loaded, MetricsTimer, ModificationsMatched, MovesMatched, NoopTimer, Pruned,
    Reconciler, RenamesMatched, Stage, StageMetrics, Timer, reconcile, reconcile_timed,
};
pub use policy::{IdentityPolicy, Notice, Overrides, PolicyError, Resolution, Severity};
