use super::*;
use crate::Overrides;
use snapdiff_snapshot::SnapshotReader;
use std::collections::HashSet;

const T1: &str = "20240301_101500";
const T2: &str = "20240302_080000";

fn snapshot(label: &str, lines: &[String]) -> Snapshot {
    let mut text = lines.join("\n");
    text.push('\n');
    SnapshotReader::default()
        .read(label, text.as_bytes())
        .expect("read snapshot")
}

fn line(mod_time: &str, size: u64, hash: &str, path: &str) -> String {
    format!("{mod_time}\t{size}\t{hash}\t{path}")
}

fn policy_for(left: &Snapshot, right: &Snapshot, overrides: Overrides) -> IdentityPolicy {
    IdentityPolicy::resolve(left.capabilities, right.capabilities, overrides)
        .expect("compatible inputs")
        .policy
}

fn run<'a>(left: &'a Snapshot, right: &'a Snapshot) -> Reconciliation<'a> {
    reconcile(policy_for(left, right, Overrides::default()), left, right)
}

fn paths<'a>(changes: &[Change<'a>]) -> Vec<(Option<&'a str>, Option<&'a str>)> {
    changes
        .iter()
        .map(|c| (c.left_path(), c.right_path()))
        .collect()
}

/// Every record is accounted for exactly once on its side.
fn assert_partition(report: &Reconciliation<'_>, left: &Snapshot, right: &Snapshot) {
    let mut left_seen = HashSet::new();
    let mut right_seen = HashSet::new();

    for (kind, changes) in report.sections() {
        for change in changes {
            assert_eq!(change.kind, kind);
            if let Some(p) = change.left_path() {
                assert!(left_seen.insert(p), "{p} classified twice on the left");
            }
            if let Some(p) = change.right_path() {
                assert!(right_seen.insert(p), "{p} classified twice on the right");
            }
        }
    }

    assert_eq!(report.unchanged + left_seen.len(), left.len());
    assert_eq!(report.unchanged + right_seen.len(), right.len());
}

#[test]
fn same_name_in_other_directory_is_moved() {
    let a = snapshot("a", &[line(T1, 100, "h1", "/a/x.txt")]);
    let b = snapshot("b", &[line(T1, 100, "h1", "/b/x.txt")]);

    let report = run(&a, &b);
    assert_eq!(paths(&report.moved), vec![(Some("/a/x.txt"), Some("/b/x.txt"))]);
    assert_eq!(report.total_changes(), 1);
    assert_partition(&report, &a, &b);
}

#[test]
fn other_name_with_same_identity_and_time_is_renamed() {
    let a = snapshot("a", &[line(T1, 100, "h1", "/a/x.txt")]);
    let b = snapshot("b", &[line(T1, 100, "h1", "/c/y.txt")]);

    let report = run(&a, &b);
    assert_eq!(
        paths(&report.renamed),
        vec![(Some("/a/x.txt"), Some("/c/y.txt"))]
    );
    assert_eq!(report.total_changes(), 1);
}

#[test]
fn other_name_and_other_time_is_delete_plus_add() {
    let a = snapshot("a", &[line(T1, 100, "h1", "/a/x.txt")]);
    let b = snapshot("b", &[line(T2, 100, "h1", "/a/y.txt")]);

    let report = run(&a, &b);
    assert!(report.renamed.is_empty());
    assert_eq!(paths(&report.deleted), vec![(Some("/a/x.txt"), None)]);
    assert_eq!(paths(&report.added), vec![(None, Some("/a/y.txt"))]);
}

#[test]
fn same_path_with_new_content_is_modified() {
    let a = snapshot("a", &[line(T1, 100, "h1", "/a/x.txt")]);
    let b = snapshot("b", &[line(T2, 120, "h2", "/a/x.txt")]);

    let report = run(&a, &b);
    assert_eq!(report.modified.len(), 1);
    let change = report.modified[0];
    assert_eq!(change.left.map(|e| e.hash()), Some(Some("h1")));
    assert_eq!(change.right.map(|e| e.size()), Some(Some(120)));
    assert_eq!(report.total_changes(), 1);
}

#[test]
fn empty_counterpart_yields_deleted_or_added() {
    let a = snapshot("a", &[line(T1, 100, "h1", "/a/x.txt")]);
    let empty = snapshot("empty", &[]);

    let forward = run(&a, &empty);
    assert_eq!(paths(&forward.deleted), vec![(Some("/a/x.txt"), None)]);
    assert_eq!(forward.total_changes(), 1);

    let backward = run(&empty, &a);
    assert_eq!(paths(&backward.added), vec![(None, Some("/a/x.txt"))]);
    assert_eq!(backward.total_changes(), 1);
}

#[test]
fn unchanged_records_never_appear_in_changes() {
    let a = snapshot(
        "a",
        &[
            line(T1, 1, "h1", "/keep/one"),
            line(T1, 2, "h2", "/keep/two"),
            line(T1, 3, "h3", "/gone"),
        ],
    );
    // A touched mod time with the same hash at the same path is unchanged.
    let b = snapshot(
        "b",
        &[
            line(T2, 1, "h1", "/keep/one"),
            line(T1, 2, "h2", "/keep/two"),
            line(T1, 4, "h4", "/new"),
        ],
    );

    let report = run(&a, &b);
    assert_eq!(report.unchanged, 2);
    for (_, changes) in report.sections() {
        for change in changes {
            assert_ne!(change.left_path(), Some("/keep/one"));
            assert_ne!(change.left_path(), Some("/keep/two"));
        }
    }
    assert_partition(&report, &a, &b);
}

#[test]
fn mixed_changes_partition_both_snapshots() {
    let a = snapshot(
        "a",
        &[
            line(T1, 10, "h1", "/same.txt"),
            line(T1, 20, "h2", "/old/moved.txt"),
            line(T1, 30, "h3", "/old/before.txt"),
            line(T1, 40, "h4", "/edit.txt"),
            line(T1, 50, "h5", "/gone.txt"),
        ],
    );
    let b = snapshot(
        "b",
        &[
            line(T1, 10, "h1", "/same.txt"),
            line(T1, 20, "h2", "/new/moved.txt"),
            line(T1, 30, "h3", "/new/after.txt"),
            line(T2, 41, "h6", "/edit.txt"),
            line(T2, 60, "h7", "/fresh.txt"),
        ],
    );

    let report = run(&a, &b);
    assert_eq!(report.unchanged, 1);
    assert_eq!(
        paths(&report.moved),
        vec![(Some("/old/moved.txt"), Some("/new/moved.txt"))]
    );
    assert_eq!(
        paths(&report.renamed),
        vec![(Some("/old/before.txt"), Some("/new/after.txt"))]
    );
    assert_eq!(paths(&report.modified), vec![(Some("/edit.txt"), Some("/edit.txt"))]);
    assert_eq!(paths(&report.deleted), vec![(Some("/gone.txt"), None)]);
    assert_eq!(paths(&report.added), vec![(None, Some("/fresh.txt"))]);
    assert_partition(&report, &a, &b);
}

#[test]
fn swapping_inputs_mirrors_the_classification() {
    let a = snapshot(
        "a",
        &[
            line(T1, 20, "h2", "/old/moved.txt"),
            line(T1, 30, "h3", "/old/before.txt"),
            line(T1, 40, "h4", "/edit.txt"),
            line(T1, 50, "h5", "/gone.txt"),
        ],
    );
    let b = snapshot(
        "b",
        &[
            line(T1, 20, "h2", "/new/moved.txt"),
            line(T1, 30, "h3", "/new/after.txt"),
            line(T2, 41, "h6", "/edit.txt"),
            line(T2, 60, "h7", "/fresh.txt"),
        ],
    );

    let forward = run(&a, &b);
    let backward = run(&b, &a);

    let flip = |changes: &[Change<'_>]| {
        let mut flipped: Vec<_> = changes
            .iter()
            .map(|c| (c.right_path().map(str::to_owned), c.left_path().map(str::to_owned)))
            .collect();
        flipped.sort();
        flipped
    };
    let owned = |changes: &[Change<'_>]| {
        let mut v: Vec<_> = changes
            .iter()
            .map(|c| (c.left_path().map(str::to_owned), c.right_path().map(str::to_owned)))
            .collect();
        v.sort();
        v
    };

    assert_eq!(owned(&backward.moved), flip(&forward.moved));
    assert_eq!(owned(&backward.renamed), flip(&forward.renamed));
    assert_eq!(owned(&backward.modified), flip(&forward.modified));
    assert_eq!(owned(&backward.added), flip(&forward.deleted));
    assert_eq!(owned(&backward.deleted), flip(&forward.added));
}

#[test]
fn missing_hash_degrades_to_size_and_time() {
    let a = snapshot(
        "a",
        &[line(T1, 100, "h1", "/a/x.txt"), line(T1, 5, "-", "/a/y.txt")],
    );
    let b = snapshot(
        "b",
        &[line(T1, 100, "zz", "/a/x.txt"), line(T1, 5, "h9", "/b/y.txt")],
    );

    let policy = policy_for(&a, &b, Overrides::default());
    assert!(!policy.use_hash);
    assert!(policy.use_mod_time);

    // Hashes differ for /a/x.txt but are no longer consulted.
    let report = reconcile(policy, &a, &b);
    assert_eq!(report.unchanged, 1);
    assert_eq!(paths(&report.moved), vec![(Some("/a/y.txt"), Some("/b/y.txt"))]);
    assert_partition(&report, &a, &b);
}

#[test]
fn subsecond_differences_depend_on_precision() {
    let a = snapshot("a", &[line("20240301_101500.100000000", 100, "-", "/a/x.txt")]);
    let b = snapshot("b", &[line("20240301_101500.900000000", 100, "-", "/a/x.txt")]);

    let coarse = run(&a, &b);
    assert_eq!(coarse.unchanged, 1);
    assert!(coarse.is_empty());

    let nano = Overrides {
        nanosecond: true,
        ..Overrides::default()
    };
    let policy = policy_for(&a, &b, nano);
    assert!(policy.use_nanosecond);
    let fine = reconcile(policy, &a, &b);
    assert_eq!(paths(&fine.modified), vec![(Some("/a/x.txt"), Some("/a/x.txt"))]);
    assert_eq!(
        fine.modified[0].left.and_then(|e| e.mod_time),
        Some("20240301_101500.100000000")
    );
}

#[test]
fn hash_only_snapshots_match_without_times() {
    let a = snapshot("a", &["h1\t/a/x.txt".to_string(), "h2\t/a/old.txt".to_string()]);
    let b = snapshot("b", &["h1\t/b/x.txt".to_string(), "h2\t/a/new.txt".to_string()]);

    let policy = policy_for(&a, &b, Overrides::default());
    assert!(!policy.use_mod_time);

    let report = reconcile(policy, &a, &b);
    assert_eq!(paths(&report.moved), vec![(Some("/a/x.txt"), Some("/b/x.txt"))]);
    assert_eq!(
        paths(&report.renamed),
        vec![(Some("/a/old.txt"), Some("/a/new.txt"))]
    );
}

#[test]
fn duplicate_identity_and_path_keeps_later_record() {
    let a = snapshot(
        "a",
        &[line(T1, 100, "h1", "/a/x.txt"), line(T2, 100, "h1", "/a/x.txt")],
    );
    let b = snapshot("b", &[]);

    let report = run(&a, &b);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.deleted.len(), 1);
    assert_eq!(report.deleted[0].left.and_then(|e| e.mod_time), Some(T2));
}

#[test]
fn indistinguishable_copies_pair_off_one_to_one() {
    // Three identical empty files become two in new directories.
    let a = snapshot(
        "a",
        &[
            line(T1, 0, "e0", "/p/empty"),
            line(T1, 0, "e0", "/q/empty"),
            line(T1, 0, "e0", "/r/empty"),
        ],
    );
    let b = snapshot(
        "b",
        &[line(T1, 0, "e0", "/s/empty"), line(T1, 0, "e0", "/t/empty")],
    );

    let report = run(&a, &b);
    assert_eq!(
        paths(&report.moved),
        vec![
            (Some("/p/empty"), Some("/s/empty")),
            (Some("/q/empty"), Some("/t/empty")),
        ]
    );
    assert_eq!(paths(&report.deleted), vec![(Some("/r/empty"), None)]);
    assert_partition(&report, &a, &b);
}

#[test]
fn outputs_are_sorted_by_path() {
    let a = snapshot(
        "a",
        &[line(T1, 1, "h1", "/z"), line(T1, 2, "h2", "/m"), line(T1, 3, "h3", "/a")],
    );
    let b = snapshot("b", &[]);

    let report = run(&a, &b);
    assert_eq!(
        paths(&report.deleted),
        vec![(Some("/a"), None), (Some("/m"), None), (Some("/z"), None)]
    );
}

#[test]
fn timed_run_records_every_stage() {
    let a = snapshot("a", &[line(T1, 100, "h1", "/a/x.txt")]);
    let b = snapshot("b", &[line(T1, 100, "h1", "/b/x.txt")]);

    let (report, metrics) = reconcile_timed(policy_for(&a, &b, Overrides::default()), &a, &b);
    assert_eq!(report.moved.len(), 1);
    for stage in Stage::ALL {
        assert!(metrics.get(stage).is_some(), "{} not timed", stage.label());
    }
    assert!(metrics.total() >= metrics.get(Stage::Moved).unwrap_or_default());
}

#[test]
fn untimed_reconciler_has_no_metrics() {
    let a = snapshot("a", &[]);
    let b = snapshot("b", &[]);
    let policy = policy_for(&a, &b, Overrides::default());

    let keyed = Reconciler::new(policy, &a, &b).key();
    assert!(keyed.metrics().is_none());

    let (report, _) = keyed
        .prune_unchanged()
        .match_moved()
        .match_renamed()
        .match_modified()
        .finish();
    assert!(report.is_empty());
    assert_eq!(report.unchanged, 0);
}
