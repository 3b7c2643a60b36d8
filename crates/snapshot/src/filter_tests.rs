use super::*;
use snapdiff_runtime::DEFAULT_SKIP_PATTERNS;

#[test]
fn default_filter_skips_nothing() {
    let filter = SkipFilter::default();
    assert!(filter.is_empty());
    assert!(!filter.is_skipped(".DS_Store"));
    assert!(!filter.is_skipped("a/._x"));
}

#[test]
fn sidecar_patterns_match_at_any_depth() {
    let filter = SkipFilter::new(DEFAULT_SKIP_PATTERNS).expect("build filter");

    let cases = [
        (".DS_Store", true),
        ("photos/.DS_Store", true),
        ("/Volumes/usb/.DS_Store", true),
        ("photos/._IMG_0001.JPG", true),
        ("._IMG_0001.JPG", true),
        ("photos/IMG_0001.JPG", false),
        ("photos/_IMG.JPG", false),
        ("notes/DS_Store.txt", false),
    ];

    for (path, expected) in cases {
        assert_eq!(filter.is_skipped(path), expected, "path {path:?}");
    }
}

#[test]
fn user_patterns_extend_defaults() {
    let patterns = DEFAULT_SKIP_PATTERNS
        .iter()
        .copied()
        .chain(["*.tmp", "cache/"]);
    let filter = SkipFilter::new(patterns).expect("build filter");

    assert!(filter.is_skipped("build/output.tmp"));
    assert!(filter.is_skipped(".DS_Store"));
    assert!(!filter.is_skipped("build/output.txt"));
}
