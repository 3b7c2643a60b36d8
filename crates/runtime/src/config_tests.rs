use super::*;
use serial_test::serial;
use tempfile::tempdir;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().expect("create temp dir");
    let settings = Settings::load_from(&dir.path().join("absent.json")).expect("load");
    assert_eq!(settings, Settings::default());
    assert!(settings.default_excludes);
    assert_eq!(settings.format, ReportFormat::Narrative);
}

#[test]
fn partial_file_keeps_remaining_defaults() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "format": "table", "excludes": ["*.tmp"] }"#).expect("write");

    let settings = Settings::load_from(&path).expect("load");
    assert_eq!(settings.format, ReportFormat::Table);
    assert_eq!(settings.excludes, vec!["*.tmp".to_string()]);
    assert!(!settings.nanosecond);
    assert!(settings.default_excludes);
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("config.json");

    let cases = [
        "{ not json",
        r#"{ "format": "yaml" }"#,
        r#"{ "colour": true }"#,
    ];

    for raw in cases {
        fs::write(&path, raw).expect("write");
        let err = Settings::load_from(&path).expect_err(raw);
        assert!(
            matches!(err, ConfigError::Parse { .. }),
            "{raw:?} should be a parse error, got {err:?}"
        );
    }
}

#[test]
fn skip_patterns_respect_default_toggle() {
    let mut settings = Settings {
        excludes: vec!["*.part".into()],
        ..Settings::default()
    };

    assert_eq!(settings.skip_patterns(), vec![".DS_Store", "._*", "*.part"]);

    settings.default_excludes = false;
    assert_eq!(settings.skip_patterns(), vec!["*.part"]);
}

#[test]
#[serial]
fn config_env_overrides_location() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("custom.json");
    fs::write(&path, r#"{ "nanosecond": true }"#).expect("write");

    unsafe { std::env::set_var(PROGRAM_CONFIG_ENV, &path) };
    assert_eq!(default_config_path(), path);
    let settings = Settings::load().expect("load");
    unsafe { std::env::remove_var(PROGRAM_CONFIG_ENV) };

    assert!(settings.nanosecond);
}

#[test]
#[serial]
fn xdg_config_home_is_used_when_set() {
    let dir = tempdir().expect("create temp dir");

    unsafe {
        std::env::remove_var(PROGRAM_CONFIG_ENV);
        std::env::set_var("XDG_CONFIG_HOME", dir.path());
    }
    let path = default_config_path();
    unsafe { std::env::remove_var("XDG_CONFIG_HOME") };

    assert_eq!(path, dir.path().join(PROGRAM_NAME).join(CONFIG_FILE_NAME));
}
