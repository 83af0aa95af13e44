use std::fs;

use stockex::error::{ConfigError, Error};
use stockex::infrastructure::config::settings::Config;
use stockex::testkit;

fn write_temp_config(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("stockex.toml");
    fs::write(&path, contents).expect("write temp config");
    path
}

#[test]
fn config_loads_sections_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("catalog.db");
    let path = write_temp_config(&dir, &testkit::config::config_toml(db.to_str().unwrap()));

    let config = Config::load(&path).unwrap();
    assert_eq!(config.database.url, db.to_str().unwrap());
    assert_eq!(config.auth.password, testkit::config::password());
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.database, Config::default().database);
    assert_eq!(config.auth.refresh_token_ttl_secs, 7 * 24 * 60 * 60);
}

#[test]
fn load_requires_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
}

#[test]
fn config_rejects_refresh_shorter_than_access() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp_config(
        &dir,
        "[auth]\naccess_token_ttl_secs = 3600\nrefresh_token_ttl_secs = 60\n",
    );

    let err = Config::load(&path).unwrap_err();
    assert!(
        err.to_string().contains("refresh_token_ttl_secs"),
        "unexpected error: {err}"
    );
}

#[test]
fn config_rejects_unknown_log_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp_config(&dir, "[logging]\nformat = \"xml\"\n");

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidValue {
            field: "logging.format",
            ..
        })
    ));
}
