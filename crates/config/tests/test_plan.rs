//! Test plan for the `roster-config` crate.
//!
//! These tests exercise the configuration loader across default handling,
//! file discovery, environment overrides, and clamping behaviour.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use roster_config::{load, AppConfig};

const ENV_VARS_TO_RESET: &[&str] = &[
    "ROSTER_CONFIG",
    "ROSTER__DATABASE__CONNECT_ATTEMPTS",
    "ROSTER__DATABASE__CONNECT_BACKOFF_SECONDS",
    "ROSTER__DATABASE__MAX_CONNECTIONS",
    "ROSTER__DATABASE__URL",
    "ROSTER__HTTP__ADDRESS",
    "ROSTER__HTTP__PORT",
];

struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        Self {
            vars: Vec::new(),
            original_dir: None,
        }
    }

    fn reset_environment(&mut self) {
        for key in ENV_VARS_TO_RESET {
            self.remove_var(key);
        }
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn remove_var(&mut self, key: &str) {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        self.vars.push((key.to_string(), previous));
    }

    fn set_current_dir(&mut self, dir: &Path) {
        if self.original_dir.is_none() {
            self.original_dir =
                Some(std::env::current_dir().expect("failed to capture current directory"));
        }
        std::env::set_current_dir(dir).expect("failed to set current directory");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(original) = self.original_dir.take() {
            let _ = std::env::set_current_dir(original);
        }

        while let Some((key, value)) = self.vars.pop() {
            match value {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }
    }
}

fn write_config_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create config directories");
    }
    fs::write(path, contents).expect("failed to write config file");
}

fn isolated() -> (TempDir, TestContext) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());
    (temp_dir, ctx)
}

#[test]
#[serial]
fn load_uses_default_values_when_no_files_found() {
    let (_temp_dir, _ctx) = isolated();

    let config = load().expect("configuration load should succeed without files");
    let defaults = AppConfig::default();

    assert_eq!(config.http.address, defaults.http.address);
    assert_eq!(config.http.port, defaults.http.port);
    assert_eq!(config.database.url, defaults.database.url);
    assert_eq!(
        config.database.max_connections,
        defaults.database.max_connections
    );
    assert_eq!(
        config.database.connect_attempts,
        defaults.database.connect_attempts
    );
    assert_eq!(
        config.database.connect_backoff_seconds,
        defaults.database.connect_backoff_seconds
    );
}

#[test]
#[serial]
fn load_picks_first_available_file_in_search_order() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "roster.toml",
        r#"
        [http]
        port = 4242
        "#,
    );
    write_config_file(
        temp_dir.path(),
        "config/roster.toml",
        r#"
        [http]
        port = 5151
        "#,
    );

    let config = load().expect("configuration load should pick the first file");
    assert_eq!(config.http.port, 4242);
}

#[test]
#[serial]
fn load_merges_partial_file_with_defaults() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "roster.toml",
        r#"
        [http]
        port = 8181

        [database]
        max_connections = 50
        "#,
    );

    let config = load().expect("configuration load should succeed");
    let defaults = AppConfig::default();

    assert_eq!(config.http.port, 8181);
    assert_eq!(config.http.address, defaults.http.address);
    assert_eq!(config.database.max_connections, 50);
    assert_eq!(config.database.url, defaults.database.url);
    assert_eq!(
        config.database.connect_attempts,
        defaults.database.connect_attempts
    );
}

#[test]
#[serial]
fn load_applies_environment_overrides() {
    let (temp_dir, mut ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "roster.toml",
        r#"
        [http]
        port = 3030
        "#,
    );

    ctx.set_var("ROSTER__HTTP__PORT", "9090");
    ctx.set_var("ROSTER__DATABASE__URL", "sqlite://override.db");

    let config = load().expect("configuration load should honour env overrides");
    assert_eq!(config.http.port, 9090);
    assert_eq!(config.database.url, "sqlite://override.db");
}

#[test]
#[serial]
fn load_reads_explicit_config_path() {
    let (temp_dir, mut ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "elsewhere/custom.toml",
        r#"
        [database]
        connect_attempts = 4
        connect_backoff_seconds = 1
        "#,
    );
    let path = temp_dir.path().join("elsewhere/custom.toml");
    ctx.set_var("ROSTER_CONFIG", path.to_string_lossy());

    let config = load().expect("configuration load should read ROSTER_CONFIG");
    assert_eq!(config.database.connect_attempts, 4);
    assert_eq!(config.database.connect_backoff_seconds, 1);
}

#[test]
#[serial]
fn load_raises_zero_connect_attempts_to_one() {
    let (_temp_dir, mut ctx) = isolated();

    ctx.set_var("ROSTER__DATABASE__CONNECT_ATTEMPTS", "0");

    let config = load().expect("configuration load should succeed");
    assert_eq!(config.database.connect_attempts, 1);
}

#[test]
#[serial]
fn load_rejects_malformed_port() {
    let (_temp_dir, mut ctx) = isolated();

    ctx.set_var("ROSTER__HTTP__PORT", "not-a-port");

    assert!(load().is_err());
}
