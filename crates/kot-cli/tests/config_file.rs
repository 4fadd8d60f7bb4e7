use std::fs;

use kot_cli::commands::run::RunArgs;
use kot_cli::config::{load_config, resolve_config, Config, OutputFormat};
use tempfile::tempdir;

#[test]
fn empty_file_uses_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("kot.toml");
    fs::write(&path, "").expect("write");
    let config = load_config(&path).expect("config");
    assert_eq!(config, Config::default());
    assert_eq!(config.log.level, "warn");
    assert!(config.plugins.discover);
}

#[test]
fn tables_are_parsed() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("kot.toml");
    fs::write(
        &path,
        r#"
[run]
tags = ["smoke"]
include_tags = true
format = "human"

[log]
level = "debug"
json = true

[plugins]
enabled = ["system"]
discover = false
"#,
    )
    .expect("write");
    let config = resolve_config(Some(&path)).expect("config");
    assert_eq!(config.run.tags, vec!["smoke".to_string()]);
    assert!(config.run.include_tags);
    assert_eq!(config.run.format, OutputFormat::Human);
    assert!(config.log.json);
    assert_eq!(config.plugins.enabled, vec!["system".to_string()]);

    let selection = RunArgs::default().selection(&config).expect("selection");
    assert_eq!(selection.explicit, vec!["system".to_string()]);
    assert!(!selection.discover);
}

#[test]
fn invalid_toml_reports_parse_code() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("kot.toml");
    fs::write(&path, "[run\ntags = 3").expect("write");
    let err = load_config(&path).expect_err("parse error");
    assert_eq!(err.code(), "config.parse");
    assert!(err.to_string().contains("kot.toml"));
}

#[test]
fn missing_file_reports_read_code() {
    let dir = tempdir().expect("tempdir");
    let err = load_config(&dir.path().join("absent.toml")).expect_err("read error");
    assert_eq!(err.code(), "config.read");
}

#[test]
fn manifest_disables_discovered_plugin() {
    let dir = tempdir().expect("tempdir");
    let manifest = dir.path().join("plugins.toml");
    fs::write(&manifest, "[[plugin]]\nname = \"system\"\nenabled = false\n").expect("write");
    let args = RunArgs {
        manifest: Some(manifest),
        ..RunArgs::default()
    };
    let selection = args.selection(&Config::default()).expect("selection");
    assert!(selection.discover);
    assert!(selection.disabled.contains("system"));
}
