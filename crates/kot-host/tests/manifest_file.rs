use std::fs;

use kot_host::{load_plugin_manifest, ManifestEntry, PluginManifest};

#[test]
fn manifest_files_parse_with_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("plugins.toml");
    fs::write(
        &path,
        r#"
[[plugin]]
name = "system"
description = "host facts"

[[plugin]]
name = "legacy"
enabled = false
"#,
    )
    .expect("write manifest");

    let manifest = load_plugin_manifest(&path).expect("manifest");
    assert_eq!(
        manifest.plugins[0],
        ManifestEntry {
            name: "system".into(),
            enabled: true,
            description: Some("host facts".into()),
        }
    );
    assert_eq!(manifest.enabled().collect::<Vec<_>>(), vec!["system"]);
    assert_eq!(manifest.disabled().collect::<Vec<_>>(), vec!["legacy"]);

    let text = toml::to_string(&manifest).expect("serialize");
    let parsed: PluginManifest = toml::from_str(&text).expect("parse");
    assert_eq!(parsed, manifest);
}

#[test]
fn unreadable_and_invalid_manifests_are_config_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent.toml");
    let err = load_plugin_manifest(&missing).unwrap_err();
    assert_eq!(err.code(), "plugin.read_manifest");
    assert!(err.info().context.contains_key("path"));

    let blank = dir.path().join("blank.toml");
    fs::write(&blank, "[[plugin]]\nname = \"  \"\n").expect("write");
    assert_eq!(load_plugin_manifest(&blank).unwrap_err().code(), "plugin.manifest_name");

    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "[[plugin]\nname=").expect("write");
    assert_eq!(load_plugin_manifest(&broken).unwrap_err().code(), "plugin.parse_manifest");
}
