use kot_cli::catalog;
use kot_cli::commands::plugins::{self, PluginsArgs};
use kot_engine::{Registry, Runner};
use kot_host::{load_plugins, PluginSelection};

#[test]
fn list_shows_builtin_system_plugin() {
    let catalog = catalog().expect("catalog");
    let mut out = Vec::new();
    plugins::execute(&PluginsArgs { list: true }, &catalog, &mut out).expect("list");
    let output = String::from_utf8(out).expect("utf8");
    assert_eq!(output, "system system - operating system and cpu facts\n");
}

#[test]
fn without_list_prints_count() {
    let catalog = catalog().expect("catalog");
    let mut out = Vec::new();
    plugins::execute(&PluginsArgs::default(), &catalog, &mut out).expect("count");
    assert!(String::from_utf8(out).expect("utf8").starts_with("1 plugin(s)"));
}

#[test]
fn system_checks_never_error() {
    let catalog = catalog().expect("catalog");
    let mut registry = Registry::new();
    load_plugins(&mut registry, &catalog, &PluginSelection::discover_all()).expect("load");
    let result = Runner::new().run(&registry).expect("run");
    assert_eq!(result.items.len(), 2);
    assert_eq!(result.counts.error, 0);
    assert_eq!(result.counts.fail, 0);
}
