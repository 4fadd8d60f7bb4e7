mod common;

use common::{demo_catalog, run_to_string};
use kot_cli::commands::run::{self, RunArgs};
use kot_cli::config::{Config, OutputFormat};
use kot_engine::{Check, Outcome};
use kot_host::{FnPlugin, PluginCatalog};
use serde_json::Value;

#[test]
fn json_report_is_one_line() {
    let output = run_to_string(&RunArgs::default(), &Config::default());
    assert_eq!(output.lines().count(), 1);
    let report: Value = serde_json::from_str(&output).expect("json");
    assert_eq!(report["overall"], "FAIL");
    assert_eq!(report["counts"]["PASS"], 1);
    assert_eq!(report["counts"]["FAIL"], 1);
    let ids: Vec<&str> = report["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|item| item["id"].as_str().expect("id"))
        .collect();
    assert_eq!(ids, vec!["ok", "bad"]);
    assert!(report["items"][0].get("tags").is_none());
}

#[test]
fn include_tags_adds_tags_to_items() {
    let args = RunArgs {
        include_tags: true,
        ..RunArgs::default()
    };
    let report: Value = serde_json::from_str(&run_to_string(&args, &Config::default())).expect("json");
    assert_eq!(report["items"][1]["tags"], serde_json::json!(["slow", "db"]));
}

#[test]
fn human_output_lines() {
    let args = RunArgs {
        human: true,
        ..RunArgs::default()
    };
    let output = run_to_string(&args, &Config::default());
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "PASS  ok: it works");
    assert_eq!(lines[1], "FAIL  bad: oops answer=42");
    assert!(lines[2].starts_with("OVERALL: FAIL"));
}

#[test]
fn configured_format_is_used_without_flag() {
    let mut config = Config::default();
    config.run.format = OutputFormat::Human;
    let output = run_to_string(&RunArgs::default(), &config);
    assert!(output.contains("OVERALL: FAIL"));
}

#[test]
fn tag_filter_limits_items() {
    let args = RunArgs {
        tags: vec!["smoke".to_string()],
        ..RunArgs::default()
    };
    let report: Value = serde_json::from_str(&run_to_string(&args, &Config::default())).expect("json");
    assert_eq!(report["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(report["items"][0]["id"], "ok");
    assert_eq!(report["overall"], "PASS");
}

#[test]
fn unmatched_tag_yields_empty_items() {
    let args = RunArgs {
        tags: vec!["nothing".to_string()],
        ..RunArgs::default()
    };
    let output = run_to_string(&args, &Config::default());
    assert!(output.contains("\"items\":[]"));
}

#[test]
fn configured_tags_apply_when_flag_absent() {
    let mut config = Config::default();
    config.run.tags = vec!["db".to_string()];
    let report: Value = serde_json::from_str(&run_to_string(&RunArgs::default(), &config)).expect("json");
    assert_eq!(report["items"][0]["id"], "bad");
}

#[test]
fn list_prints_names_and_tags() {
    let args = RunArgs {
        list: true,
        ..RunArgs::default()
    };
    let output = run_to_string(&args, &Config::default());
    assert_eq!(output, "ok [smoke]\nbad [slow, db]\n");
}

#[test]
fn no_discover_loads_nothing() {
    let args = RunArgs {
        no_discover: true,
        ..RunArgs::default()
    };
    let report: Value = serde_json::from_str(&run_to_string(&args, &Config::default())).expect("json");
    assert_eq!(report["overall"], "PASS");
    assert_eq!(report["items"], serde_json::json!([]));
}

#[test]
fn unknown_plugin_is_an_error() {
    let args = RunArgs {
        plugins: vec!["missing".to_string()],
        ..RunArgs::default()
    };
    let mut out = Vec::new();
    let err = run::execute(&args, &Config::default(), &demo_catalog(), &mut out)
        .expect_err("unknown plugin");
    assert!(err.to_string().contains("failed to load plugin 'missing'"));
}

#[test]
fn planning_error_fails_the_command() {
    let mut catalog = PluginCatalog::new();
    catalog
        .register(
            "broken",
            FnPlugin::new("broken", |registry| {
                registry.add_check(
                    Check::new("c", |_| Ok(Outcome::pass("unreachable")))
                        .with_selector("no_such_fact"),
                )
            }),
        )
        .expect("register");
    let mut out = Vec::new();
    let err = run::execute(&RunArgs::default(), &Config::default(), &catalog, &mut out)
        .expect_err("planning error");
    assert!(err.to_string().contains("no_such_fact"));
    assert!(out.is_empty());
}
