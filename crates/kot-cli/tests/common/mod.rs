#![allow(dead_code)]

use kot_cli::commands::run::{self, RunArgs};
use kot_cli::config::Config;
use kot_engine::{Check, Fact, Outcome, Value};
use kot_host::{FnPlugin, PluginCatalog};

/// Catalog with one deterministic plugin: a passing `ok`, a failing `bad`.
pub fn demo_catalog() -> PluginCatalog {
    let mut catalog = PluginCatalog::new();
    catalog
        .register(
            "demo",
            FnPlugin::new("demo", |registry| {
                registry.add_fact(Fact::new("answer", |_| Ok(Value::from(42))))?;
                registry.add_check(
                    Check::new("ok", |_| Ok(Outcome::pass("it works")))
                        .with_tags(["smoke"]),
                )?;
                registry.add_check(
                    Check::new("bad", |inputs| {
                        let answer: i64 = inputs.get("answer")?;
                        Ok(Outcome::fail(format!("oops answer={answer}")))
                    })
                    .with_needs(["answer"])
                    .with_tags(["slow", "db"]),
                )?;
                Ok(())
            })
            .with_description("fixtures for cli tests"),
        )
        .expect("register demo");
    catalog
}

pub fn run_to_string(args: &RunArgs, config: &Config) -> String {
    let mut out = Vec::new();
    run::execute(args, config, &demo_catalog(), &mut out).expect("run succeeds");
    String::from_utf8(out).expect("utf8 output")
}
