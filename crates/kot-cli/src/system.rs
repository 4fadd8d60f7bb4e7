//! Built-in plugin with facts about the host the binary runs on.

use std::fs;
use std::thread;

use kot_core::KotError;
use kot_engine::{Check, Fact, Inputs, Outcome, ProviderError, Registry, Value};
use kot_host::Plugin;

const OS_RELEASE_PATH: &str = "/etc/os-release";

/// `ID` from an os-release file, lower-cased and unquoted.
pub fn parse_os_release_id(contents: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let value = line.trim().strip_prefix("ID=")?;
        let value = value.trim().trim_matches(|c: char| c == '"' || c == '\'');
        (!value.is_empty()).then(|| value.to_ascii_lowercase())
    })
}

fn os_release(_: &Inputs) -> Result<Value, ProviderError> {
    let id = fs::read_to_string(OS_RELEASE_PATH)
        .ok()
        .and_then(|contents| parse_os_release_id(&contents))
        .unwrap_or_else(|| std::env::consts::OS.to_string());
    Ok(Value::String(id))
}

fn cpu_count(_: &Inputs) -> Result<Value, ProviderError> {
    let count = thread::available_parallelism()?;
    Ok(Value::from(count.get()))
}

/// Outcome of the `os_is_ubuntu` check for an os-release id.
pub fn judge_os(id: &str) -> Outcome {
    match id {
        "ubuntu" => Outcome::pass(format!("os={id} is supported")),
        "darwin" | "macos" | "windows" => Outcome::skip(format!("os={id} not applicable")),
        _ => Outcome::warn(format!("os={id} is not ubuntu")),
    }
}

fn os_is_ubuntu(inputs: &Inputs) -> Result<Outcome, ProviderError> {
    let id: String = inputs.get("os_release")?;
    Ok(judge_os(&id))
}

fn cpu_count_sane(inputs: &Inputs) -> Result<Outcome, ProviderError> {
    let count: u64 = inputs.get("cpu_count")?;
    Ok(if count == 0 {
        Outcome::fail("cpu_count=0")
    } else {
        Outcome::pass(format!("cpu_count={count}"))
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPlugin;

impl Plugin for SystemPlugin {
    fn name(&self) -> &str {
        "system"
    }

    fn description(&self) -> Option<&str> {
        Some("operating system and cpu facts")
    }

    fn register(&self, registry: &mut Registry) -> Result<(), KotError> {
        registry.add_fact(Fact::new("os_release", os_release))?;
        registry.add_fact(Fact::new("cpu_count", cpu_count))?;
        registry.add_check(
            Check::new("os_is_ubuntu", os_is_ubuntu)
                .with_needs(["os_release"])
                .with_tags(["os"]),
        )?;
        registry.add_check(
            Check::new("cpu_count_sane", cpu_count_sane)
                .with_needs(["cpu_count"])
                .with_tags(["cpu"]),
        )?;
        Ok(())
    }
}
