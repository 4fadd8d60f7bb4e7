use kot_core::errors::{ErrorInfo, KotError, ProviderError};
use kot_core::Status;

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("check", "disk_free")
        .with_context("origin", "system")
}

#[test]
fn registry_error_surface() {
    let err = KotError::Registry(sample_info("registry.duplicate_check", "Duplicate check id 'same'"));
    assert_eq!(err.code(), "registry.duplicate_check");
    assert!(err.info().context.contains_key("origin"));
    assert!(!err.is_planning());
}

#[test]
fn planning_error_surface() {
    let err = KotError::Planning(sample_info("planning.unknown_name", "unknown fact 'nope'"));
    assert!(err.is_planning());
    assert!(err.to_string().starts_with("planning error: unknown fact 'nope'"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = KotError::Config(
        ErrorInfo::new("config.parse", "bad toml")
            .with_context("path", "kot.toml")
            .with_hint("check the [run] table"),
    );
    let text = err.to_string();
    assert!(text.starts_with("config error: bad toml [config.parse]"), "{text}");
    assert!(text.contains("path=kot.toml"));
    assert!(text.contains("hint: check the [run] table"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = KotError::Plugin(ErrorInfo::new("plugin.unknown", "no plugin 'x'"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Plugin");
    assert_eq!(json["detail"]["code"], "plugin.unknown");
    let back: KotError = serde_json::from_value(json).unwrap();
    assert_eq!(back, err);
}

#[test]
fn unknown_status_names_fail_to_parse() {
    let err = "MAYBE".parse::<Status>().unwrap_err();
    assert_eq!(err.code(), "status.unknown");
    assert_eq!("pass".parse::<Status>().unwrap(), Status::Pass);
    assert_eq!("ERROR".parse::<Status>().unwrap(), Status::Error);
}

#[test]
fn foreign_errors_convert_into_provider_errors() {
    fn read_number(raw: &str) -> Result<i64, ProviderError> {
        Ok(raw.trim().parse::<i64>()?)
    }
    let err = read_number("x").unwrap_err();
    assert_eq!(err.kind, "ParseIntError");
    assert_eq!(err.to_string(), "ParseIntError: invalid digit found in string");
}

#[test]
fn panic_payloads_become_provider_errors() {
    let payload = std::panic::catch_unwind(|| panic!("kaput")).unwrap_err();
    let err = ProviderError::from_panic(payload.as_ref());
    assert_eq!(err.kind, "panic");
    assert_eq!(err.message, "kaput");
}
