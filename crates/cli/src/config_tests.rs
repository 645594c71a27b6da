// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use crate::logging::LogFormat;
use rstest::rstest;
use std::collections::HashMap;
use std::io::Write;

fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |var| map.get(var).cloned()
}

#[test]
fn test_empty_config_uses_defaults() {
    let config: HarnessConfig = toml::from_str("").unwrap();

    assert_eq!(config, HarnessConfig::default());
    assert_eq!(config.isolation, Isolation::InProcess);
    assert_eq!(config.report.format, ReportFormat::Text);
    assert!(!config.fail_fast);
    assert!(config.wraps.is_empty());
}

#[test]
fn test_parse_full_config() {
    let config: HarnessConfig = toml::from_str(
        r#"
name = "zlib-inflate"
isolation = "subprocess"
filter = "^inflate_"
fail_fast = true

[report]
format = "json"
verbose = true
json_path = "report.json"

[log]
level = "debug"
format = "pretty"

[[wrap]]
symbol = "inflateInit_"
"#,
    )
    .unwrap();

    assert_eq!(config.name, "zlib-inflate");
    assert_eq!(config.isolation, Isolation::Subprocess);
    assert_eq!(config.filter.as_deref(), Some("^inflate_"));
    assert!(config.fail_fast);
    assert_eq!(config.report.format, ReportFormat::Json);
    assert!(config.report.verbose);
    assert_eq!(config.report.json_path, Some(PathBuf::from("report.json")));
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.log.format, LogFormat::Pretty);
    assert_eq!(config.wraps, vec![WrapSpec::new("inflateInit_")]);
}

#[test]
fn test_unknown_field_rejected() {
    let err = toml::from_str::<HarnessConfig>("timeout = 5").unwrap_err();
    assert!(err.to_string().contains("timeout"));
}

#[test]
fn test_load_toml_file() {
    let file = write_config(".toml", "name = \"suite\"\n");
    let config = HarnessConfig::load(file.path()).unwrap();
    assert_eq!(config.name, "suite");
}

#[test]
fn test_load_json_file() {
    let file = write_config(
        ".json",
        r#"{"name": "suite", "isolation": "subprocess", "wrap": [{"symbol": "png_error"}]}"#,
    );
    let config = HarnessConfig::load(file.path()).unwrap();

    assert_eq!(config.isolation, Isolation::Subprocess);
    assert_eq!(config.wraps[0].symbol, "png_error");
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = HarnessConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_load_rejects_bad_filter() {
    let file = write_config(".toml", "filter = \"(unclosed\"\n");
    let err = HarnessConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Regex(_)), "{:?}", err);
}

#[test]
fn test_load_rejects_duplicate_wrap() {
    let file = write_config(
        ".toml",
        "[[wrap]]\nsymbol = \"free\"\n\n[[wrap]]\nsymbol = \"free\"\n",
    );
    let err = HarnessConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Link(LinkError::DuplicateSymbol(_))));
    assert!(err.to_string().starts_with("Invalid wrap configuration"));
}

#[test]
fn test_overrides_apply() {
    let mut config = HarnessConfig::default();
    config
        .apply_overrides(env(&[
            (FILTER_ENV, "deflate"),
            (ISOLATION_ENV, "subprocess"),
            (FORMAT_ENV, "json"),
        ]))
        .unwrap();

    assert_eq!(config.filter.as_deref(), Some("deflate"));
    assert_eq!(config.isolation, Isolation::Subprocess);
    assert_eq!(config.report.format, ReportFormat::Json);
}

#[test]
fn test_empty_filter_override_clears_filter() {
    let mut config = HarnessConfig {
        filter: Some("x".to_string()),
        ..HarnessConfig::default()
    };
    config.apply_overrides(env(&[(FILTER_ENV, "")])).unwrap();
    assert_eq!(config.filter, None);
}

#[test]
fn test_absent_overrides_leave_config() {
    let mut config = HarnessConfig {
        isolation: Isolation::Subprocess,
        ..HarnessConfig::default()
    };
    config.apply_overrides(env(&[])).unwrap();
    assert_eq!(config.isolation, Isolation::Subprocess);
}

#[rstest]
#[case(ISOLATION_ENV, "threads")]
#[case(FORMAT_ENV, "xml")]
fn test_invalid_override(#[case] var: &'static str, #[case] value: &str) {
    let mut config = HarnessConfig::default();
    let err = config.apply_overrides(env(&[(var, value)])).unwrap_err();
    assert!(
        matches!(err, ConfigError::Env { var: v, value: ref got } if v == var && got == value)
    );
}

#[rstest]
#[case("in_process", Isolation::InProcess)]
#[case("in-process", Isolation::InProcess)]
#[case("subprocess", Isolation::Subprocess)]
fn test_isolation_from_str(#[case] input: &str, #[case] expected: Isolation) {
    assert_eq!(input.parse::<Isolation>().unwrap(), expected);
}

#[test]
fn test_filter_regex() {
    let config = HarnessConfig {
        filter: Some("^png_".to_string()),
        ..HarnessConfig::default()
    };
    let re = config.filter_regex().unwrap().unwrap();
    assert!(re.is_match("png_read_info"));
    assert!(!re.is_match("libpng_read"));
    assert!(HarnessConfig::default().filter_regex().unwrap().is_none());
}

#[test]
fn test_isolation_display_round_trips() {
    for isolation in [Isolation::InProcess, Isolation::Subprocess] {
        assert_eq!(isolation.to_string().parse::<Isolation>().unwrap(), isolation);
    }
}
