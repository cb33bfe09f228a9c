//! Configuration loading tests

use kit_hooks::config::Config;
use kit_hooks::hooks::{self, signal_sizer, HOOK_NAMES};
use kit_hooks::telemetry::LogFormat;

#[test]
fn test_example_config_parses() {
    let config: Config = toml::from_str(include_str!("../../kit-hooks.toml.example")).unwrap();

    assert_eq!(config.data_dir.to_string_lossy(), "./kit-data");
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
    assert!(config.telemetry.metrics_port.is_none());
    assert_eq!(
        config.hook_options("spread-monitor").get("maxSamples"),
        Some(&serde_json::json!(1500))
    );
}

#[test]
fn test_example_config_builds_hooks() {
    let config: Config = toml::from_str(include_str!("../../kit-hooks.toml.example")).unwrap();

    let names = hooks::dispatcher(&config).unwrap().hook_names();
    let expected: Vec<&str> = HOOK_NAMES
        .iter()
        .copied()
        .filter(|n| *n != signal_sizer::NAME)
        .collect();
    assert_eq!(names, expected);
}

#[test]
fn test_empty_config_uses_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.telemetry.log_level, "info");
    assert!(config.hooks.is_empty());
    assert_eq!(hooks::build_hooks(&config).unwrap().len(), HOOK_NAMES.len());
}
