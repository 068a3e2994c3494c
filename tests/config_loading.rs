// tests/config_loading.rs

use std::io::Write;

use clap::Parser;
use tempfile::NamedTempFile;

use carrierlab::cli::CliArgs;
use carrierlab::config::load_and_validate;
use carrierlab::errors::HarnessError;
use carrierlab::resolve_config;
use carrierlab::types::StrategyKind;
use carrierlab_test_utils::builders::HarnessConfigBuilder;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn loads_every_section() {
    let file = config_file(
        r#"
[harness]
tasks = 3
pooled_tasks = 10
strategy = "quickfix-bounded"
initial_marker = "Outer"

[pool]
bounded_size = 4
wide_size = 32

[wait]
unit_ms = 10
min_units = 2
max_units = 3
seed = 99
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.tasks(), 3);
    assert_eq!(cfg.tasks_for(StrategyKind::QuickfixBounded), 10);
    assert_eq!(cfg.tasks_for(StrategyKind::Naive), 3);
    assert_eq!(cfg.strategy(), StrategyKind::QuickfixBounded);
    assert_eq!(cfg.initial_marker(), "Outer");
    assert_eq!(cfg.pool_sizes().bounded, 4);
    assert_eq!(cfg.pool_sizes().wide, 32);
    assert_eq!(cfg.wait_bounds(), (2, 3));
    assert_eq!(cfg.seed(), Some(99));
}

#[test]
fn empty_file_uses_defaults() {
    let file = config_file("");
    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.tasks(), 9);
    assert_eq!(cfg.strategy(), StrategyKind::Naive);
    assert_eq!(cfg.initial_marker(), "Main");
}

#[test]
fn unknown_strategy_is_a_toml_error() {
    let file = config_file(
        r#"
[harness]
strategy = "eager"
"#,
    );

    match load_and_validate(file.path()) {
        Err(HarnessError::TomlError(_)) => {}
        other => panic!("Expected TomlError, got: {:?}", other),
    }
}

#[test]
fn zero_pool_size_is_a_config_error() {
    let file = config_file(
        r#"
[pool]
bounded_size = 0
"#,
    );

    match load_and_validate(file.path()) {
        Err(HarnessError::ConfigError(msg)) => assert!(msg.contains("bounded_size")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_and_validate("/definitely/not/here/carrierlab.toml");
    assert!(matches!(result, Err(HarnessError::IoError(_))));
}

#[test]
fn cli_flags_override_the_file() {
    let file = config_file(
        r#"
[harness]
tasks = 3
strategy = "correct"

[wait]
unit_ms = 10
"#,
    );
    let path = file.path().to_str().unwrap().to_string();

    let args = CliArgs::parse_from([
        "carrierlab",
        "--config",
        path.as_str(),
        "--strategy",
        "s6",
        "--unit-ms",
        "2",
    ]);
    let cfg = resolve_config(&args).unwrap();

    assert_eq!(cfg.strategy(), StrategyKind::FireAndForget);
    assert_eq!(cfg.tasks(), 3);
    assert_eq!(cfg.unit(), std::time::Duration::from_millis(2));
}

#[test]
fn cli_validation_errors_surface() {
    let args = CliArgs::parse_from(["carrierlab", "--tasks", "0"]);
    let err = resolve_config(&args).unwrap_err();
    assert!(err.to_string().contains("tasks"));
}

#[test]
fn a_seeded_config_rebuilds_the_same_wait_plan() {
    let cfg = HarnessConfigBuilder::new().waits(3, 1, 4, 11).build();
    let mut first = cfg.wait_plan();
    let mut second = cfg.wait_plan();
    for _ in 0..16 {
        assert_eq!(first.next_wait(), second.next_wait());
    }
}
