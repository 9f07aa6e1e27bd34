use mpc_inventory::simulation::config::BudgetSense;
use mpc_inventory::{PlannerError, PlanningConfig};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn partial_file_keeps_defaults() {
    let file = write_config(
        r#"
        horizon = 14
        lead_time = 3
        initial_stock = 120.0
        robust_constraint_sense = "ge"
        worker_threads = 4
        "#,
    );
    let config = PlanningConfig::load(file.path()).unwrap();

    assert_eq!(config.horizon, 14);
    assert_eq!(config.lead_time, 3);
    assert_eq!(config.initial_stock, Some(120.0));
    assert_eq!(config.robust_constraint_sense, BudgetSense::AtLeast);
    assert_eq!(config.worker_threads, Some(4));
    // Untouched keys.
    assert_eq!(config.planning_days, 30);
    assert_eq!(config.shortage_cost, 300.0);
    assert_eq!(config.scenario_count, 10);
}

#[test]
fn zero_lead_time_is_rejected() {
    let file = write_config("lead_time = 0\n");
    match PlanningConfig::load(file.path()) {
        Err(PlannerError::Config { field, .. }) => assert_eq!(field, "lead_time"),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn negative_cost_is_rejected() {
    let file = write_config("holding_cost = -1.5\n");
    assert!(matches!(
        PlanningConfig::load(file.path()),
        Err(PlannerError::Config { field: "holding_cost", .. })
    ));
}

#[test]
fn unknown_sense_is_a_parse_error() {
    let file = write_config("robust_constraint_sense = \"lt\"\n");
    assert!(matches!(
        PlanningConfig::load(file.path()),
        Err(PlannerError::Parse(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(matches!(
        PlanningConfig::load(path),
        Err(PlannerError::Io(_))
    ));
}
