use std::path::PathBuf;
use workforce_ledger::config::{Config, DEFAULT_LEDGER_PATH};

// Both cases share process-wide environment variables, so they run in one
// test to avoid racing each other.
#[test]
fn config_from_env() {
    unsafe {
        std::env::remove_var("WORKFORCE_LEDGER_PATH");
        std::env::set_var("OTEL_ENDPOINT", "");
    }

    let config = Config::from_env().unwrap();
    assert_eq!(config.ledger_path, PathBuf::from(DEFAULT_LEDGER_PATH));
    assert!(config.otel_endpoint.is_none());
    assert!(!config.log_level.is_empty());

    unsafe {
        std::env::set_var("WORKFORCE_LEDGER_PATH", "/var/lib/workforce/ledger.json");
    }
    let config = Config::from_env().unwrap();
    assert_eq!(
        config.ledger_path,
        PathBuf::from("/var/lib/workforce/ledger.json")
    );

    unsafe {
        std::env::set_var("WORKFORCE_LEDGER_PATH", "  ");
    }
    assert!(Config::from_env().is_err());

    // Clean up
    unsafe {
        std::env::remove_var("WORKFORCE_LEDGER_PATH");
        std::env::remove_var("OTEL_ENDPOINT");
    }
}
