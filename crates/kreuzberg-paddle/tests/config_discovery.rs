//! Configuration file discovery.

use std::fs;

use kreuzberg_paddle::RequestedDevice;
use kreuzberg_paddle::ocr::{CONFIG_FILE_NAME, PaddleOcrConfig};
use serial_test::serial;
use tempfile::TempDir;

const CONFIG_TOML: &str = r#"
language = "japan"
device = "cpu"
use_angle_cls = false
"#;

fn discover_from(dir: &std::path::Path) -> kreuzberg_paddle::Result<Option<PaddleOcrConfig>> {
    let original_dir = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir).unwrap();
    let result = PaddleOcrConfig::discover();
    std::env::set_current_dir(original_dir).unwrap();
    result
}

#[test]
#[serial]
fn test_discover_finds_config_in_current_dir() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(CONFIG_FILE_NAME), CONFIG_TOML).unwrap();

    let config = discover_from(temp_dir.path()).unwrap().expect("config should be found");
    assert_eq!(config.language, "japan");
    assert_eq!(config.device, RequestedDevice::Cpu);
    assert!(!config.use_angle_cls);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_discover_finds_config_in_parent_dir() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(CONFIG_FILE_NAME), CONFIG_TOML).unwrap();
    let nested = temp_dir.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();

    let config = discover_from(&nested).unwrap();
    assert_eq!(config.map(|c| c.language), Some("japan".to_string()));
}

#[test]
#[serial]
fn test_discover_reports_invalid_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "device = \"tpu\"").unwrap();

    let err = discover_from(temp_dir.path()).unwrap_err();
    assert!(err.to_string().contains("Invalid TOML"));
}

#[test]
#[serial]
fn test_discover_without_config() {
    let temp_dir = TempDir::new().unwrap();
    let result = discover_from(temp_dir.path()).unwrap();
    assert!(result.is_none());
}
