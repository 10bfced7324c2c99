//! composegenie.toml 통합 설정 테스트
//!
//! - composegenie.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 파일 로딩 / 잘못된 형식 에러 테스트

use std::io::Write;

use composegenie_core::config::{ComposeGenieConfig, DEFAULT_STORAGE_KEY};
use composegenie_core::error::{ComposeGenieError, ConfigError};

const EXAMPLE: &str = include_str!("../../../composegenie.toml.example");

// =============================================================================
// composegenie.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let config = ComposeGenieConfig::parse(EXAMPLE).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "pretty");
    assert_eq!(config.catalog.debounce_ms, 300);
    assert_eq!(config.selection.storage_key, "composerSelections");
    assert_eq!(config.compose.version, "3.8");
}

#[test]
fn example_config_passes_validation() {
    let config = ComposeGenieConfig::parse(EXAMPLE).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_code_defaults() {
    let example = ComposeGenieConfig::parse(EXAMPLE).expect("should parse");
    let defaults = ComposeGenieConfig::default();

    assert_eq!(example.general.log_level, defaults.general.log_level);
    assert_eq!(example.general.log_format, defaults.general.log_format);
    assert_eq!(example.catalog.dataset_path, defaults.catalog.dataset_path);
    assert_eq!(example.catalog.debounce_ms, defaults.catalog.debounce_ms);
    assert_eq!(example.selection.persist, defaults.selection.persist);
    assert_eq!(example.selection.store_path, defaults.selection.store_path);
    assert_eq!(example.selection.storage_key, DEFAULT_STORAGE_KEY);
    assert_eq!(example.compose.version, defaults.compose.version);
    assert_eq!(
        example.compose.default_restart,
        defaults.compose.default_restart
    );
}

// =============================================================================
// 부분 설정 테스트
// =============================================================================

#[test]
fn partial_config_catalog_only() {
    let toml = r#"
[catalog]
debounce_ms = 50
"#;
    let config = ComposeGenieConfig::parse(toml).expect("should parse");
    assert_eq!(config.catalog.debounce_ms, 50);
    assert_eq!(config.catalog.dataset_path, "");
    assert_eq!(config.general.log_level, "info");
    assert!(config.selection.persist);
}

#[test]
fn partial_config_selection_only() {
    let toml = r#"
[selection]
persist = false
storage_key = "mySelections"
"#;
    let config = ComposeGenieConfig::parse(toml).expect("should parse");
    assert!(!config.selection.persist);
    assert_eq!(config.selection.storage_key, "mySelections");
    assert!(config.selection.resolved_store_path().is_none());
    assert_eq!(config.compose.version, "3.8");
}

#[test]
fn partial_config_explicit_store_path_is_used() {
    let toml = r#"
[selection]
store_path = "/tmp/genie/selections.json"
"#;
    let config = ComposeGenieConfig::parse(toml).expect("should parse");
    assert_eq!(
        config.selection.resolved_store_path(),
        Some(std::path::PathBuf::from("/tmp/genie/selections.json"))
    );
}

#[test]
fn invalid_restart_policy_fails_validation() {
    let toml = r#"
[compose]
default_restart = "sometimes"
"#;
    let config = ComposeGenieConfig::parse(toml).expect("should parse");
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("compose.default_restart"));
}

#[test]
fn malformed_toml_is_parse_error() {
    let err = ComposeGenieConfig::parse("[catalog\ndebounce_ms = ").unwrap_err();
    assert!(matches!(
        err,
        ComposeGenieError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn wrong_field_type_is_parse_error() {
    let err = ComposeGenieConfig::parse("[catalog]\ndebounce_ms = \"fast\"").unwrap_err();
    assert!(matches!(
        err,
        ComposeGenieError::Config(ConfigError::ParseFailed { .. })
    ));
}

// =============================================================================
// 파일 로딩 테스트
// =============================================================================

#[tokio::test]
async fn from_file_reads_toml() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[catalog]\ndebounce_ms = 120").expect("write");

    let config = ComposeGenieConfig::from_file(file.path())
        .await
        .expect("should load");
    assert_eq!(config.catalog.debounce_ms, 120);
}

#[tokio::test]
async fn from_file_missing_is_file_not_found() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = ComposeGenieConfig::from_file(dir.path().join("absent.toml"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ComposeGenieError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[tokio::test]
#[serial_test::serial]
async fn load_or_default_falls_back_when_missing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = ComposeGenieConfig::load_or_default(dir.path().join("absent.toml"))
        .await
        .expect("missing file should fall back to defaults");
    assert_eq!(config.compose.version, "3.8");
}

#[tokio::test]
#[serial_test::serial]
async fn load_or_default_still_rejects_broken_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[general]\nlog_level = ").expect("write");

    let result = ComposeGenieConfig::load_or_default(file.path()).await;
    assert!(result.is_err());
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[general]
log_level = "info"
"#;

    let original = std::env::var("COMPOSEGENIE_GENERAL_LOG_LEVEL").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("COMPOSEGENIE_GENERAL_LOG_LEVEL", "error");
    }

    let mut config = ComposeGenieConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let result = config.general.log_level.clone();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("COMPOSEGENIE_GENERAL_LOG_LEVEL", val),
            None => std::env::remove_var("COMPOSEGENIE_GENERAL_LOG_LEVEL"),
        }
    }

    assert_eq!(result, "error");
}

#[test]
#[serial_test::serial]
fn env_override_numeric_field() {
    let original = std::env::var("COMPOSEGENIE_CATALOG_DEBOUNCE_MS").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("COMPOSEGENIE_CATALOG_DEBOUNCE_MS", "75");
    }

    let mut config = ComposeGenieConfig::parse("").expect("should parse");
    config.apply_env_overrides();
    let result = config.catalog.debounce_ms;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("COMPOSEGENIE_CATALOG_DEBOUNCE_MS", val),
            None => std::env::remove_var("COMPOSEGENIE_CATALOG_DEBOUNCE_MS"),
        }
    }

    assert_eq!(result, 75);
}

#[test]
#[serial_test::serial]
fn env_override_invalid_bool_keeps_toml_value() {
    let original = std::env::var("COMPOSEGENIE_SELECTION_PERSIST").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("COMPOSEGENIE_SELECTION_PERSIST", "maybe");
    }

    let mut config = ComposeGenieConfig::parse("[selection]\npersist = false").expect("parse");
    config.apply_env_overrides();
    let result = config.selection.persist;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("COMPOSEGENIE_SELECTION_PERSIST", val),
            None => std::env::remove_var("COMPOSEGENIE_SELECTION_PERSIST"),
        }
    }

    assert!(!result);
}
