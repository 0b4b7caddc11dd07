//! Integration tests for ModelSettings layered loading.
//!
//! Tests calling `ModelSettings::load` read the process environment and hold
//! `ENV_LOCK`; the other tests load files directly.

use std::fs;
use std::sync::Mutex;

use rstest::rstest;
use tempfile::TempDir;

use clinical_model::config::{ConfigError, ModelSettings};
use clinical_model::domain::{Buildable, Builder, ValidationPolicy};
use clinical_model::resource::Account;
use clinical_model::types::FhirString;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("model.toml");
    fs::write(&path, content).expect("write config");
    path
}

#[rstest]
fn given_partial_file_when_loading_then_unspecified_values_keep_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "lenient_untyped_references = false\n");

    // Act
    let settings = ModelSettings::load_from_file(&path).expect("load settings");

    // Assert
    assert!(settings.validating);
    assert!(!settings.lenient_untyped_references);
    assert_eq!(settings.policy(), ValidationPolicy::strict());
}

#[rstest]
fn given_trusted_file_when_applied_to_builder_then_validation_is_skipped() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "validating = false\n");
    let settings = ModelSettings::load_from_file(&path).unwrap();

    // Act
    let account = Account::builder()
        .name(FhirString::of("no status").unwrap())
        .policy(settings.policy())
        .build();

    // Assert
    assert!(account.is_ok());
}

#[rstest]
fn given_malformed_file_when_loading_then_parse_error_names_path() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "validating = \"sometimes\"\n");

    // Act
    let err = ModelSettings::load_from_file(&path).unwrap_err();

    // Assert
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("model.toml"));
}

#[rstest]
fn given_missing_file_when_loading_then_read_error() {
    // Arrange
    let dir = TempDir::new().unwrap();

    // Act
    let err = ModelSettings::load_from_file(&dir.path().join("absent.toml")).unwrap_err();

    // Assert
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[rstest]
fn given_env_override_when_loading_then_env_wins_over_file() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "validating = true\nlenient_untyped_references = true\n");
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("CLINMODEL_VALIDATING", "false");

    // Act
    let settings = ModelSettings::load(Some(&path));
    std::env::remove_var("CLINMODEL_VALIDATING");

    // Assert
    let settings = settings.expect("load settings");
    assert!(!settings.validating);
    assert!(settings.lenient_untyped_references);
}

#[rstest]
fn given_non_boolean_env_value_when_loading_then_environment_error() {
    // Arrange
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("CLINMODEL_VALIDATING", "flase");

    // Act
    let result = ModelSettings::load(None);
    std::env::remove_var("CLINMODEL_VALIDATING");

    // Assert
    assert!(matches!(result, Err(ConfigError::Environment(_))));
}

#[rstest]
fn given_effective_settings_when_shown_then_toml_lists_both_keys() {
    // Act
    let text = ModelSettings::default().to_toml().unwrap();

    // Assert
    assert!(text.contains("validating = true"));
    assert!(text.contains("lenient_untyped_references = true"));
}
