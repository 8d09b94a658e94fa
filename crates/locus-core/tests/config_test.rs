use locus_core::config::loader::{ConfigError, ConfigLoader};
use locus_core::config::schema::{LocusConfig, SelectorConfig};
use locus_core::Format;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
selectors:
  enable_aria_label: true
  test_id: data-qa
default_format: css
    "#
    )
    .unwrap();

    let config = ConfigLoader::load_from(file.path()).expect("Failed to load config from file");

    assert!(config.selectors.enable_aria_label);
    assert!(!config.selectors.enable_aria_role);
    assert_eq!(config.selectors.test_id.as_deref(), Some("data-qa"));
    assert_eq!(config.default_format, Some(Format::Css));
}

#[test]
fn test_partial_file_uses_defaults() {
    let config = ConfigLoader::parse("selectors:\n  enable_aria_role: true\n").unwrap();
    assert!(config.selectors.enable_aria_role);
    assert!(!config.selectors.enable_aria_label);
    assert!(config.selectors.test_id.is_none());
    assert!(config.default_format.is_none());
}

#[test]
fn test_empty_mapping_is_default() {
    let config = ConfigLoader::parse("{}").unwrap();
    assert_eq!(config.selectors, SelectorConfig::default());
}

#[test]
fn test_default_values() {
    let config = LocusConfig::default();
    assert!(!config.selectors.enable_aria_label);
    assert!(config.selectors.test_id.is_none());
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[test]
fn test_load_from_nonexistent_file() {
    let result = ConfigLoader::load_from(std::path::Path::new("/nonexistent/path/locus.yaml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_invalid_yaml() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "selectors: [not, a, mapping").unwrap();

    let result = ConfigLoader::load_from(file.path());
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_unknown_format_is_rejected() {
    let result = ConfigLoader::parse("default_format: json\n");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}
