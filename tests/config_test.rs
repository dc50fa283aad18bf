//! Tests for YAML configuration loading and parsing

use api_surface_diff::compat::CompareOptions;
use std::io::Write;

#[test]
fn test_load_yaml_config() {
    let yaml_content = r#"
compare:
  type_name_filter: "*Service"
  member_name_filter: "Get*|Set*"
  breaking_changes_only: true
  max_changes_per_category: 25
"#;

    let config = CompareOptions::from_yaml_str(yaml_content).unwrap();

    assert_eq!(config.type_name_filter.as_deref(), Some("*Service"));
    assert_eq!(config.member_name_filter.as_deref(), Some("Get*|Set*"));
    assert!(config.breaking_changes_only);
    assert_eq!(config.max_changes_per_category, 25);
}

#[test]
fn test_load_minimal_yaml_config() {
    let yaml_content = r#"
compare:
  breaking_changes_only: true
"#;

    let config = CompareOptions::from_yaml_str(yaml_content).unwrap();

    assert!(config.breaking_changes_only);
    assert!(config.type_name_filter.is_none());
    assert!(config.member_name_filter.is_none());
    assert_eq!(config.max_changes_per_category, 100);
}

#[test]
fn test_load_empty_yaml_config() {
    let yaml_content = r#"
other_tool:
  enabled: true
"#;

    let config = CompareOptions::from_yaml_str(yaml_content).unwrap();

    // Should use default values
    assert_eq!(config, CompareOptions::default());
}

#[test]
fn test_malformed_yaml_config() {
    let yaml_content = r#"
compare:
  max_changes_per_category: lots
"#;

    assert!(CompareOptions::from_yaml_str(yaml_content).is_err());
}

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "compare:\n  type_name_filter: \"Widget?\"").unwrap();

    let config = CompareOptions::from_yaml_file(file.path()).unwrap();

    assert_eq!(config.type_name_filter.as_deref(), Some("Widget?"));
    assert!(!config.breaking_changes_only);
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(CompareOptions::from_yaml_file(dir.path().join("absent.yaml")).is_err());
}
