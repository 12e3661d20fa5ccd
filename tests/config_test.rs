//! Integration tests for Settings layered loading.
//!
//! These tests pass explicit global/config paths and an explicit environment
//! map, so neither the developer's config directory nor the process
//! environment leaks in.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use skilltree::application::{ApplicationError, ScrollBehavior, ScrollBlock};
use skilltree::config::Settings;
use skilltree::infrastructure::generators::NameStyle;

fn write_toml(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write config");
    path
}

fn no_env() -> Option<HashMap<String, String>> {
    Some(HashMap::new())
}

#[test]
fn given_global_config_when_loading_then_overrides_only_specified_fields() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let global = write_toml(
        &dir,
        "skilltree.toml",
        r#"
[scroll]
behavior = "instant"

[names]
style = "lower"
separator = "-"
"#,
    );

    // Act
    let settings = Settings::load_with(Some(&global), None, no_env()).unwrap();

    // Assert
    assert_eq!(settings.scroll.behavior, ScrollBehavior::Instant);
    assert_eq!(settings.scroll.block, ScrollBlock::Nearest);
    assert_eq!(settings.scroll.delay_ms, 500);
    assert_eq!(settings.names.style, NameStyle::Lower);
    assert_eq!(settings.names.separator, "-");
    assert_eq!(settings.store.page_size, 10);
}

#[test]
fn given_missing_global_file_when_loading_then_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    let settings = Settings::load_with(Some(&missing), None, no_env()).unwrap();

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_all_layers_when_loading_then_env_beats_file_beats_global() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let global = write_toml(&dir, "global.toml", "[store]\npage_size = 3\n[scroll]\ndelay_ms = 50\n");
    let explicit = write_toml(&dir, "local.toml", "[store]\npage_size = 4\n");
    let env = HashMap::from([(
        "SKILLTREE_SCROLL__DELAY_MS".to_string(),
        "75".to_string(),
    )]);

    // Act
    let settings = Settings::load_with(Some(&global), Some(&explicit), Some(env)).unwrap();

    // Assert
    assert_eq!(settings.store.page_size, 4);
    assert_eq!(settings.scroll.delay_ms, 75);
}

#[test]
fn given_data_file_with_env_var_when_loading_then_expands_it() {
    let dir = TempDir::new().unwrap();
    let explicit = write_toml(&dir, "local.toml", "[store]\ndata_file = \"$HOME/skills.json\"\n");

    let settings = Settings::load_with(None, Some(&explicit), no_env()).unwrap();

    let home = std::env::var("HOME").expect("HOME should be set");
    assert_eq!(
        settings.store.data_file,
        Some(PathBuf::from(format!("{home}/skills.json")))
    );
}

#[test]
fn given_invalid_toml_when_loading_then_reports_config_error() {
    let dir = TempDir::new().unwrap();
    let explicit = write_toml(&dir, "broken.toml", "[scroll\ndelay_ms = ");

    let result = Settings::load_with(None, Some(&explicit), no_env());

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_unknown_enum_value_when_loading_then_reports_config_error() {
    let dir = TempDir::new().unwrap();
    let explicit = write_toml(&dir, "bad.toml", "[scroll]\nblock = \"top\"\n");

    let result = Settings::load_with(None, Some(&explicit), no_env());

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}
