//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/skilltree/skilltree.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `SKILLTREE_*` prefix, `__` between section and key
//!    (e.g. `SKILLTREE_SCROLL__DELAY_MS=250`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, ScrollBehavior, ScrollBlock, ScrollOptions};
use crate::infrastructure::generators::NameStyle;
use crate::infrastructure::memory_store::DEFAULT_PAGE_SIZE;

const ENV_PREFIX: &str = "SKILLTREE";

/// Scroll-to-selection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScrollSettings {
    /// Delay between rendering a new selection and scrolling to it
    pub delay_ms: u64,
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            delay_ms: 500,
            behavior: ScrollBehavior::Smooth,
            block: ScrollBlock::Nearest,
        }
    }
}

/// Display-name generation for new nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NameSettings {
    pub separator: String,
    pub style: NameStyle,
}

impl Default for NameSettings {
    fn default() -> Self {
        Self {
            separator: " ".into(),
            style: NameStyle::Capital,
        }
    }
}

/// Tree store settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreSettings {
    /// Children handed out per load-more request
    pub page_size: usize,
    /// Tree file used when `--tree` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            data_file: None,
        }
    }
}

/// Raw scroll section (all optional to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawScrollSettings {
    pub delay_ms: Option<u64>,
    pub behavior: Option<ScrollBehavior>,
    pub block: Option<ScrollBlock>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawNameSettings {
    pub separator: Option<String>,
    pub style: Option<NameStyle>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawStoreSettings {
    pub page_size: Option<usize>,
    pub data_file: Option<PathBuf>,
}

/// Raw settings for intermediate parsing of one config file.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub scroll: RawScrollSettings,
    pub names: RawNameSettings,
    pub store: RawStoreSettings,
}

/// Unified configuration for skilltree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub scroll: ScrollSettings,
    pub names: NameSettings,
    pub store: StoreSettings,
}

/// Get the XDG config directory for skilltree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "skilltree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("skilltree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}`; unresolvable input is kept as is.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Scroll delay as a duration.
    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll.delay_ms)
    }

    pub fn scroll_options(&self) -> ScrollOptions {
        ScrollOptions {
            behavior: self.scroll.behavior,
            block: self.scroll.block,
        }
    }

    fn expand_paths(&mut self) {
        if let Some(path) = self.store.data_file.as_deref() {
            self.store.data_file = Some(expand_path(path));
        }
    }

    /// Overlay a config file: values it specifies win, the rest is kept.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            scroll: ScrollSettings {
                delay_ms: overlay.scroll.delay_ms.unwrap_or(self.scroll.delay_ms),
                behavior: overlay.scroll.behavior.unwrap_or(self.scroll.behavior),
                block: overlay.scroll.block.unwrap_or(self.scroll.block),
            },
            names: NameSettings {
                separator: overlay
                    .names
                    .separator
                    .clone()
                    .unwrap_or_else(|| self.names.separator.clone()),
                style: overlay.names.style.unwrap_or(self.names.style),
            },
            store: StoreSettings {
                page_size: overlay.store.page_size.unwrap_or(self.store.page_size),
                data_file: overlay
                    .store
                    .data_file
                    .clone()
                    .or_else(|| self.store.data_file.clone()),
            },
        }
    }

    /// Load settings with layered precedence from the real environment.
    ///
    /// # Arguments
    /// * `explicit` - Config file given on the command line; must exist
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_with(global_config_path().as_deref(), explicit, None)
    }

    /// Load settings from the given layers.
    ///
    /// `env_vars` replaces the process environment when given (keys keep their
    /// `SKILLTREE_` prefix).
    pub fn load_with(
        global: Option<&Path>,
        explicit: Option<&Path>,
        env_vars: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config, skipped when absent
        if let Some(global_path) = global.filter(|p| p.exists()) {
            debug!(path = %global_path.display(), "applying global config");
            current = current.merge_with(&load_raw_settings(global_path)?);
        }

        // 3. Explicit config file
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            debug!(path = %path.display(), "applying config file");
            current = current.merge_with(&load_raw_settings(path)?);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current, env_vars)?;

        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Apply SKILLTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(
        mut settings: Self,
        env_vars: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env_vars),
            )
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_value(&config, "scroll.delay_ms")? {
            settings.scroll.delay_ms = val;
        }
        if let Some(val) = env_value(&config, "scroll.behavior")? {
            settings.scroll.behavior = val;
        }
        if let Some(val) = env_value(&config, "scroll.block")? {
            settings.scroll.block = val;
        }
        if let Some(val) = env_value(&config, "names.separator")? {
            settings.names.separator = val;
        }
        if let Some(val) = env_value(&config, "names.style")? {
            settings.names.style = val;
        }
        if let Some(val) = env_value(&config, "store.page_size")? {
            settings.store.page_size = val;
        }
        if let Some(val) = env_value::<String>(&config, "store.data_file")? {
            settings.store.data_file = Some(PathBuf::from(val));
        }
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.store.page_size == 0 {
            return Err(ApplicationError::Config {
                message: "store.page_size must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# skilltree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/skilltree/skilltree.toml
#   File:   --config <file>
#   Env:    SKILLTREE_* environment variables, e.g. SKILLTREE_SCROLL__DELAY_MS=250

[scroll]
# Milliseconds between showing a new selection and scrolling to it
# delay_ms = 500
# smooth | instant | auto
# behavior = "smooth"
# start | center | end | nearest
# block = "nearest"

[names]
# Between color and animal in generated names ("Blue Fox")
# separator = " "
# capital | lower | upper
# style = "capital"

[store]
# Children loaded per "load more"
# page_size = 10
# Tree file used when --tree is not given (~ and $VAR are expanded)
# data_file = "~/skills/tree.json"
"#
        .to_string()
    }
}

/// Reads one override; absent keys are `None`, malformed values are errors.
fn env_value<T: DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load_with(None, None, vars(&[])).expect("load defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.scroll_delay(), Duration::from_millis(500));
        assert_eq!(settings.scroll_options(), ScrollOptions::default());
    }

    #[test]
    fn given_global_and_explicit_files_when_loading_then_explicit_wins() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        let explicit = dir.path().join("explicit.toml");
        fs::write(&global, "[scroll]\ndelay_ms = 100\nblock = \"center\"\n").unwrap();
        fs::write(&explicit, "[scroll]\ndelay_ms = 200\n").unwrap();

        let settings = Settings::load_with(Some(&global), Some(&explicit), vars(&[])).unwrap();

        assert_eq!(settings.scroll.delay_ms, 200);
        assert_eq!(settings.scroll.block, ScrollBlock::Center);
        assert_eq!(settings.names, NameSettings::default());
    }

    #[test]
    fn given_env_override_when_loading_then_replaces_file_value() {
        let dir = TempDir::new().unwrap();
        let explicit = dir.path().join("explicit.toml");
        fs::write(&explicit, "[store]\npage_size = 3\n").unwrap();

        let settings = Settings::load_with(
            None,
            Some(&explicit),
            vars(&[
                ("SKILLTREE_STORE__PAGE_SIZE", "7"),
                ("SKILLTREE_NAMES__STYLE", "upper"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.store.page_size, 7);
        assert_eq!(settings.names.style, NameStyle::Upper);
    }

    #[test]
    fn given_malformed_env_value_when_loading_then_errors() {
        let result = Settings::load_with(None, None, vars(&[("SKILLTREE_SCROLL__DELAY_MS", "soon")]));
        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_missing_explicit_file_when_loading_then_errors() {
        let result = Settings::load_with(None, Some(Path::new("/nonexistent/skilltree.toml")), vars(&[]));
        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_zero_page_size_when_loading_then_errors() {
        let result = Settings::load_with(None, None, vars(&[("SKILLTREE_STORE__PAGE_SIZE", "0")]));
        assert!(result.is_err());
    }

    #[test]
    fn given_tilde_in_data_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings::default();
        settings.store.data_file = Some(PathBuf::from("~/skills/tree.json"));

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let data_file = settings.store.data_file.unwrap();
        assert!(data_file.to_string_lossy().starts_with(&home));
        assert!(!data_file.to_string_lossy().contains('~'));
    }

    #[test]
    fn given_settings_when_to_toml_then_parses_back() {
        let mut settings = Settings::default();
        settings.scroll.behavior = ScrollBehavior::Instant;
        let toml_str = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let parsed: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(parsed.scroll.delay_ms.is_none());
    }
}
