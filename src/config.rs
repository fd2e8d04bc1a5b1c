use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::env::UnsetVars;
use crate::error::ShellError;

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// User overlay, merged over the defaults when present.
const USER_CONFIG_PATH: &str = "~/.config/treesh/config.toml";

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Deepest tree level the evaluator will enter.
    pub max_depth: usize,
    /// Reading an unset variable defines it as empty.
    pub define_unset_on_read: bool,
    /// Exit status of a child whose program could not be executed.
    pub exec_failure_status: u8,
    /// Status of a command whose redirection target could not be opened.
    pub redirect_failure_status: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: 128,
            define_unset_on_read: true,
            exec_failure_status: 127,
            redirect_failure_status: 1,
        }
    }
}

impl Settings {
    pub fn unset_vars(&self) -> UnsetVars {
        if self.define_unset_on_read {
            UnsetVars::Define
        } else {
            UnsetVars::Leave
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
    /// Log file; `~` is expanded.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "off".into(),
            path: "~/.local/share/treesh/treesh.log".into(),
        }
    }
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    logging: LoggingOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    max_depth: Option<usize>,
    define_unset_on_read: Option<bool>,
    exec_failure_status: Option<u8>,
    redirect_failure_status: Option<u8>,
}

#[derive(Debug, Deserialize, Default)]
struct LoggingOverlay {
    level: Option<String>,
    path: Option<String>,
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Embedded defaults, overlaid with `~/.config/treesh/config.toml` if it
    /// exists. A malformed user file is reported and ignored.
    pub fn load() -> Self {
        let mut config = Self::default_config();
        let path = PathBuf::from(shellexpand::tilde(USER_CONFIG_PATH).as_ref());
        if !path.is_file() {
            return config;
        }
        match Self::read_overlay(&path) {
            Ok(overlay) => config.apply_overlay(overlay),
            Err(e) => eprintln!("treesh: {e}"),
        }
        config
    }

    /// Embedded defaults overlaid with an explicit file. Errors are returned.
    pub fn load_from(path: &Path) -> Result<Self, ShellError> {
        let mut config = Self::default_config();
        config.apply_overlay(Self::read_overlay(path)?);
        Ok(config)
    }

    fn read_overlay(path: &Path) -> Result<ConfigOverlay, ShellError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ShellError::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| ShellError::Config(format!("{}: {e}", path.display())))
    }

    /// Apply an overlay on top of this config: present keys override.
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        let s = overlay.settings;
        if let Some(v) = s.max_depth {
            self.settings.max_depth = v;
        }
        if let Some(v) = s.define_unset_on_read {
            self.settings.define_unset_on_read = v;
        }
        if let Some(v) = s.exec_failure_status {
            self.settings.exec_failure_status = v;
        }
        if let Some(v) = s.redirect_failure_status {
            self.settings.redirect_failure_status = v;
        }

        let l = overlay.logging;
        if let Some(v) = l.level {
            self.logging.level = v;
        }
        if let Some(v) = l.path {
            self.logging.path = v;
        }
    }

    /// The merged configuration as TOML, for `--dump-config`.
    pub fn to_toml(&self) -> Result<String, ShellError> {
        toml::to_string_pretty(self).map_err(|e| ShellError::Config(e.to_string()))
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::default_config();
        assert_eq!(config.settings.max_depth, 128);
        assert!(config.settings.define_unset_on_read);
        assert_eq!(config.settings.exec_failure_status, 127);
        assert_eq!(config.settings.redirect_failure_status, 1);
        assert_eq!(config.logging.level, "off");
    }

    #[test]
    fn embedded_defaults_match_code_defaults() {
        let config = Config::default_config();
        let code = Settings::default();
        assert_eq!(config.settings.max_depth, code.max_depth);
        assert_eq!(
            config.settings.define_unset_on_read,
            code.define_unset_on_read
        );
        assert_eq!(config.logging.path, LoggingConfig::default().path);
    }

    #[test]
    fn unset_policy_follows_setting() {
        let mut settings = Settings::default();
        assert_eq!(settings.unset_vars(), UnsetVars::Define);
        settings.define_unset_on_read = false;
        assert_eq!(settings.unset_vars(), UnsetVars::Leave);
    }

    // ── Merge semantics ──

    #[test]
    fn overlay_overrides_scalars() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [settings]
            max_depth = 8
            define_unset_on_read = false
        "#,
        );
        assert_eq!(config.settings.max_depth, 8);
        assert!(!config.settings.define_unset_on_read);
    }

    #[test]
    fn overlay_omitted_settings_unchanged() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [logging]
            level = "debug"
        "#,
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.settings.max_depth, 128);
        assert_eq!(config.settings.exec_failure_status, 127);
    }

    #[test]
    fn empty_overlay_changes_nothing() {
        let original = Config::default_config();
        let mut config = Config::default_config();
        config.apply_overlay_str("");
        assert_eq!(config.settings.max_depth, original.settings.max_depth);
        assert_eq!(config.logging.path, original.logging.path);
    }

    #[test]
    fn load_from_missing_file_is_an_error() {
        let path = Path::new("/definitely/missing/treesh.toml");
        let err = Config::load_from(path).unwrap_err();
        assert!(matches!(err, ShellError::Config(_)));
    }

    #[test]
    fn load_from_rejects_bad_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings]\nmax_depth = \"deep\"\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ShellError::Config(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings]\nexec_failure_status = 126\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.settings.exec_failure_status, 126);
    }

    #[test]
    fn dump_round_trips_through_toml() {
        let text = Config::default_config().to_toml().unwrap();
        assert!(text.contains("max_depth = 128"));
        let reparsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(reparsed.logging.level, "off");
    }
}
