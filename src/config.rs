//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.survey-analytics.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".survey-analytics.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Aggregation settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Number and date formatting for exports.
    #[serde(default)]
    pub format: FormatConfig,

    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Output format used when `--format` is not given.
    #[serde(default = "default_format")]
    pub default_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            default_format: default_format(),
        }
    }
}

fn default_format() -> String {
    "json".to_string()
}

/// Aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Locale for localized titles and option texts.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Question types listed answer by answer.
    #[serde(default = "default_list_types")]
    pub list_types: Vec<String>,

    /// Input types that keep a text question charted.
    #[serde(default = "default_numeric_input_types")]
    pub numeric_input_types: Vec<String>,

    /// Label for `true` when a question sets no `labelTrue`.
    #[serde(default = "default_true_label")]
    pub boolean_true_label: String,

    /// Label for `false` when a question sets no `labelFalse`.
    #[serde(default = "default_false_label")]
    pub boolean_false_label: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            list_types: default_list_types(),
            numeric_input_types: default_numeric_input_types(),
            boolean_true_label: default_true_label(),
            boolean_false_label: default_false_label(),
        }
    }
}

fn default_locale() -> String {
    "id".to_string()
}

fn default_list_types() -> Vec<String> {
    vec!["text", "comment"].into_iter().map(String::from).collect()
}

fn default_numeric_input_types() -> Vec<String> {
    vec!["number", "range"].into_iter().map(String::from).collect()
}

fn default_true_label() -> String {
    "Ya".to_string()
}

fn default_false_label() -> String {
    "Tidak".to_string()
}

/// Locale-dependent formatting for exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: String,

    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: String,

    /// Offset of the report timezone from UTC.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,

    /// `chrono` pattern for the generation timestamp.
    #[serde(default = "default_timestamp_pattern")]
    pub timestamp_pattern: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            decimal_separator: default_decimal_separator(),
            thousands_separator: default_thousands_separator(),
            utc_offset_minutes: default_utc_offset(),
            timestamp_pattern: default_timestamp_pattern(),
        }
    }
}

fn default_decimal_separator() -> String {
    ",".to_string()
}

fn default_thousands_separator() -> String {
    ".".to_string()
}

fn default_utc_offset() -> i32 {
    7 * 60 // WIB
}

fn default_timestamp_pattern() -> String {
    "%d-%m-%Y %H:%M".to_string()
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Application name printed in document footers.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Prefix of generated export file names.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_app_name() -> String {
    "Survey Analytics".to_string()
}

fn default_file_prefix() -> String {
    "analitik".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref locale) = args.locale {
            self.analytics.locale = locale.clone();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analytics.locale, "id");
        assert_eq!(config.analytics.boolean_true_label, "Ya");
        assert_eq!(config.format.decimal_separator, ",");
        assert_eq!(config.format.utc_offset_minutes, 420);
        assert!(config.analytics.list_types.contains(&"comment".to_string()));
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true
default_format = "html"

[analytics]
locale = "en"
boolean_true_label = "Yes"

[format]
decimal_separator = "."
thousands_separator = ","
utc_offset_minutes = 0
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.general.default_format, "html");
        assert_eq!(config.analytics.locale, "en");
        assert_eq!(config.analytics.boolean_true_label, "Yes");
        assert_eq!(config.analytics.boolean_false_label, "Tidak");
        assert_eq!(config.format.decimal_separator, ".");
        assert_eq!(config.format.utc_offset_minutes, 0);
        assert_eq!(config.export.file_prefix, "analitik");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[analytics]"));
        assert!(toml_str.contains("[format]"));
        assert!(toml_str.contains("[export]"));
    }

    #[test]
    fn test_load_from_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Config::load_from_dir(temp_dir.path()).unwrap().is_none());

        std::fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "[export]\napp_name = \"Portal Survei\"\n",
        )
        .unwrap();
        let config = Config::load_from_dir(temp_dir.path()).unwrap().unwrap();
        assert_eq!(config.export.app_name, "Portal Survei");

        std::fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "[export\n").unwrap();
        assert!(Config::load_from_dir(temp_dir.path()).is_err());
    }
}
