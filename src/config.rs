//! Configuration
//!
//! `.forgepoint.toml` loading plus the CLI flag merge. Every field has
//! a default, so a missing file or an empty file both yield the stock
//! configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".forgepoint.toml";

/// Stock configuration file written by `init`.
pub const DEFAULT_CONFIG_TEXT: &str = r#"# Forgepoint linter configuration.

# Directory or file of extra type schemas. The built-in catalogue is
# used when absent.
#schema_path = "schemas"

# Glob patterns excluded from corpus discovery.
exclude = []

[rules]
require_id = true
enforce_structure = true
validate_references = true
check_id_uniqueness = true

[output]
format = "text"
verbose = false
"#;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<PathBuf>,
    pub exclude: Vec<String>,
    pub rules: Rules,
    pub output: OutputConfig,
}

/// Component gates. A disabled rule removes the whole component: it
/// contributes zero diagnostics, warnings included.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct Rules {
    pub require_id: bool,
    pub enforce_structure: bool,
    pub validate_references: bool,
    pub check_id_uniqueness: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            require_id: true,
            enforce_structure: true,
            validate_references: true,
            check_id_uniqueness: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Junit,
}

impl Config {
    /// Resolve the configuration: an explicit `--config` path must exist;
    /// otherwise `.forgepoint.toml` in the working directory is used when
    /// present, and defaults apply when it is not.
    ///
    /// # Errors
    ///
    /// Fails on a missing explicit path or a malformed file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("configuration file {} not found", path.display());
                }
                Self::from_file(path)
            }
            None => {
                let default = Path::new(CONFIG_FILE_NAME);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    debug!("no {CONFIG_FILE_NAME} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("parsing configuration {}", path.display()))?;
        debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Render the resolved configuration as TOML for `config --show`.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.rules.require_id);
        assert!(config.rules.check_id_uniqueness);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn test_default_config_text_parses_to_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TEXT).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
exclude = ["drafts/**"]

[rules]
validate_references = false
"#,
        )
        .unwrap();
        assert_eq!(config.exclude, vec!["drafts/**".to_string()]);
        assert!(!config.rules.validate_references);
        assert!(config.rules.require_id);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<Config, _> = toml::from_str("unknown_key = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let err = Config::load(Some(Path::new("/nonexistent/forgepoint.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[output]\nformat = \"json\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);
    }
}
