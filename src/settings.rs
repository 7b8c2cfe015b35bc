//! Project settings loaded from TOML
//!
//! Settings supply the defaults that command-line flags override: where
//! templates live, which placeholder failures are tolerated and where output
//! goes. Any key left out of a settings file keeps its built-in value.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::output::DEFAULT_EXTENSION;
use crate::placeholder::PlaceholderPolicy;
use crate::template::{DEFAULT_HEADER, DEFAULT_ROOT};
use crate::RenderConfig;

/// Errors that can occur when loading or parsing settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse settings TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Built-in settings
const DEFAULT_SETTINGS: &str = r#"
[templates]
dir = "templates"
header = "_header.xml"
root = "layout.xml"

[placeholders]
# Replace unresolved tokens with an empty string instead of failing
ignore_missing_args = false
ignore_missing_data = false

[output]
# Output goes to <dir>/<name> unless --output-dir is given
dir = "output"
extension = "touchosc"
"#;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub templates: TemplateSettings,
    #[serde(default)]
    pub placeholders: PlaceholderSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateSettings {
    pub dir: PathBuf,
    pub header: String,
    pub root: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderSettings {
    pub ignore_missing_args: bool,
    pub ignore_missing_data: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub extension: String,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("templates"),
            header: DEFAULT_HEADER.to_string(),
            root: DEFAULT_ROOT.to_string(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_str(DEFAULT_SETTINGS).expect("Default settings should be valid TOML")
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load settings from a TOML string
    pub fn from_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    pub fn policy(&self) -> PlaceholderPolicy {
        PlaceholderPolicy::strict()
            .with_ignore_missing_args(self.placeholders.ignore_missing_args)
            .with_ignore_missing_data(self.placeholders.ignore_missing_data)
    }

    /// Render configuration described by these settings
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig::new()
            .with_templates_dir(&self.templates.dir)
            .with_header_template(&self.templates.header)
            .with_root_template(&self.templates.root)
            .with_policy(self.policy())
    }
}
