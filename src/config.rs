use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration
///
/// Resolved once at startup: package defaults overridden by an optional
/// user TOML file. Unknown keys are rejected rather than silently ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub project: ProjectConfig,
    pub eligibility: EligibilityConfig,
    pub apps: AppsConfig,
    /// Display group name -> module-path prefixes documented elsewhere.
    /// Used to collapse members owned by known framework layers in the
    /// rendered view and to skip those modules during discovery.
    pub known_apps: BTreeMap<String, Vec<String>>,
    pub output: OutputConfig,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub name: String,
    pub description: Option<String>,
}

/// Which classes are documentable
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EligibilityConfig {
    /// Module-path prefixes that mark a class as part of this project
    pub bases: Vec<String>,
    /// Fully-qualified class paths that are always documented
    pub include: Vec<String>,
    /// Fully-qualified class paths that are never documented
    pub exclude: Vec<String>,
    /// Module names scanned inside each application ("models", "forms", ...)
    pub module_types: Vec<String>,
}

/// Configured applications
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppsConfig {
    /// Applications installed in the host project
    pub installed: Vec<String>,
    /// Additional applications to scan that are not installed
    pub extra: Vec<String>,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub directory: PathBuf,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Untitled Project".to_string(),
            description: None,
        }
    }
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            bases: vec![],
            include: vec![],
            exclude: vec![],
            module_types: vec![
                "models".to_string(),
                "views".to_string(),
                "forms".to_string(),
            ],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            directory: PathBuf::from("output"),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(&mut self, output: Option<PathBuf>, format: Option<String>) {
        if let Some(out) = output {
            self.output.directory = out;
        }

        if let Some(fmt) = format {
            self.output.format = match fmt.as_str() {
                "json" => OutputFormat::Json,
                _ => OutputFormat::Html,
            };
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.eligibility.module_types.is_empty() {
            return Err(Error::config_validation("module_types must not be empty"));
        }

        if self.eligibility.bases.iter().any(|b| b.is_empty()) {
            return Err(Error::config_validation("eligibility bases cannot be empty strings"));
        }

        for (group, prefixes) in &self.known_apps {
            if prefixes.is_empty() {
                return Err(Error::config_validation(format!(
                    "known_apps group '{}' has no module prefixes",
                    group
                )));
            }
        }

        Ok(())
    }

    /// All configured applications: installed plus explicitly added ones
    pub fn applications(&self) -> Vec<&str> {
        self.apps
            .installed
            .iter()
            .chain(self.apps.extra.iter())
            .map(String::as_str)
            .collect()
    }
}
