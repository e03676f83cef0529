use crate::domain::{EnvironmentSet, TagGrammar, DEFAULT_ENVIRONMENTS};
use crate::error::{Result, TagError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory and the user config directory.
pub const CONFIG_FILE_NAME: &str = "deploy-tagger.toml";

/// Represents the complete configuration for deploy-tagger.
///
/// Contains the environment vocabulary, the remote used for pushes, the
/// service-to-checkout mapping and behavior options.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_environments")]
    pub environments: Vec<String>,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default)]
    pub behavior: BehaviorConfig,
}

/// A service checkout that tags can be managed for.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Project {
    pub name: String,
    pub path: PathBuf,
    #[serde(rename = "type", default = "default_project_type")]
    pub kind: String,
}

/// Configuration for behavior customization.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BehaviorConfig {
    /// Refuse to tag when HEAD differs from the remote branch head
    #[serde(default = "default_true")]
    pub require_synced_remote: bool,
}

fn default_environments() -> Vec<String> {
    DEFAULT_ENVIRONMENTS.iter().map(|e| e.to_string()).collect()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_project_type() -> String {
    "unknown".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        BehaviorConfig {
            require_synced_remote: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            environments: default_environments(),
            remote: default_remote(),
            projects: Vec::new(),
            behavior: BehaviorConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| TagError::config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if EnvironmentSet::new(self.environments.iter().cloned()).is_empty() {
            return Err(TagError::config("at least one environment must be configured"));
        }
        if self.remote.trim().is_empty() {
            return Err(TagError::config("remote name must not be empty"));
        }
        Ok(())
    }

    /// Tag grammar over the configured environments.
    pub fn grammar(&self) -> TagGrammar {
        TagGrammar::new(EnvironmentSet::new(self.environments.iter().cloned()))
    }

    /// Look up a project by service name, ignoring case.
    pub fn find_project(&self, service: &str) -> Option<&Project> {
        self.projects
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(service))
    }

    /// Checkout path for a service, if configured.
    pub fn project_path(&self, service: &str) -> Option<&Path> {
        self.find_project(service).map(|p| p.path.as_path())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `deploy-tagger.toml` in current directory
/// 3. `deploy-tagger.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = match config_path {
        Some(path) => Some(PathBuf::from(path)),
        None => discover_config_file(),
    };

    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            let text = fs::read_to_string(&path).map_err(|e| {
                TagError::config(format!("cannot read {}: {}", path.display(), e))
            })?;
            Config::from_toml(&text)
        }
        None => {
            debug!("no configuration file found, using defaults");
            Ok(Config::default())
        }
    }
}

fn discover_config_file() -> Option<PathBuf> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}
