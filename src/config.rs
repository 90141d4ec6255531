//! Configuration for casebridge.
//!
//! Loaded once at startup from YAML and passed by value into the clients and
//! the reconciler. Nothing is reloaded at runtime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::{RepoRef, Severity};
use crate::error::{BridgeError, Result};
use crate::logging::LogFormat;

/// Environment fallback for an empty `kibana.api_key`
pub const KIBANA_API_KEY_ENV: &str = "KIBANA_API_KEY";

/// Environment fallback for an empty `gitea.api_key`
pub const GITEA_API_KEY_ENV: &str = "GITEA_API_KEY";

pub const DEFAULT_SEARCH_TAG: &str = "search";
pub const DEFAULT_SUCCESS_TAG: &str = "Gitea ✓";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    /// Log line template, see `LogFormat`
    pub log_format: Option<String>,
    /// Append logs here instead of stderr
    pub log_file: Option<PathBuf>,
    pub kibana: KibanaConfig,
    pub gitea: GiteaConfig,
    /// Tag marking a case as pending
    pub search_tag: String,
    /// Tag marking a case as processed
    pub success_tag: String,
    /// Seconds between polling cycles
    pub search_interval: u64,
    /// Severity -> issue label id
    pub severity_labels: BTreeMap<Severity, u64>,
    /// File this config was read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KibanaConfig {
    pub url: String,
    pub api_key: String,
    pub verify_ssl: bool,
    /// Owning solution used when posting comments
    pub case_owner: String,
    pub page_size: u32,
    pub timeout_secs: u64,
}

impl Default for KibanaConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            verify_ssl: true,
            case_owner: "securitySolution".to_string(),
            page_size: 100,
            timeout_secs: 30,
        }
    }
}

impl KibanaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GiteaConfig {
    pub url: String,
    pub api_key: String,
    pub verify_ssl: bool,
    /// Organization or user owning the target repository
    pub owner: String,
    pub repo: String,
    pub timeout_secs: u64,
}

impl Default for GiteaConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            verify_ssl: true,
            owner: String::new(),
            repo: String::new(),
            timeout_secs: 30,
        }
    }
}

impl GiteaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn repo_ref(&self) -> RepoRef {
        RepoRef::new(&self.owner, &self.repo)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            log_format: None,
            log_file: None,
            kibana: KibanaConfig::default(),
            gitea: GiteaConfig::default(),
            search_tag: DEFAULT_SEARCH_TAG.to_string(),
            success_tag: DEFAULT_SUCCESS_TAG.to_string(),
            search_interval: 60,
            severity_labels: BTreeMap::new(),
            source: None,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. ./casebridge.yml
    /// 3. ~/.config/casebridge/casebridge.yml
    ///
    /// Unlike most tools there are no usable defaults (URLs and keys are
    /// required), so finding no file is an error. The result is validated
    /// and has API keys resolved from the environment where left empty.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::locate_and_read(config_path)?;
        config.resolve_api_keys();
        config.validate()?;
        Ok(config)
    }

    fn locate_and_read(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let project_name = env!("CARGO_PKG_NAME");

        let local_config = PathBuf::from(format!("{}.yml", project_name));
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                return Self::load_from_file(&primary_config);
            }
        }

        Err(BridgeError::Configuration(format!(
            "no config file found (tried ./{0}.yml and ~/.config/{0}/{0}.yml)",
            project_name
        )))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let mut config = Self::from_yaml(&content)?;
        config.source = Some(path.as_ref().to_path_buf());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Fill empty API keys from `KIBANA_API_KEY` / `GITEA_API_KEY`
    pub fn resolve_api_keys(&mut self) {
        self.resolve_api_keys_with(|name| std::env::var(name).ok());
    }

    /// Fill empty API keys through `lookup`, which maps a variable name to its value
    pub fn resolve_api_keys_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.kibana.api_key.is_empty() {
            if let Some(key) = lookup(KIBANA_API_KEY_ENV) {
                self.kibana.api_key = key;
            }
        }
        if self.gitea.api_key.is_empty() {
            if let Some(key) = lookup(GITEA_API_KEY_ENV) {
                self.gitea.api_key = key;
            }
        }
    }

    /// Reject configurations the bridge cannot run with
    pub fn validate(&self) -> Result<()> {
        check_url("kibana.url", &self.kibana.url)?;
        check_url("gitea.url", &self.gitea.url)?;

        if self.kibana.api_key.trim().is_empty() {
            return Err(BridgeError::Configuration(format!(
                "kibana.api_key is empty and {} is not set",
                KIBANA_API_KEY_ENV
            )));
        }
        if self.gitea.api_key.trim().is_empty() {
            return Err(BridgeError::Configuration(format!(
                "gitea.api_key is empty and {} is not set",
                GITEA_API_KEY_ENV
            )));
        }
        if self.gitea.owner.trim().is_empty() || self.gitea.repo.trim().is_empty() {
            return Err(BridgeError::Configuration(
                "gitea.owner and gitea.repo must both be set".to_string(),
            ));
        }
        if self.search_tag.trim().is_empty() || self.success_tag.trim().is_empty() {
            return Err(BridgeError::Configuration(
                "search_tag and success_tag must not be empty".to_string(),
            ));
        }
        if self.search_tag == self.success_tag {
            return Err(BridgeError::Configuration(format!(
                "search_tag and success_tag are both '{}'",
                self.search_tag
            )));
        }
        if self.search_interval == 0 {
            return Err(BridgeError::Configuration("search_interval must be at least 1 second".to_string()));
        }
        if self.kibana.page_size == 0 {
            return Err(BridgeError::Configuration("kibana.page_size must be at least 1".to_string()));
        }
        if let Some(template) = &self.log_format {
            LogFormat::new(template.as_str())?;
        }
        Ok(())
    }

    /// Problems that do not stop the bridge but deserve a warning once logging is up
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.severity_labels.is_empty() {
            warnings.push("severity_labels is empty, every case will be skipped".to_string());
        }
        warnings
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.search_interval)
    }
}

fn check_url(field: &str, url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else if url.is_empty() {
        Err(BridgeError::Configuration(format!("{} is required", field)))
    } else {
        Err(BridgeError::Configuration(format!(
            "{} must start with http:// or https:// (got '{}')",
            field, url
        )))
    }
}
