use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::cli::Cli;
use crate::discovery::DEFAULT_EXCLUDED_DIRECTORIES;
use crate::error::ScanError;

pub const DEFAULT_BASE_URI: &str = "https://api.soos.io/api/";
pub const DEFAULT_INTEGRATION_NAME: &str = "Azure DevOps Pipeline";
pub const DEFAULT_INTEGRATION_TYPE: &str = "CI";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;

/// Root configuration structure, deserialized from `.soos-scan/config.toml`.
///
/// Every value is optional; pipeline inputs win over the file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScanConfig {
    pub client_id: Option<String>,
    pub project: Option<String>,
    pub base_uri: Option<String>,
    pub integration_name: Option<String>,
    pub integration_type: Option<String>,
    pub operating_environment: Option<String>,
    pub wait_for_scan: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DiscoveryConfig {
    /// Directory globs never searched. Replaces the built-in list.
    #[serde(default = "default_exclusions")]
    pub exclude: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        DiscoveryConfig {
            exclude: default_exclusions(),
        }
    }
}

fn default_exclusions() -> Vec<String> {
    DEFAULT_EXCLUDED_DIRECTORIES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
    /// Status checks before giving up. Unlimited when absent.
    pub max_attempts: Option<u32>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        PollingConfig {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_attempts: None,
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Load the configuration file, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.soos-scan/config.toml`
/// 3. `~/.config/soos-scan/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        let content = std::fs::read_to_string(path)?;
        return Ok(toml::from_str(&content)?);
    }

    let project_config = project_path.join(".soos-scan").join("config.toml");
    if project_config.exists() {
        let content = std::fs::read_to_string(&project_config)?;
        return Ok(toml::from_str(&content)?);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("soos-scan").join("config.toml");
        if home_config.exists() {
            let content = std::fs::read_to_string(&home_config)?;
            return Ok(toml::from_str(&content)?);
        }
    }

    Ok(Config::default())
}

/// Polling behaviour while waiting for a scan to finish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        PollSettings {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: None,
        }
    }
}

/// Fully resolved inputs for one run. Built once, never mutated.
#[derive(Clone)]
pub struct TaskParameters {
    pub client_id: String,
    pub api_key: String,
    pub project: String,
    pub base_uri: String,
    pub path: PathBuf,
    pub commit_hash: Option<String>,
    pub branch: Option<String>,
    pub build_version: Option<String>,
    pub build_uri: Option<String>,
    pub branch_uri: Option<String>,
    pub integration_name: String,
    pub integration_type: String,
    pub operating_environment: String,
    pub excluded_dirs: Vec<String>,
    pub wait_for_scan: bool,
    pub polling: PollSettings,
}

impl std::fmt::Debug for TaskParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskParameters")
            .field("client_id", &self.client_id)
            .field("api_key", &"<redacted>")
            .field("project", &self.project)
            .field("base_uri", &self.base_uri)
            .field("path", &self.path)
            .field("commit_hash", &self.commit_hash)
            .field("branch", &self.branch)
            .field("build_version", &self.build_version)
            .field("build_uri", &self.build_uri)
            .field("branch_uri", &self.branch_uri)
            .field("integration_name", &self.integration_name)
            .field("integration_type", &self.integration_type)
            .field("operating_environment", &self.operating_environment)
            .field("excluded_dirs", &self.excluded_dirs)
            .field("wait_for_scan", &self.wait_for_scan)
            .field("polling", &self.polling)
            .finish()
    }
}

impl TaskParameters {
    /// Merge pipeline inputs over the config file over built-in defaults.
    ///
    /// Fails with [`ScanError::MissingInput`] before any network activity when a
    /// required value is absent.
    pub fn resolve(cli: &Cli, config: Config) -> std::result::Result<Self, ScanError> {
        let Config {
            scan,
            discovery,
            polling,
        } = config;

        let client_id = input(&cli.client_id)
            .or(non_empty(scan.client_id))
            .ok_or(ScanError::MissingInput("clientId"))?;
        let api_key = input(&cli.api_key).ok_or(ScanError::MissingInput("apiKey"))?;
        let project = input(&cli.project)
            .or(non_empty(scan.project))
            .ok_or(ScanError::MissingInput("project"))?;

        let mut excluded_dirs = discovery.exclude;
        excluded_dirs.extend(
            cli.exclude_dirs
                .iter()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        );

        Ok(TaskParameters {
            client_id,
            api_key,
            project,
            base_uri: input(&cli.base_uri)
                .or(non_empty(scan.base_uri))
                .unwrap_or_else(|| DEFAULT_BASE_URI.to_string()),
            path: cli
                .path
                .clone()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| PathBuf::from(".")),
            commit_hash: input(&cli.commit_hash),
            branch: input(&cli.branch),
            build_version: input(&cli.build_version),
            build_uri: input(&cli.build_uri),
            branch_uri: input(&cli.branch_uri),
            integration_name: input(&cli.integration_name)
                .or(non_empty(scan.integration_name))
                .unwrap_or_else(|| DEFAULT_INTEGRATION_NAME.to_string()),
            integration_type: input(&cli.integration_type)
                .or(non_empty(scan.integration_type))
                .unwrap_or_else(|| DEFAULT_INTEGRATION_TYPE.to_string()),
            operating_environment: input(&cli.operating_environment)
                .or(non_empty(scan.operating_environment))
                .unwrap_or_else(|| operating_environment().to_string()),
            excluded_dirs,
            wait_for_scan: cli.wait_for_scan.or(scan.wait_for_scan).unwrap_or(false),
            polling: PollSettings {
                interval: Duration::from_millis(polling.interval_ms),
                // A cap of 0 means no cap.
                max_attempts: cli
                    .max_poll_attempts
                    .or(polling.max_attempts)
                    .filter(|&max| max > 0),
            },
        })
    }
}

/// Pipeline agents export unset optional inputs as empty strings.
fn input(value: &Option<String>) -> Option<String> {
    non_empty(value.clone())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Host OS family as the service names it.
pub fn operating_environment() -> &'static str {
    match std::env::consts::OS {
        "windows" => "Windows",
        "macos" => "MacOS",
        _ => "Linux",
    }
}
