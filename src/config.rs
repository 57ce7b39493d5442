//! Client configuration.
//!
//! Resolved once at startup: built-in defaults, then the optional
//! `~/.vitals/config.yaml`, then `VITALS_*` environment variables.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_FILE, DATA_DIR_NAME, DEFAULT_API_URL, LOG_FILE};

pub const ENV_API_URL: &str = "VITALS_API_URL";
pub const ENV_DATA_DIR: &str = "VITALS_DATA_DIR";
pub const ENV_LOG_FILE: &str = "VITALS_LOG_FILE";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the REST API, without trailing slash
    pub api_url: String,
    /// Holds the session file, config file and default log file
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
}

/// Keys accepted in `config.yaml`; all optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_url: Option<String>,
    log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            log_file: data_dir.join(LOG_FILE),
            data_dir,
        }
    }
}

impl Config {
    /// Load from the process environment and the config file
    pub fn load() -> Result<Self> {
        Self::resolve(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
    }

    /// Resolve with an injectable environment lookup
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = lookup(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let file = read_file_config(&data_dir.join(CONFIG_FILE))?;

        let api_url = lookup(ENV_API_URL)
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = normalize_api_url(&api_url)?;

        let log_file = lookup(ENV_LOG_FILE)
            .map(PathBuf::from)
            .or(file.log_file)
            .unwrap_or_else(|| data_dir.join(LOG_FILE));

        Ok(Config {
            api_url,
            data_dir,
            log_file,
        })
    }

    /// Build a full endpoint URL from a path such as `/auth/login/`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn normalize_api_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed)
        .with_context(|| format!("invalid API URL: {}", raw))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("API URL must use http or https: {}", raw);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_with(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().to_str().unwrap();
        let config = Config::resolve(env_with(&[(ENV_DATA_DIR, data_dir)])).unwrap();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.data_dir, dir.path());
        assert_eq!(config.log_file, dir.path().join(LOG_FILE));
    }

    #[test]
    fn test_file_values_apply() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "api_url: https://health.example.com/api/\nlog_file: /tmp/vitals-test.log\n",
        )
        .unwrap();

        let config =
            Config::resolve(env_with(&[(ENV_DATA_DIR, dir.path().to_str().unwrap())])).unwrap();
        assert_eq!(config.api_url, "https://health.example.com/api");
        assert_eq!(config.log_file, PathBuf::from("/tmp/vitals-test.log"));
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "api_url: https://file.example.com\n").unwrap();

        let config = Config::resolve(env_with(&[
            (ENV_DATA_DIR, dir.path().to_str().unwrap()),
            (ENV_API_URL, "http://127.0.0.1:9000/api"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://127.0.0.1:9000/api");
        assert_eq!(config.endpoint("/auth/login/"), "http://127.0.0.1:9000/api/auth/login/");
    }

    #[test]
    fn test_rejects_bad_url_and_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().to_str().unwrap();

        let bad_scheme = Config::resolve(env_with(&[
            (ENV_DATA_DIR, data_dir),
            (ENV_API_URL, "ftp://example.com"),
        ]));
        assert!(bad_scheme.is_err());

        fs::write(dir.path().join(CONFIG_FILE), "api_ur1: typo\n").unwrap();
        assert!(Config::resolve(env_with(&[(ENV_DATA_DIR, data_dir)])).is_err());
    }

    #[test]
    fn test_empty_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "\n").unwrap();
        let config =
            Config::resolve(env_with(&[(ENV_DATA_DIR, dir.path().to_str().unwrap())])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
