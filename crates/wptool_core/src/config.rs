use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::query::{DEFAULT_LANG, DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};
use crate::render::DEFAULT_WRAP_WIDTH;

pub const DEFAULT_CONFIG_PATH: &str = ".wptool/config.toml";

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct WptoolConfig {
    #[serde(default)]
    pub query: QuerySection,
    #[serde(default)]
    pub render: RenderSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct QuerySection {
    pub lang: Option<String>,
    pub wiki: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct RenderSection {
    pub wrap_width: Option<usize>,
}

impl WptoolConfig {
    /// Resolve the language code: env WPTOOL_LANG > config > DEFAULT_LANG.
    pub fn lang(&self) -> String {
        env_string("WPTOOL_LANG")
            .or_else(|| self.query.lang.clone())
            .unwrap_or_else(|| DEFAULT_LANG.to_string())
    }

    pub fn wiki(&self) -> Option<String> {
        env_string("WPTOOL_WIKI").or_else(|| self.query.wiki.clone())
    }

    /// Resolve user agent: env WPTOOL_USER_AGENT > config > DEFAULT_USER_AGENT.
    pub fn user_agent(&self) -> String {
        env_string("WPTOOL_USER_AGENT")
            .or_else(|| self.query.user_agent.clone())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    /// Resolve request timeout: env WPTOOL_HTTP_TIMEOUT_MS > config > default.
    pub fn timeout(&self) -> Duration {
        let millis = env_parsed::<u64>("WPTOOL_HTTP_TIMEOUT_MS")
            .or(self.query.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        Duration::from_millis(millis)
    }

    /// Resolve wrap width: env WPTOOL_WRAP_WIDTH > config > DEFAULT_WRAP_WIDTH.
    pub fn wrap_width(&self) -> usize {
        env_parsed::<usize>("WPTOOL_WRAP_WIDTH")
            .or(self.render.wrap_width)
            .filter(|width| *width > 0)
            .unwrap_or(DEFAULT_WRAP_WIDTH)
    }
}

/// Config path: explicit flag > env WPTOOL_CONFIG > DEFAULT_CONFIG_PATH under `cwd`.
pub fn resolve_config_path(flag: Option<&Path>, cwd: &Path) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Some(path) = env_string("WPTOOL_CONFIG") {
        return PathBuf::from(path);
    }
    cwd.join(DEFAULT_CONFIG_PATH)
}

/// Load and parse a WptoolConfig from a TOML file. Returns default if file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<WptoolConfig> {
    if !config_path.exists() {
        return Ok(WptoolConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: WptoolConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|value| value.parse::<T>().ok())
}
