use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_LANGUAGE: &str = "English";
pub const DEFAULT_PROXY_URL: &str = "http://localhost:3000";

/// Upstream weather/forecast/trending API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL without trailing slash, e.g. "https://xxxx.execute-api.us-east-1.amazonaws.com/prod".
    pub base_url: Option<String>,
}

/// Generative advice service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    /// Language the advice should be written in.
    pub language: String,
}

impl AdviceConfig {
    /// The API key, unless missing or blank.
    pub fn configured_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Advice proxy the client sends upstream weather through.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub url: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self { url: DEFAULT_PROXY_URL.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 3000 }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [upstream]
/// base_url = "https://example.com/prod"
///
/// [proxy]
/// url = "http://localhost:3000"
///
/// [advice]
/// api_key = "..."
/// language = "Thai"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub proxy: ProxyConfig,
    pub advice: AdviceConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-advisor")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay `WEATHER_API_BASE_URL`, `PROXY_URL`, `GEMINI_API_KEY`, `GEMINI_MODEL`
    /// and `PORT` as returned by `lookup`. Empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("WEATHER_API_BASE_URL") {
            self.upstream.base_url = Some(url);
        }
        if let Some(url) = get("PROXY_URL") {
            self.proxy.url = url;
        }
        if let Some(key) = get("GEMINI_API_KEY") {
            self.advice.api_key = Some(key);
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.advice.model = model;
        }
        if let Some(port) = get("PORT") {
            self.server.port =
                port.trim().parse().with_context(|| format!("Invalid PORT value: {port}"))?;
        }

        Ok(self)
    }

    /// Upstream base URL, or an error telling the user how to set it.
    pub fn upstream_base_url(&self) -> Result<&str> {
        self.upstream
            .base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No weather API base URL configured.\n\
                     Hint: run `weather configure` or set WEATHER_API_BASE_URL."
                )
            })
    }

    /// Advice proxy URL without a trailing slash.
    pub fn proxy_url(&self) -> Result<&str> {
        let url = self.proxy.url.trim().trim_end_matches('/');
        if url.is_empty() {
            return Err(anyhow!(
                "No advice proxy URL configured.\n\
                 Hint: run `weather configure` or set PROXY_URL."
            ));
        }
        Ok(url)
    }
}
