use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;
use url::Url;

use crate::error::{Result, UsersError};

#[derive(Deserialize, Default, Debug)]
pub struct Config {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub locations_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| UsersError::ConfigRead {
                path: config_path.clone(),
                source: e,
            })?;

        Self::from_toml(&contents).map_err(|e| UsersError::ConfigParse {
            path: config_path,
            source: e,
        })
    }

    pub fn from_toml(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "users")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(UsersError::NoConfigDir)
    }

    /// Get the API base URL with env var taking precedence over config file
    pub fn api_url(&self) -> Result<Url> {
        let raw = std::env::var("USERS_API_URL")
            .ok()
            .or_else(|| self.api_url.clone())
            .ok_or(UsersError::MissingApiUrl)?;

        parse_base_url(&raw)
    }

    pub fn api_token(&self) -> Option<String> {
        std::env::var("USERS_API_TOKEN")
            .ok()
            .or_else(|| self.api_token.clone())
    }

    pub fn locations_path(&self) -> Option<PathBuf> {
        std::env::var_os("USERS_LOCATIONS")
            .map(PathBuf::from)
            .or_else(|| self.locations_path.clone())
    }
}

/// Parse a base URL, making sure it ends with a slash so `join` appends
/// instead of replacing the last path segment.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }

    let url = Url::parse(&normalized).map_err(|_| UsersError::InvalidUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(UsersError::InvalidUrl(raw.to_string())),
    }
}
