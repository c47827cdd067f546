use std::path::PathBuf;
use thiserror::Error;

use crate::form::validate::ValidationError;

#[derive(Error, Debug)]
pub enum UsersError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error(
        "No API URL found. Set USERS_API_URL env var or add api_url to ~/.config/users/config.toml"
    )]
    MissingApiUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to read locations file {path}: {source}")]
    LocationsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse locations data: {0}")]
    LocationsParse(#[source] serde_json::Error),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Commune {commune} is not part of region {region}")]
    UnknownCommune { region: String, commune: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Save failed: {0}")]
    Persistence(String),

    #[error("Form is not open")]
    FormNotOpen,
}

pub type Result<T> = std::result::Result<T, UsersError>;

impl UsersError {
    /// Errors that a notifier has already shown to the user.
    pub fn already_reported(&self) -> bool {
        matches!(self, UsersError::Validation(_) | UsersError::Persistence(_))
    }
}
