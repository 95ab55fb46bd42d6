//! Error types for episode-explorer.
//!
//! Loading is the only operation that can fail at runtime. [`LoadError`] keeps
//! the cause for logging, but every variant is shown to the user as the same
//! [`LOAD_FAILURE_MESSAGE`].

use std::error::Error;
use std::fmt;
use std::io;

/// The message shown whenever a load attempt fails, regardless of cause.
pub const LOAD_FAILURE_MESSAGE: &str = "Failed to load episodes. Please try again later.";

/// Why a load attempt failed.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Transport failure (DNS, connect, timeout, body read)
    Network(String),
    /// The endpoint answered with a non-success status
    Status(u16),
    /// The body was not a JSON array of episodes
    Parse(String),
}

impl LoadError {
    /// The user-visible message for this failure.
    pub fn user_message(&self) -> &'static str {
        LOAD_FAILURE_MESSAGE
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Network(msg) => write!(f, "network error: {}", msg),
            LoadError::Status(code) => write!(f, "unexpected HTTP status {}", code),
            LoadError::Parse(msg) => write!(f, "malformed payload: {}", msg),
        }
    }
}

impl Error for LoadError {}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => LoadError::Status(status.as_u16()),
            None => LoadError::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Parse(err.to_string())
    }
}

/// Application error types.
#[derive(Debug)]
pub enum AppError {
    /// Loading the episode list failed
    Load(LoadError),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(io::Error),
    /// Invalid input from user (bad filter syntax, unknown sort field)
    InvalidInput(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Load(err) => write!(f, "Load error: {}", err),
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Io(err) => write!(f, "I/O error: {}", err),
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Load(err) => Some(err),
            AppError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        AppError::Load(err)
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
