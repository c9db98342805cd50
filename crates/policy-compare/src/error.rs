//! Error taxonomy for configuration loading and calls to the search service.

use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration problems. All of these are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting `{0}` (set it in the environment, .env, or the secrets file)")]
    Missing(&'static str),

    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse secrets file {path}: {source}")]
    Secrets {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid service account credentials: {0}")]
    Credentials(String),
}

/// Failures surfaced by a [`crate::search::DocumentSearch`] backend.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("quota exceeded: {0}")]
    Quota(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("search service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl SearchError {
    /// Map an HTTP status and message onto the taxonomy.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Auth(message),
            429 => Self::Quota(message),
            _ => Self::Api { status, message },
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::from_status(status.as_u16(), err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(SearchError::from_status(401, "x"), SearchError::Auth(_)));
        assert!(matches!(SearchError::from_status(403, "x"), SearchError::Auth(_)));
        assert!(matches!(SearchError::from_status(429, "x"), SearchError::Quota(_)));
        assert!(matches!(
            SearchError::from_status(500, "boom"),
            SearchError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn test_missing_setting_message_names_key() {
        let err = ConfigError::Missing("DATA_STORE_ID");
        assert!(err.to_string().contains("DATA_STORE_ID"));
    }
}
