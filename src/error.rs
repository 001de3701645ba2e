use thiserror::Error;

use crate::metrics::RequestTag;

/// Errors raised while driving the service under test.
#[derive(Debug, Error)]
pub enum LoadTestError {
    /// The service answered a setup request with something other than 201.
    #[error("incorrect data during {stage} setup: HTTP {status}: {body}")]
    Setup {
        stage: RequestTag,
        status: u16,
        body: String,
    },

    #[error("listing recorded votes failed: HTTP {status}: {body}")]
    Verify { status: u16, body: String },

    #[error("could not decode {stage} response: {source}")]
    Decode {
        stage: RequestTag,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("run cancelled before setup completed")]
    Cancelled,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::Load(Box::new(error))
    }
}

impl LoadTestError {
    /// Whether the error came from the service rather than from the network.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            LoadTestError::Setup { .. } | LoadTestError::Verify { .. } | LoadTestError::Decode { .. }
        )
    }
}
