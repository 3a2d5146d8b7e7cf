//! Error handling for registry search and enrichment
//!
//! Two layers: [`RegistryError`] is what the registry client raises for a
//! single remote call, [`SearchError`] is the one error a whole search call
//! surfaces. Degraded enrichment is not an error, see
//! [`crate::search::address::CrossReference`].

use thiserror::Error;

/// Result alias used throughout the orchestrator
pub type Result<T> = std::result::Result<T, SearchError>;

/// Terminal error of one search call
///
/// `Clone` because the first failure is stored as the cancellation cause
/// and handed back to every caller that observes it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Too many possible matches for {scope}, please provide more details")]
    AmbiguousQuery { scope: String },

    #[error("Registry request failed: {0}")]
    Remote(String),

    #[error("Registry data integrity violation: {0}")]
    DataIntegrity(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Search cancelled")]
    Cancelled,

    #[error("Search task terminated without a result: {0}")]
    TaskPanicked(String),
}

impl SearchError {
    pub fn ambiguous(scope: impl Into<String>) -> Self {
        Self::AmbiguousQuery {
            scope: scope.into(),
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::AmbiguousQuery { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Failure of a single registry call
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Registry API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Unable to decode registry response: {0}")]
    Decode(String),

    #[error("Invalid registry URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Unable to start registry session: {0}")]
    Session(String),

    #[error("Invalid registry data: {0}")]
    InvalidData(String),
}

impl From<RegistryError> for SearchError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::InvalidData(message) => SearchError::DataIntegrity(message),
            other => SearchError::Remote(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(error: serde_json::Error) -> Self {
        RegistryError::Decode(error.to_string())
    }
}

impl From<quick_xml::DeError> for RegistryError {
    fn from(error: quick_xml::DeError) -> Self {
        RegistryError::Decode(error.to_string())
    }
}
