use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeskbotError {
    #[error("Failed to parse Slack command: {0}")]
    ParseError(String),

    /// The helpdesk answered with a non-success status; carries the response body.
    #[error("API Error: {0}")]
    TicketApiError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to load reference data: {0}")]
    ReferenceDataError(String),
}

impl From<reqwest::Error> for DeskbotError {
    fn from(error: reqwest::Error) -> Self {
        DeskbotError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for DeskbotError {
    fn from(error: serde_json::Error) -> Self {
        DeskbotError::ReferenceDataError(error.to_string())
    }
}

/// Reasons a storage-location code cannot be decoded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("expected {expected} {part} but found {found}")]
    FieldCount {
        part: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{field} is not a number: {value:?}")]
    NonNumeric { field: &'static str, value: String },

    #[error("{0} is empty")]
    EmptyField(&'static str),

    #[error("{0} is out of range")]
    OutOfRange(&'static str),

    #[error("unknown site: {0}")]
    UnknownSite(String),
}
