use thiserror::Error;

/// Errors for the flight-search assistant
#[derive(Error, Debug)]
pub enum SkyscoutError {
    #[error("Invalid date format: {0} (expected MM/DD)")]
    InvalidDateFormat(String),

    #[error("Invalid calendar date: {0}")]
    InvalidCalendarDate(String),

    #[error("Return date {attempted} is not after departure date {departure}")]
    ReturnBeforeDeparture { departure: String, attempted: String },

    #[error("Malformed function arguments: {0}")]
    MalformedFunctionArguments(String),

    #[error("Browsing agent failed: {0}")]
    AgentFailure(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Request Error: {0}")]
    RequestError(String),

    #[error("Response Error: {0}")]
    ResponseError(String),

    #[error("Parsing Error: {0}")]
    ParsingError(String),

    #[error("HTTP Error: {status_code} - {message}")]
    HttpError { status_code: u16, message: String },

    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// Result type for skyscout operations
pub type SkyscoutResult<T> = Result<T, SkyscoutError>;
