use thiserror::Error as ThisError;

/// The Error
#[derive(Debug, ThisError)]
pub enum Error {
    /// Discovery is returned when the openid-configuration of the identity provider
    /// could not be fetched or did not contain the expected endpoints
    #[error("Discovery Error: {0}")]
    Discovery(String),
    /// Authentication is returned when a password or refresh grant was rejected or
    /// the token response was missing one of the expected fields
    #[error("Authentication Error: {0}")]
    Authentication(String),
    /// TransientService is returned when a service answered with a known transient
    /// failure and the fallback lookup was not able to recover from it
    #[error("Transient service error: {0}")]
    TransientService(String),
    /// ParseError is returned when there was an error parsing a url
    #[error("Parse Error: {0}")]
    ParseError(#[from] url::ParseError),
    /// ReqwestError is returned when the request itself fails or the body could not
    /// be decoded
    #[error("Reqwest Error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    /// InvalidRequest is returned when the service rejected the request as malformed
    #[error("Invalid Request: Invalid or Missing data")]
    InvalidRequest,
    /// Unauthorized is returned when the token was rejected or does not grant access
    /// to the requested resource
    #[error("Unauthorized")]
    Unauthorized,
    /// NotFound is returned when the requested resource does not exist
    #[error("Not Found")]
    NotFound,
    /// UnexpectedResponse is returned when a successful response is missing data
    /// that is needed to continue
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
    /// Config is returned when a required configuration value is missing or invalid
    #[error("Config Error: {0}")]
    Config(String),
    /// Other simply represents all other status codes that could not be grouped into
    /// one of the categories listed above
    #[error("Unknown error, status code {0}")]
    Other(u16),
}

impl Error {
    /// This is only meant for status codes and assumes that the
    /// given u16 is a status-code from an http-request
    pub fn from_status_code(code: u16) -> Error {
        match code {
            400 => Error::InvalidRequest,
            401 | 403 => Error::Unauthorized,
            404 => Error::NotFound,
            _ => Error::Other(code),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Turns every non-success status into the matching [`Error`]
pub(crate) fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(Error::from_status_code(status.as_u16()))
}
