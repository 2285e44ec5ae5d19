use sparql_bus_common::ActorError;
use std::time::Duration;

/// The result of an HTTP operation.
pub type HttpResult<T> = Result<T, HttpError>;

/// An error raised by the HTTP actors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HttpError {
    /// The response must not be stored in a shared cache.
    #[error("{0} is not storable.")]
    NotStorable(String),
    /// The request did not complete within its timeout and was aborted.
    #[error("The request to {url} was aborted after {timeout:?}.")]
    TimeoutAborted { url: String, timeout: Duration },
    #[error("The request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl From<HttpError> for ActorError {
    fn from(error: HttpError) -> Self {
        ActorError::run(error)
    }
}
