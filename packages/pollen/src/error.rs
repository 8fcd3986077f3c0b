use crate::exception::{ApiErrorKind, ApiException};
use crate::transport::TransportError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiException),

    /// Failure raised by the transport itself (DNS, refused connection, ...).
    /// The original error is kept as the source.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid query: {message}")]
    Query { message: String },
}

impl Error {
    /// The API exception, when the server answered with an error status.
    pub fn as_api(&self) -> Option<&ApiException> {
        match self {
            Error::Api(exception) => Some(exception),
            _ => None,
        }
    }

    /// Kind of the API exception, if any.
    pub fn api_kind(&self) -> Option<ApiErrorKind> {
        self.as_api().map(ApiException::kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn api_error_is_transparent() {
        let e: Error = ApiException::from_kind(ApiErrorKind::Conflict).into();
        assert_eq!(e.to_string(), "Conflict");
        assert_eq!(e.api_kind(), Some(ApiErrorKind::Conflict));
    }

    #[test]
    fn transport_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let e = Error::Transport(Box::new(io));
        assert!(e.to_string().contains("refused"));
        let source = StdError::source(&e).unwrap();
        assert!(source.downcast_ref::<std::io::Error>().is_some());
        assert!(e.as_api().is_none());
    }

    #[test]
    fn query_error_display() {
        let e = Error::Query {
            message: "bad".to_string(),
        };
        assert_eq!(e.to_string(), "Invalid query: bad");
    }
}
