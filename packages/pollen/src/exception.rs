//! Typed exceptions for non-2xx responses.
//!
//! Every error status the client recognizes maps to one [`ApiErrorKind`];
//! anything else becomes [`ApiErrorKind::Generic`]. The exception carries the
//! response status text as its message and the parsed response body as its
//! data, so callers can `match` on the kind and still inspect the payload.

use std::fmt;

use serde_json::Value as JsonValue;

/// Kind of API failure, one per recognized status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    Conflict,
    PayloadTooLarge,
    UnprocessableEntity,
    Locked,
    TooManyAttempts,
    UnavailableForLegalReasons,
    BadGateway,
    /// Never produced by the client; raised by callers (e.g. auth middleware).
    TokenExpired,
    /// Never produced by the client; raised by callers (e.g. auth middleware).
    TokenNotProvided,
    /// Any other non-2xx status.
    Generic,
}

impl ApiErrorKind {
    /// Select the kind for a response status by exact match.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ApiErrorKind::BadRequest,
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            405 => ApiErrorKind::MethodNotAllowed,
            409 => ApiErrorKind::Conflict,
            413 => ApiErrorKind::PayloadTooLarge,
            422 => ApiErrorKind::UnprocessableEntity,
            423 => ApiErrorKind::Locked,
            429 => ApiErrorKind::TooManyAttempts,
            451 => ApiErrorKind::UnavailableForLegalReasons,
            502 => ApiErrorKind::BadGateway,
            _ => ApiErrorKind::Generic,
        }
    }

    /// The status code this kind is selected by, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiErrorKind::BadRequest => Some(400),
            ApiErrorKind::Unauthorized => Some(401),
            ApiErrorKind::Forbidden => Some(403),
            ApiErrorKind::NotFound => Some(404),
            ApiErrorKind::MethodNotAllowed => Some(405),
            ApiErrorKind::Conflict => Some(409),
            ApiErrorKind::PayloadTooLarge => Some(413),
            ApiErrorKind::UnprocessableEntity => Some(422),
            ApiErrorKind::Locked => Some(423),
            ApiErrorKind::TooManyAttempts => Some(429),
            ApiErrorKind::UnavailableForLegalReasons => Some(451),
            ApiErrorKind::BadGateway => Some(502),
            ApiErrorKind::TokenExpired
            | ApiErrorKind::TokenNotProvided
            | ApiErrorKind::Generic => None,
        }
    }

    /// Message used when the response carries no status text.
    pub fn default_message(&self) -> &'static str {
        match self {
            ApiErrorKind::BadRequest => "Bad Request",
            ApiErrorKind::Unauthorized => "Not authenticated.",
            ApiErrorKind::Forbidden => "Forbidden",
            ApiErrorKind::NotFound => "Not Found.",
            ApiErrorKind::MethodNotAllowed => "Method Not Allowed",
            ApiErrorKind::Conflict => "Conflict",
            ApiErrorKind::PayloadTooLarge => "Payload Too Large",
            ApiErrorKind::UnprocessableEntity => "Unprocessable entity.",
            ApiErrorKind::Locked => "Locked",
            ApiErrorKind::TooManyAttempts => "Too many attempts.",
            ApiErrorKind::UnavailableForLegalReasons => "Unavailable For Legal Reasons.",
            ApiErrorKind::BadGateway => "Bad Gateway",
            ApiErrorKind::TokenExpired => "Token is expired.",
            ApiErrorKind::TokenNotProvided => "Token not provided.",
            ApiErrorKind::Generic => "API error",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An API failure: a kind, a message and the response payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiException {
    kind: ApiErrorKind,
    message: String,
    data: JsonValue,
}

impl ApiException {
    /// Create an exception with an explicit message and payload.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>, data: JsonValue) -> Self {
        Self {
            kind,
            message: message.into(),
            data,
        }
    }

    /// Build an exception carrying the kind's default message and no data.
    pub fn from_kind(kind: ApiErrorKind) -> Self {
        Self::new(kind, kind.default_message(), JsonValue::Null)
    }

    /// Build the exception for a failed response.
    ///
    /// The status text becomes the message; an empty status text (HTTP/2 has
    /// no reason phrase) falls back to the kind's default message.
    pub fn from_response(status: u16, status_text: &str, data: JsonValue) -> Self {
        let kind = ApiErrorKind::from_status(status);
        let message = if status_text.is_empty() {
            kind.default_message().to_string()
        } else {
            status_text.to_string()
        };
        Self::new(kind, message, data)
    }

    /// The client-side "token expired" exception.
    pub fn token_expired() -> Self {
        Self::from_kind(ApiErrorKind::TokenExpired)
    }

    /// The client-side "token not provided" exception.
    pub fn token_not_provided() -> Self {
        Self::from_kind(ApiErrorKind::TokenNotProvided)
    }

    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The parsed response body, `null` when there was none.
    pub fn data(&self) -> &JsonValue {
        &self.data
    }

    /// Consume the exception, returning its payload.
    pub fn into_data(self) -> JsonValue {
        self.data
    }

    /// Status code this exception was mapped from, if any.
    pub fn status(&self) -> Option<u16> {
        self.kind.status()
    }
}

impl fmt::Display for ApiException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiException {}
