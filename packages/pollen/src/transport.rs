//! HTTP transport abstraction.
//!
//! [`Pollen`](crate::Pollen) prepares requests (URL resolution, header merge,
//! content type) and interprets responses (body parsing, status mapping);
//! the transport only moves bytes. Swapping the transport lets tests run
//! without a network.

use async_trait::async_trait;
use http::header::{HeaderMap, CONTENT_TYPE};

use crate::types::{Body, FormData, FormPart, Method};

/// Error raised by a transport, passed through to callers untouched.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// A fully resolved request, ready to go on the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Body>,
}

/// A raw response: status line, headers and the body text.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,

    /// Status text (e.g., "OK", "Not Found")
    pub status_text: String,

    pub headers: HeaderMap,

    pub body: String,
}

impl TransportResponse {
    /// Check if the response status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The response `Content-Type`, or an empty string.
    pub fn content_type(&self) -> &str {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
    }
}

/// Trait for executing HTTP requests.
///
/// Implementations can use real HTTP clients or mock responses for testing.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Production transport using reqwest.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default reqwest client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxies, TLS roots, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn multipart_form(form: &FormData) -> Result<reqwest::multipart::Form, reqwest::Error> {
    let mut multipart = reqwest::multipart::Form::new();
    for (name, part) in form.parts() {
        multipart = match part {
            FormPart::Text(value) => multipart.text(name.clone(), value.clone()),
            FormPart::File {
                file_name,
                mime,
                bytes,
            } => {
                let mut file = reqwest::multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone());
                if let Some(mime) = mime {
                    file = file.mime_str(mime)?;
                }
                multipart.part(name.clone(), file)
            }
        };
    }
    Ok(multipart)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let method: http::Method = request.method.into();
        let mut req_builder = self.client.request(method, &request.url);
        req_builder = req_builder.headers(request.headers);

        match request.body {
            Some(Body::Json(value)) => {
                req_builder = req_builder.body(serde_json::to_vec(&value)?);
            }
            Some(Body::Multipart(form)) => {
                req_builder = req_builder.multipart(multipart_form(&form)?);
            }
            None => {}
        }

        let response = req_builder.send().await?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("")
            .to_string();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(TransportResponse {
            status,
            status_text,
            headers,
            body,
        })
    }
}

/// Mock transport for testing.
///
/// Returns predefined responses based on request matching, or defers to a
/// handler closure for stateful fakes.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use http::HeaderValue;

    type Handler = dyn Fn(&TransportRequest) -> TransportResponse + Send + Sync;

    /// A mock transport that returns predefined responses.
    #[derive(Clone, Default)]
    pub struct MockTransport {
        /// Responses keyed by method and URL path.
        responses: Arc<Mutex<HashMap<(Method, String), TransportResponse>>>,
        /// Consulted when no keyed response matches.
        handler: Arc<Mutex<Option<Arc<Handler>>>>,
        /// Recorded requests for verification.
        recorded_requests: Arc<Mutex<Vec<TransportRequest>>>,
        /// Error message to fail every request with.
        failure: Arc<Mutex<Option<String>>>,
    }

    impl MockTransport {
        /// An empty mock that answers 404 until configured.
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a response for a method and URL path (e.g. `/users/1`).
        pub fn with_response(
            self,
            method: Method,
            path: impl Into<String>,
            response: TransportResponse,
        ) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert((method, path.into()), response);
            self
        }

        /// Answer unmatched requests with `handler`.
        pub fn with_handler(
            self,
            handler: impl Fn(&TransportRequest) -> TransportResponse + Send + Sync + 'static,
        ) -> Self {
            *self.handler.lock().unwrap() = Some(Arc::new(handler));
            self
        }

        /// Configure to fail all requests with an error.
        pub fn fail_with(self, message: impl Into<String>) -> Self {
            *self.failure.lock().unwrap() = Some(message.into());
            self
        }

        /// All requests sent so far, oldest first.
        pub fn recorded_requests(&self) -> Vec<TransportRequest> {
            self.recorded_requests.lock().unwrap().clone()
        }

        /// The most recent request, if any.
        pub fn last_request(&self) -> Option<TransportRequest> {
            self.recorded_requests.lock().unwrap().last().cloned()
        }

        /// Forget recorded requests.
        pub fn clear_recorded(&self) {
            self.recorded_requests.lock().unwrap().clear();
        }

        fn response(status: u16, content_type: Option<&str>, body: String) -> TransportResponse {
            let mut headers = HeaderMap::new();
            if let Some(content_type) = content_type {
                headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
            }
            let status_text = http::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("")
                .to_string();
            TransportResponse {
                status,
                status_text,
                headers,
                body,
            }
        }

        /// A JSON response with the canonical status text.
        pub fn json(status: u16, body: serde_json::Value) -> TransportResponse {
            Self::response(status, Some("application/json"), body.to_string())
        }

        /// An HTML response with the canonical status text.
        pub fn html(status: u16, body: &str) -> TransportResponse {
            Self::response(status, Some("text/html; charset=utf-8"), body.to_string())
        }

        /// A response without a content type.
        pub fn empty(status: u16) -> TransportResponse {
            Self::response(status, None, String::new())
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(
            &self,
            request: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            self.recorded_requests.lock().unwrap().push(request.clone());

            if let Some(message) = self.failure.lock().unwrap().clone() {
                return Err(message.into());
            }

            let path = url::Url::parse(&request.url)
                .map(|url| url.path().to_string())
                .unwrap_or_else(|_| request.url.clone());

            if let Some(response) = self
                .responses
                .lock()
                .unwrap()
                .get(&(request.method, path))
            {
                return Ok(response.clone());
            }

            let handler = self.handler.lock().unwrap().clone();
            match handler {
                Some(handler) => Ok(handler(&request)),
                None => Ok(Self::json(404, serde_json::json!({"error": "Not Found"}))),
            }
        }
    }
}
