//! The `Pollen` HTTP client.

use std::collections::BTreeMap;
use std::sync::Arc;

use http::header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use url::Url;

use crate::error::Error;
use crate::exception::ApiException;
use crate::transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
use crate::types::{Body, Method, PollenRequest};
use crate::utils;

/// Serializable client configuration.
///
/// ```json
/// {"base_url": "https://api.example.com/v1", "headers": {"Authorization": "Bearer ..."}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollenConfig {
    pub base_url: String,

    /// Default headers sent with every request.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// HTTP client with a base URL, default headers and typed error mapping.
///
/// Non-2xx responses become [`Error::Api`] carrying an
/// [`ApiException`] selected by status code. Cloning is cheap and clones
/// share the transport.
///
/// # Example
///
/// ```ignore
/// use hive_pollen::Pollen;
///
/// let pollen = Pollen::new("https://api.example.com/v1")?
///     .with_default_header("Authorization", "Bearer token")?;
///
/// let user: User = pollen.get("/users/1").await?;
/// ```
#[derive(Clone)]
pub struct Pollen {
    base_url: Url,
    headers: HeaderMap,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Pollen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pollen")
            .field("base_url", &self.base_url.as_str())
            .field("headers", &self.headers)
            .finish()
    }
}

impl Pollen {
    /// Create a client sending requests through reqwest.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        Self::with_transport(base_url, Arc::new(ReqwestTransport::new()))
    }

    /// Create a client sending requests through `transport`.
    pub fn with_transport(base_url: &str, transport: Arc<dyn Transport>) -> Result<Self, Error> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            headers: HeaderMap::new(),
            transport,
        })
    }

    /// Create a reqwest-backed client from a [`PollenConfig`].
    pub fn from_config(config: &PollenConfig) -> Result<Self, Error> {
        let mut pollen = Self::new(&config.base_url)?;
        for (name, value) in &config.headers {
            pollen.set_header(name, Some(value))?;
        }
        Ok(pollen)
    }

    /// Add a default header sent with every request.
    pub fn with_default_header(mut self, name: &str, value: &str) -> Result<Self, Error> {
        self.set_header(name, Some(value))?;
        Ok(self)
    }

    /// Replace the base URL every request path is resolved against.
    pub fn set_base_url(&mut self, base_url: &str) -> Result<(), Error> {
        self.base_url = Url::parse(base_url)?;
        Ok(())
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Replace all default headers.
    pub fn set_headers(&mut self, headers: HeaderMap) {
        self.headers = headers;
    }

    /// The default headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Set a default header; `None` removes it.
    pub fn set_header(&mut self, name: &str, value: Option<&str>) -> Result<(), Error> {
        let name = HeaderName::try_from(name)?;
        match value {
            Some(value) => {
                self.headers.insert(name, HeaderValue::try_from(value)?);
            }
            None => {
                self.headers.remove(name);
            }
        }
        Ok(())
    }

    /// Remove a default header.
    pub fn remove_header(&mut self, name: &str) -> Result<(), Error> {
        self.set_header(name, None)
    }

    /// Resolve `path` against the base URL.
    ///
    /// Absolute paths are kept (protocol-relative ones take the base scheme);
    /// anything else is appended to the base URL verbatim. Duplicate slashes
    /// are collapsed except in the scheme separator.
    pub fn resolve(&self, path: &str) -> Result<String, Error> {
        let endpoint = if utils::is_absolute_url(path) {
            self.base_url.join(path)?
        } else {
            Url::parse(&format!("{}{}", self.base_url, path))?
        };
        Ok(utils::collapse_slashes(endpoint.as_str()))
    }

    fn merge_headers(&self, request: &PollenRequest) -> HeaderMap {
        let mut headers = request.headers.clone();
        for (name, value) in &self.headers {
            if !headers.contains_key(name) {
                headers.insert(name.clone(), value.clone());
            }
        }

        match &request.body {
            Some(body) if !body.is_multipart() => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            _ => {
                headers.remove(CONTENT_TYPE);
            }
        }

        if let Some(directive) = request.cache.cache_control() {
            if !headers.contains_key(CACHE_CONTROL) {
                headers.insert(CACHE_CONTROL, HeaderValue::from_static(directive));
                if directive == "no-cache" {
                    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
                }
            }
        }

        headers
    }

    /// Parse a response body according to its content type.
    fn parse_body(response: &TransportResponse) -> Result<JsonValue, Error> {
        let content_type = response.content_type();
        if content_type.contains("application/json") {
            if response.body.trim().is_empty() {
                return Ok(JsonValue::Null);
            }
            Ok(serde_json::from_str(&response.body)?)
        } else if content_type.contains("text/html") {
            Ok(JsonValue::String(response.body.clone()))
        } else {
            Ok(JsonValue::Null)
        }
    }

    /// Send a request and decode the parsed body as `R`.
    pub async fn request<R: DeserializeOwned>(&self, request: PollenRequest) -> Result<R, Error> {
        let data = self.request_value(request).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Send a request and return the parsed body untyped.
    pub async fn request_value(&self, request: PollenRequest) -> Result<JsonValue, Error> {
        let url = self.resolve(&request.path)?;
        let headers = self.merge_headers(&request);

        log::debug!("{} {}", request.method, url);

        let response = self
            .transport
            .send(TransportRequest {
                method: request.method,
                url: url.clone(),
                headers,
                body: request.body,
            })
            .await
            .map_err(Error::Transport)?;

        let data = Self::parse_body(&response)?;

        if response.is_success() {
            log::debug!("{} {} -> {}", request.method, url, response.status);
            return Ok(data);
        }

        log::warn!(
            "{} {} failed: {} {}",
            request.method,
            url,
            response.status,
            response.status_text
        );
        Err(ApiException::from_response(response.status, &response.status_text, data).into())
    }

    /// GET `path` and decode the body as `R`.
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, Error> {
        self.request(PollenRequest::get(path)).await
    }

    /// GET with `query` serialized into the query string.
    pub async fn get_with<R, Q>(&self, path: &str, query: &Q) -> Result<R, Error>
    where
        R: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let query = utils::query_string(&serde_json::to_value(query)?)?;
        self.request(PollenRequest::get(format!("{}{}", path, query)))
            .await
    }

    /// POST `path` with an optional JSON or multipart body.
    pub async fn post<R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Body>,
    ) -> Result<R, Error> {
        self.request(with_optional_body(PollenRequest::post(path), body))
            .await
    }

    /// PUT; a multipart body goes out as POST with a `_method=PUT` field,
    /// since many server stacks only parse multipart on POST.
    pub async fn put<R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Body>,
    ) -> Result<R, Error> {
        let request = match body {
            Some(Body::Multipart(mut form)) => {
                form.append("_method", "PUT");
                PollenRequest::new(Method::POST, path).with_body(form)
            }
            other => with_optional_body(PollenRequest::put(path), other),
        };
        self.request(request).await
    }

    /// PATCH `path` with an optional body.
    pub async fn patch<R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Body>,
    ) -> Result<R, Error> {
        self.request(with_optional_body(PollenRequest::patch(path), body))
            .await
    }

    /// DELETE `path` and decode the body as `R`.
    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, Error> {
        self.request(PollenRequest::delete(path)).await
    }

    /// POST `body` serialized as JSON.
    pub async fn post_json<R, B>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post(path, Some(Body::json(body)?)).await
    }

    /// PUT `body` serialized as JSON.
    pub async fn put_json<R, B>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.put(path, Some(Body::json(body)?)).await
    }

    /// PATCH `body` serialized as JSON.
    pub async fn patch_json<R, B>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.patch(path, Some(Body::json(body)?)).await
    }
}

fn with_optional_body(request: PollenRequest, body: Option<Body>) -> PollenRequest {
    match body {
        Some(body) => request.with_body(body),
        None => request,
    }
}
