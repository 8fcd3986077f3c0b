use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// HTTP method for requests
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    CONNECT,
    OPTIONS,
    TRACE,
    PATCH,
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => http::Method::GET,
            Method::HEAD => http::Method::HEAD,
            Method::POST => http::Method::POST,
            Method::PUT => http::Method::PUT,
            Method::DELETE => http::Method::DELETE,
            Method::CONNECT => http::Method::CONNECT,
            Method::OPTIONS => http::Method::OPTIONS,
            Method::TRACE => http::Method::TRACE,
            Method::PATCH => http::Method::PATCH,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Cache mode hint, mirroring the fetch `cache` option.
///
/// There is no local cache; modes with an HTTP equivalent are sent as
/// request headers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    #[default]
    Default,
    NoStore,
    Reload,
    NoCache,
    ForceCache,
    OnlyIfCached,
}

impl CacheMode {
    /// The `Cache-Control` value this mode asks for, if any.
    pub fn cache_control(&self) -> Option<&'static str> {
        match self {
            CacheMode::Default | CacheMode::ForceCache => None,
            CacheMode::NoStore => Some("no-store"),
            CacheMode::Reload | CacheMode::NoCache => Some("no-cache"),
            CacheMode::OnlyIfCached => Some("only-if-cached"),
        }
    }
}

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text(String),
    File {
        file_name: String,
        mime: Option<String>,
        bytes: Vec<u8>,
    },
}

/// A multipart form payload.
///
/// Kept as plain data so transports can record it; the reqwest transport
/// turns it into a `reqwest::multipart::Form` at send time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    parts: Vec<(String, FormPart)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(name, value);
        self
    }

    /// Add a file field with no explicit MIME type.
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.parts.push((
            name.into(),
            FormPart::File {
                file_name: file_name.into(),
                mime: None,
                bytes: bytes.into(),
            },
        ));
        self
    }

    /// Append a text field.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push((name.into(), FormPart::Text(value.into())));
    }

    /// First text value stored under `name`.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(key, part)| match part {
            FormPart::Text(value) if key == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// All fields in insertion order.
    pub fn parts(&self) -> &[(String, FormPart)] {
        &self.parts
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Sent JSON-serialized with `Content-Type: application/json`.
    Json(JsonValue),
    /// Sent as `multipart/form-data`; the transport sets the boundary header.
    Multipart(FormData),
}

impl Body {
    /// Serialize `value` into a JSON body.
    pub fn json(value: impl Serialize) -> Result<Self, serde_json::Error> {
        Ok(Body::Json(serde_json::to_value(value)?))
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, Body::Multipart(_))
    }
}

impl From<JsonValue> for Body {
    fn from(value: JsonValue) -> Self {
        Body::Json(value)
    }
}

impl From<FormData> for Body {
    fn from(form: FormData) -> Self {
        Body::Multipart(form)
    }
}

/// A request as handed to [`Pollen::request`](crate::Pollen::request).
#[derive(Debug, Clone, Default)]
pub struct PollenRequest {
    pub method: Method,

    /// Appended to the base URL unless already absolute.
    pub path: String,

    /// Per-request headers; these win over the client defaults.
    pub headers: HeaderMap,

    pub body: Option<Body>,

    pub cache: CacheMode,
}

impl PollenRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a body.
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Add a per-request header; it takes precedence over client defaults.
    pub fn with_header(
        mut self,
        name: &str,
        value: &str,
    ) -> Result<Self, crate::Error> {
        let name = http::HeaderName::try_from(name)?;
        let value = http::HeaderValue::try_from(value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Set the cache mode.
    pub fn with_cache(mut self, cache: CacheMode) -> Self {
        self.cache = cache;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_serializes_uppercase() {
        assert_eq!(serde_json::to_value(Method::PATCH).unwrap(), json!("PATCH"));
        let m: Method = serde_json::from_value(json!("TRACE")).unwrap();
        assert_eq!(m, Method::TRACE);
        assert_eq!(Method::CONNECT.to_string(), "CONNECT");
    }

    #[test]
    fn method_converts_to_http() {
        assert_eq!(http::Method::from(Method::OPTIONS), http::Method::OPTIONS);
        assert_eq!(http::Method::from(Method::HEAD), http::Method::HEAD);
    }

    #[test]
    fn cache_mode_headers() {
        assert_eq!(CacheMode::Default.cache_control(), None);
        assert_eq!(CacheMode::NoStore.cache_control(), Some("no-store"));
        assert_eq!(CacheMode::Reload.cache_control(), Some("no-cache"));
        let mode: CacheMode = serde_json::from_value(json!("only-if-cached")).unwrap();
        assert_eq!(mode, CacheMode::OnlyIfCached);
    }

    #[test]
    fn form_data_text_lookup() {
        let mut form = FormData::new().text("name", "avatar").file("upload", "a.png", vec![1, 2]);
        form.append("_method", "PUT");
        assert_eq!(form.get_text("name"), Some("avatar"));
        assert_eq!(form.get_text("_method"), Some("PUT"));
        assert_eq!(form.get_text("upload"), None);
        assert_eq!(form.parts().len(), 3);
    }

    #[test]
    fn request_builders() {
        let request = PollenRequest::put("/users/1")
            .with_body(json!({"id": 1}))
            .with_header("Authorization", "Bearer t")
            .unwrap();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.headers.get("authorization").unwrap(), "Bearer t");
        assert_eq!(request.body, Some(Body::Json(json!({"id": 1}))));
        assert!(PollenRequest::get("x").with_header("bad header", "v").is_err());
    }
}
