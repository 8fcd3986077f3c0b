//! URL and query-string helpers used by the client.

use lazy_static::lazy_static;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde_json::Value as JsonValue;

use crate::error::Error;

lazy_static! {
    static ref ABSOLUTE_URL: Regex = Regex::new(r"(?i)^(?:[a-z]+:)?//").unwrap();
    static ref DUPLICATE_SLASHES: Regex = Regex::new(r"([^:])//+").unwrap();
}

/// Structural equality for dynamic JSON data.
///
/// Typed state compares through `PartialEq`; this exists for callers holding
/// untyped payloads such as `ApiException::data`.
pub fn deep_equal(a: &JsonValue, b: &JsonValue) -> bool {
    a == b
}

/// Whether `url` is absolute: `scheme://...` or protocol-relative `//...`.
pub fn is_absolute_url(url: &str) -> bool {
    ABSOLUTE_URL.is_match(url)
}

/// Collapse runs of `/` into one, leaving the `scheme://` separator alone.
pub fn collapse_slashes(url: &str) -> String {
    DUPLICATE_SLASHES.replace_all(url, "${1}/").into_owned()
}

/// Characters escaped in a query component: everything but ASCII
/// alphanumerics and `- _ . ! ~ * ' ( ) @ : $ , [ ]`.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'@')
    .remove(b':')
    .remove(b'$')
    .remove(b',')
    .remove(b'[')
    .remove(b']');

/// Percent-encode a query component.
///
/// Same escaping as `encodeURIComponent`, except `@ : $ , [ ]` are left
/// literal and a space becomes `+`.
pub fn encode(value: &str) -> String {
    // A literal "%20" in the input is itself escaped to "%2520", so only
    // encoded spaces are rewritten here.
    utf8_percent_encode(value, QUERY_COMPONENT)
        .to_string()
        .replace("%20", "+")
}

/// Serialize an object or array into `?key=value&key2=value2`.
///
/// - arrays of two or more elements repeat the key as `key[]=value`
/// - single-element arrays are flattened to `key=value`
/// - `null` values and empty arrays are skipped
/// - plain-object values are rendered as compact JSON
///
/// A top-level array is keyed by index. Returns an empty string for `null`
/// or when nothing survives filtering.
pub fn query_string(data: &JsonValue) -> Result<String, Error> {
    let entries: Vec<(String, &JsonValue)> = match data {
        JsonValue::Null => return Ok(String::new()),
        JsonValue::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        JsonValue::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        other => {
            return Err(Error::Query {
                message: format!("expected an object or array, got {}", other),
            })
        }
    };

    let mut parts = Vec::new();
    for (key, value) in entries {
        match value {
            JsonValue::Null => continue,
            JsonValue::Array(items) if items.is_empty() => continue,
            JsonValue::Array(items) if items.len() == 1 => {
                parts.push(format!("{}={}", encode(&key), encode(&value_to_string(&items[0]))));
            }
            JsonValue::Array(items) => {
                let array_key = encode(&format!("{}[]", key));
                for item in items {
                    parts.push(format!("{}={}", array_key, encode(&value_to_string(item))));
                }
            }
            scalar => parts.push(format!("{}={}", encode(&key), encode(&value_to_string(scalar)))),
        }
    }

    if parts.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("?{}", parts.join("&")))
}

fn value_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        // Objects, numbers, booleans and null share their JSON spelling.
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absolute_urls() {
        assert!(is_absolute_url("http://example.com"));
        assert!(is_absolute_url("HTTPS://example.com/a"));
        assert!(is_absolute_url("//cdn.example.com/x.js"));
        assert!(!is_absolute_url("/users/1"));
        assert!(!is_absolute_url("users"));
        assert!(!is_absolute_url("1http://nope"));
    }

    #[test]
    fn collapse_keeps_scheme_separator() {
        assert_eq!(
            collapse_slashes("http://localhost:8080/api//v1///users"),
            "http://localhost:8080/api/v1/users"
        );
        assert_eq!(collapse_slashes("http://127.0.0.1//"), "http://127.0.0.1/");
    }

    #[test]
    fn encode_reserved_characters() {
        assert_eq!(encode("a b"), "a+b");
        assert_eq!(encode("x@y:z$1,2[0]"), "x@y:z$1,2[0]");
        assert_eq!(encode("a&b=c/d"), "a%26b%3Dc%2Fd");
        assert_eq!(encode("é"), "%C3%A9");
        assert_eq!(encode("it's (ok)!~*"), "it's+(ok)!~*");
        assert_eq!(encode("100%20off"), "100%2520off");
    }

    #[test]
    fn query_skips_null_and_empty_arrays() {
        let query = query_string(&json!({"a": 1, "b": [2, 3], "c": null, "d": []})).unwrap();
        assert_eq!(query, "?a=1&b[]=2&b[]=3");
    }

    #[test]
    fn query_flattens_single_element_arrays() {
        assert_eq!(query_string(&json!({"tag": ["x"]})).unwrap(), "?tag=x");
    }

    #[test]
    fn query_renders_objects_as_json() {
        let query = query_string(&json!({"filter": {"k": "v"}})).unwrap();
        assert_eq!(query, "?filter=%7B%22k%22:%22v%22%7D");
    }

    #[test]
    fn query_top_level_array_uses_indices() {
        assert_eq!(query_string(&json!(["x", "y"])).unwrap(), "?0=x&1=y");
    }

    #[test]
    fn query_empty_inputs() {
        assert_eq!(query_string(&JsonValue::Null).unwrap(), "");
        assert_eq!(query_string(&json!({})).unwrap(), "");
        assert_eq!(query_string(&json!({"only": null})).unwrap(), "");
    }

    #[test]
    fn query_rejects_scalars() {
        assert!(matches!(
            query_string(&json!("nope")),
            Err(Error::Query { .. })
        ));
    }

    #[test]
    fn deep_equal_is_structural() {
        assert!(deep_equal(&json!({"a": [1, {"b": 2}]}), &json!({"a": [1, {"b": 2}]})));
        assert!(!deep_equal(&json!({"a": [1]}), &json!({"a": [2]})));
    }
}
