//! HTTP value types shared by the request builder, transports and decoders.
//!
//! # Design
//! Requests and responses are plain data. The core builds request
//! descriptions and interprets responses without touching the network; a
//! [`Transport`](crate::transport::Transport) owned by the caller performs the
//! actual I/O. All fields use owned types so values can be moved freely
//! between threads and stored without lifetime concerns.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A single header as a name/value pair. Names keep the caller's spelling.
pub type Header = (String, String);

/// HTTP method for a request.
///
/// Parsing from a string is case-insensitive for the known verbs. Anything
/// else is kept verbatim in [`HttpMethod::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Other(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Other(name) => name,
        }
    }

    /// Case-insensitive comparison against a method name.
    pub fn matches(&self, name: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(name)
    }
}

impl From<&str> for HttpMethod {
    fn from(name: &str) -> Self {
        if name.eq_ignore_ascii_case("GET") {
            HttpMethod::Get
        } else if name.eq_ignore_ascii_case("POST") {
            HttpMethod::Post
        } else if name.eq_ignore_ascii_case("PUT") {
            HttpMethod::Put
        } else if name.eq_ignore_ascii_case("PATCH") {
            HttpMethod::Patch
        } else if name.eq_ignore_ascii_case("DELETE") {
            HttpMethod::Delete
        } else {
            HttpMethod::Other(name.to_string())
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload. The body carries its own content type so the request
/// builder never has to inspect or force a `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Body {
    #[default]
    Empty,
    Text { content_type: String, content: String },
}

impl Body {
    pub fn empty() -> Self {
        Body::Empty
    }

    /// Serialize `value` as a JSON body with `application/json`.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Body::Text {
            content_type: "application/json".to_string(),
            content: serde_json::to_string(value)?,
        })
    }

    pub fn string(content_type: &str, content: impl Into<String>) -> Self {
        Body::Text {
            content_type: content_type.to_string(),
            content: content.into(),
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        match self {
            Body::Empty => None,
            Body::Text { content_type, .. } => Some(content_type),
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Body::Empty => None,
            Body::Text { content, .. } => Some(content),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a transport after executing a request. Responses of every
/// status are represented here; status interpretation happens in
/// [`HttpRequest::decode_response`](crate::request::HttpRequest::decode_response).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<Header>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

type DecodeFn<T> = dyn Fn(&HttpResponse) -> Result<T, String> + Send + Sync;

/// Response-decoding capability carried by a request description.
///
/// Applied only to 2xx responses. A decode failure is reported as a message
/// and surfaces as [`HttpError::BadPayload`](crate::error::HttpError::BadPayload).
pub struct Expect<T> {
    decode: Arc<DecodeFn<T>>,
}

impl<T: 'static> Expect<T> {
    pub fn from_fn<F>(decode: F) -> Self
    where
        F: Fn(&HttpResponse) -> Result<T, String> + Send + Sync + 'static,
    {
        Self {
            decode: Arc::new(decode),
        }
    }

    /// Transform the decoded value.
    pub fn map<U, F>(self, f: F) -> Expect<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let decode = self.decode;
        Expect::from_fn(move |response| decode(response).map(&f))
    }
}

impl<T> Expect<T> {
    pub fn decode(&self, response: &HttpResponse) -> Result<T, String> {
        (self.decode)(response)
    }
}

impl<T: DeserializeOwned + 'static> Expect<T> {
    /// Decode the body as JSON into `T`.
    pub fn json() -> Self {
        Expect::from_fn(|response| {
            serde_json::from_str(&response.body).map_err(|e| e.to_string())
        })
    }
}

impl Expect<String> {
    /// Hand back the raw body.
    pub fn string() -> Self {
        Expect::from_fn(|response| Ok(response.body.clone()))
    }
}

impl Expect<()> {
    /// Ignore the body entirely.
    pub fn whatever() -> Self {
        Expect::from_fn(|_| Ok(()))
    }
}

impl<T> Clone for Expect<T> {
    fn clone(&self) -> Self {
        Self {
            decode: Arc::clone(&self.decode),
        }
    }
}

impl<T> fmt::Debug for Expect<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Expect(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }

    #[test]
    fn method_parsing_is_case_insensitive() {
        assert_eq!(HttpMethod::from("get"), HttpMethod::Get);
        assert_eq!(HttpMethod::from("Post"), HttpMethod::Post);
        assert_eq!(HttpMethod::from("PATCH"), HttpMethod::Patch);
        assert_eq!(HttpMethod::from("dElEtE"), HttpMethod::Delete);
        assert_eq!(
            HttpMethod::from("Options"),
            HttpMethod::Other("Options".to_string())
        );
    }

    #[test]
    fn other_method_matches_ignoring_case() {
        assert!(HttpMethod::Other("get".to_string()).matches("GET"));
        assert!(!HttpMethod::Post.matches("GET"));
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn json_body_carries_content_type() {
        let body = Body::json(&serde_json::json!({"name": "Ada"})).unwrap();
        assert_eq!(body.content_type(), Some("application/json"));
        assert_eq!(body.content(), Some(r#"{"name":"Ada"}"#));
        assert!(!body.is_empty());
    }

    #[test]
    fn empty_body_has_no_content_type() {
        let body = Body::empty();
        assert!(body.is_empty());
        assert_eq!(body.content_type(), None);
        assert_eq!(body.content(), None);
    }

    #[test]
    fn response_header_lookup_ignores_case() {
        let resp = response(200, "{}");
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.header("x-missing"), None);
        assert!(resp.is_success());
        assert!(!response(302, "").is_success());
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        name: String,
    }

    #[test]
    fn expect_json_decodes_body() {
        let user = Expect::<User>::json()
            .decode(&response(200, r#"{"name":"Ada"}"#))
            .unwrap();
        assert_eq!(user.name, "Ada");
    }

    #[test]
    fn expect_json_reports_mismatch() {
        let err = Expect::<User>::json()
            .decode(&response(200, r#"{"title":"x"}"#))
            .unwrap_err();
        assert!(err.contains("name"), "{err}");
    }

    #[test]
    fn expect_map_and_string() {
        let len = Expect::string().map(|s| s.len());
        assert_eq!(len.decode(&response(200, "abcd")).unwrap(), 4);
        assert_eq!(Expect::whatever().decode(&response(204, "")), Ok(()));
    }
}
