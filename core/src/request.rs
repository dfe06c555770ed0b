//! Request configuration and request descriptions.
//!
//! # Design
//! A [`RequestConfig`] is what the caller fills in; an [`HttpRequest`] is
//! what comes out of [`XhrClient::request`](crate::client::XhrClient::request)
//! once headers have been composed. The description is immutable and does no
//! I/O; a [`Transport`] executes it and [`HttpRequest::decode_response`]
//! turns the raw response into the caller's value.

use std::time::Duration;

use crate::error::HttpError;
use crate::http::{Body, Expect, Header, HttpMethod, HttpResponse};
use crate::transport::Transport;

/// Everything needed to describe a request before headers are composed.
#[derive(Debug, Clone)]
pub struct RequestConfig<T> {
    pub method: HttpMethod,
    pub headers: Vec<Header>,
    pub url: String,
    pub body: Body,
    pub expect: Expect<T>,
    pub timeout: Option<Duration>,
    pub with_credentials: bool,
}

impl<T> RequestConfig<T> {
    /// No extra headers, empty body, no timeout, credentials off.
    pub fn new(method: HttpMethod, url: impl Into<String>, expect: Expect<T>) -> Self {
        Self {
            method,
            headers: Vec::new(),
            url: url.into(),
            body: Body::Empty,
            expect,
            timeout: None,
            with_credentials: false,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.with_credentials = with_credentials;
        self
    }
}

/// The transport-facing half of a request description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParts {
    pub(crate) method: HttpMethod,
    pub(crate) url: String,
    pub(crate) headers: Vec<Header>,
    pub(crate) body: Body,
    pub(crate) timeout: Option<Duration>,
    pub(crate) with_credentials: bool,
}

impl RequestParts {
    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn with_credentials(&self) -> bool {
        self.with_credentials
    }
}

/// A built, not-yet-executed request that decodes into `T`.
#[derive(Debug)]
pub struct HttpRequest<T> {
    parts: RequestParts,
    expect: Expect<T>,
}

impl<T> HttpRequest<T> {
    pub(crate) fn new(parts: RequestParts, expect: Expect<T>) -> Self {
        Self { parts, expect }
    }

    pub fn parts(&self) -> &RequestParts {
        &self.parts
    }

    pub fn method(&self) -> &HttpMethod {
        &self.parts.method
    }

    pub fn url(&self) -> &str {
        &self.parts.url
    }

    pub fn headers(&self) -> &[Header] {
        &self.parts.headers
    }

    pub fn body(&self) -> &Body {
        &self.parts.body
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.parts.timeout
    }

    pub fn with_credentials(&self) -> bool {
        self.parts.with_credentials
    }

    pub fn expect(&self) -> &Expect<T> {
        &self.expect
    }

    /// Interpret a response produced for this request.
    ///
    /// Non-2xx becomes [`HttpError::BadStatus`]; a 2xx body the decoder
    /// rejects becomes [`HttpError::BadPayload`].
    pub fn decode_response(&self, response: HttpResponse) -> Result<T, HttpError> {
        if !response.is_success() {
            return Err(HttpError::BadStatus(response));
        }
        self.expect
            .decode(&response)
            .map_err(|message| HttpError::BadPayload { message, response })
    }

    /// Execute through `transport` and decode the outcome.
    pub fn send<X>(&self, transport: &X) -> Result<T, HttpError>
    where
        X: Transport + ?Sized,
    {
        tracing::debug!(method = %self.parts.method, url = %self.parts.url, "sending request");
        let response = transport.execute(&self.parts)?;
        tracing::debug!(status = response.status, url = %self.parts.url, "received response");
        self.decode_response(response)
    }
}

impl<T> Clone for HttpRequest<T> {
    fn clone(&self) -> Self {
        Self {
            parts: self.parts.clone(),
            expect: self.expect.clone(),
        }
    }
}
