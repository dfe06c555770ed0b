//! Request builder and verb helpers.
//!
//! # Design
//! `XhrClient` holds only the convention table and a token provider; it
//! carries no mutable state between calls. Every method produces an
//! [`HttpRequest`] without touching the network. The caller executes it
//! through a [`Transport`](crate::transport::Transport), keeping the core
//! deterministic and free of I/O.

use crate::headers::Conventions;
use crate::http::{Body, Expect, Header, HttpMethod};
use crate::request::{HttpRequest, RequestConfig, RequestParts};
use crate::token::{StaticToken, TokenAbsent, TokenProvider};

/// Builds request descriptions for a conventional JSON backend.
#[derive(Debug, Clone)]
pub struct XhrClient<P = StaticToken> {
    conventions: Conventions,
    tokens: P,
}

impl<P: TokenProvider> XhrClient<P> {
    /// Client using the default convention table.
    pub fn new(tokens: P) -> Self {
        Self::with_conventions(Conventions::default(), tokens)
    }

    pub fn with_conventions(conventions: Conventions, tokens: P) -> Self {
        Self {
            conventions,
            tokens,
        }
    }

    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    pub fn csrf_token(&self) -> Result<String, TokenAbsent> {
        self.tokens.csrf_token()
    }

    pub fn compose_headers(&self, method: &HttpMethod, caller_headers: &[Header]) -> Vec<Header> {
        self.conventions
            .compose_headers(method, caller_headers, &self.tokens)
    }

    /// Build a request description. Cannot fail and performs no I/O.
    pub fn request<T>(&self, config: RequestConfig<T>) -> HttpRequest<T> {
        let RequestConfig {
            method,
            headers,
            url,
            body,
            expect,
            timeout,
            with_credentials,
        } = config;
        let headers = self.compose_headers(&method, &headers);
        let parts = RequestParts {
            method,
            url,
            headers,
            body,
            timeout,
            with_credentials,
        };
        HttpRequest::new(parts, expect)
    }

    pub fn get<T>(&self, url: &str, expect: Expect<T>) -> HttpRequest<T> {
        self.request(RequestConfig::new(HttpMethod::Get, url, expect))
    }

    pub fn post<T>(&self, url: &str, body: Body, expect: Expect<T>) -> HttpRequest<T> {
        self.request(RequestConfig::new(HttpMethod::Post, url, expect).body(body))
    }

    pub fn put<T>(&self, url: &str, body: Body, expect: Expect<T>) -> HttpRequest<T> {
        self.request(RequestConfig::new(HttpMethod::Put, url, expect).body(body))
    }

    pub fn patch<T>(&self, url: &str, body: Body, expect: Expect<T>) -> HttpRequest<T> {
        self.request(RequestConfig::new(HttpMethod::Patch, url, expect).body(body))
    }

    pub fn delete<T>(&self, url: &str, body: Body, expect: Expect<T>) -> HttpRequest<T> {
        self.request(RequestConfig::new(HttpMethod::Delete, url, expect).body(body))
    }
}
