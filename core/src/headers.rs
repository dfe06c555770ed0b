//! Header composition.
//!
//! # Design
//! The backend's conventions live in one table, [`Conventions`], walked in
//! order for every request. The default table is the one conventional
//! server-rendered backends expect: a JSON-leaning `Accept`, the
//! `X-Requested-With` marker, and `X-CSRF-Token` on anything that is not a
//! GET. Caller headers always come last and are never deduplicated against
//! the table, so a caller `Accept` is sent alongside the default one.

use serde::{Deserialize, Serialize};

use crate::http::{Header, HttpMethod};
use crate::token::TokenProvider;

pub const ACCEPT: &str = "Accept";
pub const ACCEPT_JSON: &str = "application/json, text/javascript, */*; q=0.01";
pub const X_REQUESTED_WITH: &str = "X-Requested-With";
pub const XML_HTTP_REQUEST: &str = "XMLHttpRequest";
pub const X_CSRF_TOKEN: &str = "X-CSRF-Token";

/// One row of the convention table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeaderRule {
    /// Always sent with the given value.
    Fixed { name: String, value: String },
    /// Sent with the provider's token, unless the method is exempt or no
    /// token is available.
    CsrfToken {
        name: String,
        #[serde(default)]
        exempt_methods: Vec<String>,
    },
}

impl HeaderRule {
    pub fn fixed(name: &str, value: &str) -> Self {
        HeaderRule::Fixed {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Ordered header rules for a family of backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conventions {
    pub rules: Vec<HeaderRule>,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            rules: vec![
                HeaderRule::fixed(ACCEPT, ACCEPT_JSON),
                HeaderRule::fixed(X_REQUESTED_WITH, XML_HTTP_REQUEST),
                HeaderRule::CsrfToken {
                    name: X_CSRF_TOKEN.to_string(),
                    exempt_methods: vec!["GET".to_string()],
                },
            ],
        }
    }
}

impl Conventions {
    /// Load a convention table from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Final header sequence for a request: table rules in order, then the
    /// caller's headers in their given order.
    ///
    /// The token provider is consulted only for methods that are not exempt.
    /// An absent token is skipped silently.
    pub fn compose_headers<P>(
        &self,
        method: &HttpMethod,
        caller_headers: &[Header],
        tokens: &P,
    ) -> Vec<Header>
    where
        P: TokenProvider + ?Sized,
    {
        let mut headers = Vec::with_capacity(self.rules.len() + caller_headers.len());
        let mut csrf_attached = false;

        for rule in &self.rules {
            match rule {
                HeaderRule::Fixed { name, value } => {
                    headers.push((name.clone(), value.clone()));
                }
                HeaderRule::CsrfToken {
                    name,
                    exempt_methods,
                } => {
                    if exempt_methods.iter().any(|m| method.matches(m)) {
                        continue;
                    }
                    if let Ok(token) = tokens.csrf_token() {
                        headers.push((name.clone(), token));
                        csrf_attached = true;
                    }
                }
            }
        }

        headers.extend(caller_headers.iter().cloned());

        tracing::trace!(
            method = %method,
            count = headers.len(),
            csrf = csrf_attached,
            "composed request headers"
        );
        headers
    }
}
