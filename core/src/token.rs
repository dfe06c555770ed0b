//! CSRF token sources.
//!
//! A [`TokenProvider`] answers one question: is there a token to send, and
//! what is it. Every provider here settles the answer when it is constructed
//! and hands back the same result for its whole lifetime.

use std::sync::Arc;

use thiserror::Error;

/// Default environment variable read by [`EnvToken::from_default_env`].
pub const DEFAULT_TOKEN_VAR: &str = "CSRF_TOKEN";

/// Default `name` attribute of the meta tag carrying the token.
pub const DEFAULT_META_NAME: &str = "csrf-token";

/// No token is available. A normal outcome, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no CSRF token available")]
pub struct TokenAbsent;

pub trait TokenProvider: Send + Sync {
    fn csrf_token(&self) -> Result<String, TokenAbsent>;
}

impl<P: TokenProvider + ?Sized> TokenProvider for &P {
    fn csrf_token(&self) -> Result<String, TokenAbsent> {
        (**self).csrf_token()
    }
}

impl<P: TokenProvider + ?Sized> TokenProvider for Arc<P> {
    fn csrf_token(&self) -> Result<String, TokenAbsent> {
        (**self).csrf_token()
    }
}

/// A token fixed at construction time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn present(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn absent() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn csrf_token(&self) -> Result<String, TokenAbsent> {
        self.0.clone().ok_or(TokenAbsent)
    }
}

/// Token read from an environment variable once, when constructed.
#[derive(Debug, Clone)]
pub struct EnvToken {
    token: Option<String>,
}

impl EnvToken {
    pub fn from_env(var: &str) -> Self {
        let token = std::env::var(var).ok();
        if token.is_none() {
            tracing::debug!(var, "CSRF token variable not set");
        }
        Self { token }
    }

    pub fn from_default_env() -> Self {
        Self::from_env(DEFAULT_TOKEN_VAR)
    }
}

impl TokenProvider for EnvToken {
    fn csrf_token(&self) -> Result<String, TokenAbsent> {
        self.token.clone().ok_or(TokenAbsent)
    }
}

/// Token scraped from a `<meta name="csrf-token" content="...">` tag of an
/// HTML page, the way server-rendered pages hand the token to scripts.
#[derive(Debug, Clone)]
pub struct MetaTagToken {
    token: Option<String>,
}

impl MetaTagToken {
    pub fn from_html(html: &str) -> Self {
        Self::from_html_named(html, DEFAULT_META_NAME)
    }

    pub fn from_html_named(html: &str, meta_name: &str) -> Self {
        let token = find_meta_content(html, meta_name);
        if token.is_none() {
            tracing::debug!(meta_name, "no CSRF meta tag found in page");
        }
        Self { token }
    }
}

impl TokenProvider for MetaTagToken {
    fn csrf_token(&self) -> Result<String, TokenAbsent> {
        self.token.clone().ok_or(TokenAbsent)
    }
}

/// `content` of the first `<meta>` tag whose `name` equals `meta_name`.
fn find_meta_content(html: &str, meta_name: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let mut from = 0;
    while let Some(pos) = lower[from..].find("<meta") {
        let start = from + pos + "<meta".len();
        let end = lower[start..].find('>').map_or(html.len(), |i| start + i);
        let attrs = parse_attributes(&html[start..end]);
        let name_matches = attrs
            .iter()
            .any(|(k, v)| k == "name" && v.eq_ignore_ascii_case(meta_name));
        if name_matches {
            return attrs
                .into_iter()
                .find(|(k, _)| k == "content")
                .map(|(_, v)| v);
        }
        from = end;
    }
    None
}

/// Attributes of a tag body as lowercase-name / decoded-value pairs.
fn parse_attributes(tag: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut rest = tag.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
    while !rest.is_empty() {
        let name_len = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let name = rest[..name_len].to_ascii_lowercase();
        rest = rest[name_len..].trim_start();

        let mut value = String::new();
        if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            let (raw, remaining) = match after_eq.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let inner = &after_eq[1..];
                    match inner.find(quote) {
                        Some(close) => (&inner[..close], &inner[close + 1..]),
                        None => (inner, ""),
                    }
                }
                _ => {
                    let len = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
                    (&after_eq[..len], &after_eq[len..])
                }
            };
            value = decode_entities(raw);
            rest = remaining;
        }

        if !name.is_empty() {
            attrs.push((name, value));
        }
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
    }
    attrs
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&#43;", "+")
        .replace("&#x2B;", "+")
        .replace("&#61;", "=")
        .replace("&#x3D;", "=")
        .replace("&amp;", "&")
}
