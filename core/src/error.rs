//! Error types for executing and decoding requests.
//!
//! # Design
//! Two tiers. [`HttpError`] is the transport taxonomy: whatever went wrong
//! between handing a request to a transport and decoding a 2xx body. It is
//! never swallowed. [`CompositeError`] pairs a transport error with an
//! optional server-declared error parsed out of a bad-status body; the
//! server part is best effort and only ever present for `BadStatus`.

use std::fmt;

use thiserror::Error;

use crate::http::HttpResponse;

/// Failures reported by a transport or by response decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// The URL could not be turned into a request.
    #[error("bad url: {0}")]
    BadUrl(String),

    #[error("request timed out")]
    Timeout,

    /// Connection-level failure: DNS, refused connection, broken stream.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a status outside 200-299.
    #[error("bad status: {}", .0.status)]
    BadStatus(HttpResponse),

    /// A 2xx body did not decode into the expected type.
    #[error("bad payload: {message}")]
    BadPayload {
        message: String,
        response: HttpResponse,
    },
}

impl HttpError {
    /// Status code of the response this error carries, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::BadStatus(response) | HttpError::BadPayload { response, .. } => {
                Some(response.status)
            }
            _ => None,
        }
    }

    pub fn is_bad_status(&self) -> bool {
        matches!(self, HttpError::BadStatus(_))
    }
}

/// A transport error together with the server's own description of what
/// went wrong, when one could be decoded.
///
/// `server` is `Some` only when `transport` is [`HttpError::BadStatus`] and
/// its body matched the caller's error decoder. Values are built by
/// [`decode_errors`](crate::decode::decode_errors) or from a bare
/// [`HttpError`] and are not mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeError<E> {
    transport: HttpError,
    server: Option<E>,
}

impl<E> CompositeError<E> {
    pub(crate) fn with_server(transport: HttpError, server: E) -> Self {
        debug_assert!(transport.is_bad_status());
        Self {
            transport,
            server: Some(server),
        }
    }

    pub fn transport(&self) -> &HttpError {
        &self.transport
    }

    pub fn server(&self) -> Option<&E> {
        self.server.as_ref()
    }

    pub fn into_parts(self) -> (HttpError, Option<E>) {
        (self.transport, self.server)
    }
}

impl<E> From<HttpError> for CompositeError<E> {
    fn from(transport: HttpError) -> Self {
        Self {
            transport,
            server: None,
        }
    }
}

impl<E> fmt::Display for CompositeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.server {
            Some(_) => write!(f, "{} (server error decoded)", self.transport),
            None => write!(f, "{}", self.transport),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for CompositeError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn bad_status(status: u16) -> HttpError {
        HttpError::BadStatus(HttpResponse {
            status,
            headers: Vec::new(),
            body: String::new(),
        })
    }

    #[test]
    fn status_is_exposed_for_response_errors() {
        assert_eq!(bad_status(422).status(), Some(422));
        assert_eq!(HttpError::Timeout.status(), None);
        assert!(bad_status(500).is_bad_status());
        assert!(!HttpError::Network("refused".into()).is_bad_status());
    }

    #[test]
    fn display_messages() {
        assert_eq!(bad_status(404).to_string(), "bad status: 404");
        assert_eq!(HttpError::Timeout.to_string(), "request timed out");
        assert_eq!(
            HttpError::BadUrl("nope".into()).to_string(),
            "bad url: nope"
        );
    }

    #[test]
    fn composite_from_transport_has_no_server_error() {
        let err: CompositeError<String> = HttpError::Timeout.into();
        assert_eq!(err.transport(), &HttpError::Timeout);
        assert!(err.server().is_none());
        assert_eq!(err.to_string(), "request timed out");
    }

    #[test]
    fn composite_source_is_transport_error() {
        let err = CompositeError::with_server(bad_status(422), vec!["taken".to_string()]);
        assert_eq!(err.to_string(), "bad status: 422 (server error decoded)");
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "bad status: 422");
        let (transport, server) = err.into_parts();
        assert_eq!(transport, bad_status(422));
        assert_eq!(server, Some(vec!["taken".to_string()]));
    }
}
