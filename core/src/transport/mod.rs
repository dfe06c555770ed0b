//! The seam between request descriptions and an actual HTTP client.
//!
//! The core never performs I/O itself. Anything that can execute a
//! [`RequestParts`] and report the response as data implements
//! [`Transport`]; callers bring their own or enable the `ureq` feature.

use crate::error::HttpError;
use crate::http::HttpResponse;
use crate::request::RequestParts;

/// Executes a request description.
///
/// Responses of every status, 4xx and 5xx included, are returned as
/// `Ok`. Only failures that produced no response are reported as errors:
/// [`HttpError::BadUrl`], [`HttpError::Timeout`] or [`HttpError::Network`].
pub trait Transport {
    fn execute(&self, request: &RequestParts) -> Result<HttpResponse, HttpError>;
}

impl<F> Transport for F
where
    F: Fn(&RequestParts) -> Result<HttpResponse, HttpError>,
{
    fn execute(&self, request: &RequestParts) -> Result<HttpResponse, HttpError> {
        self(request)
    }
}

#[cfg(feature = "ureq")]
pub mod ureq;

#[cfg(feature = "ureq")]
pub use self::ureq::UreqTransport;
