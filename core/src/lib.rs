//! Request builder and error decoder for conventional JSON web backends.
//!
//! # Overview
//! Builds request descriptions that carry the headers a CSRF-protected,
//! server-rendered backend expects (`Accept`, `X-Requested-With`,
//! `X-CSRF-Token`) and decodes the structured error bodies such backends
//! send with non-2xx responses. The core never performs I/O: a
//! [`Transport`] executes the descriptions (host-does-IO pattern).
//!
//! # Design
//! - `XhrClient` is stateless apart from its convention table and token
//!   provider; building a request cannot fail.
//! - The CSRF token comes from an injected [`TokenProvider`] rather than a
//!   global, so the present and absent cases are plain values.
//! - Header conventions live in one [`Conventions`] table that can be
//!   swapped for another backend family.
//! - Transport failures are never swallowed; server-declared errors are
//!   best effort and sit beside them in a [`CompositeError`].
//!
//! ```
//! use xhr_core::{Body, Expect, HttpError, HttpResponse, RequestParts, StaticToken, XhrClient};
//! use xhr_core::{DecodeErrors, ValidationErrors};
//!
//! let client = XhrClient::new(StaticToken::present("s3cr3t"));
//! let request = client.post(
//!     "https://example.test/users",
//!     Body::json(&serde_json::json!({"name": ""})).unwrap(),
//!     Expect::<serde_json::Value>::json(),
//! );
//! assert!(request.headers().iter().any(|(n, v)| n == "X-CSRF-Token" && v == "s3cr3t"));
//!
//! let transport = |_: &RequestParts| -> Result<HttpResponse, HttpError> {
//!     Ok(HttpResponse {
//!         status: 422,
//!         headers: Vec::new(),
//!         body: r#"{"errors":{"name":["can't be blank"]}}"#.to_string(),
//!     })
//! };
//! let err = request.send(&transport).decode_errors::<ValidationErrors>().unwrap_err();
//! assert_eq!(err.server().unwrap().field("name"), ["can't be blank".to_string()]);
//! ```

pub mod client;
pub mod decode;
pub mod error;
pub mod headers;
pub mod http;
pub mod request;
pub mod token;
pub mod transport;
pub mod validation;

pub use client::XhrClient;
pub use decode::{decode_errors, decode_errors_with, DecodeErrors};
pub use error::{CompositeError, HttpError};
pub use headers::{Conventions, HeaderRule};
pub use http::{Body, Expect, Header, HttpMethod, HttpResponse};
pub use request::{HttpRequest, RequestConfig, RequestParts};
pub use token::{EnvToken, MetaTagToken, StaticToken, TokenAbsent, TokenProvider};
pub use transport::Transport;
pub use validation::ValidationErrors;

#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
