//! Blocking transport backed by a `ureq` agent.

use std::time::Duration;

use ::ureq::http;
use ::ureq::Agent;

use super::Transport;
use crate::error::HttpError;
use crate::http::{Body, HttpResponse};
use crate::request::RequestParts;

/// Executes requests with `ureq`, reporting every status as data.
///
/// A request carrying a timeout runs on a one-off agent configured with that
/// timeout; everything else shares the transport's agent. The credentials
/// flag only matters to browser clients and is ignored here.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self {
            agent: build_agent(None),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &RequestParts) -> Result<HttpResponse, HttpError> {
        let one_off;
        let agent = match request.timeout() {
            Some(timeout) => {
                one_off = build_agent(Some(timeout));
                &one_off
            }
            None => &self.agent,
        };

        let mut builder = http::Request::builder()
            .method(request.method().as_str())
            .uri(request.url());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let result = match request.body() {
            Body::Empty => {
                let req = builder.body(()).map_err(invalid_request)?;
                agent.run(req)
            }
            Body::Text {
                content_type,
                content,
            } => {
                let req = builder
                    .header(http::header::CONTENT_TYPE, content_type.as_str())
                    .body(content.clone())
                    .map_err(invalid_request)?;
                agent.run(req)
            }
        };
        let mut response = result.map_err(from_ureq)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.body_mut().read_to_string().map_err(from_ureq)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn build_agent(timeout: Option<Duration>) -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(timeout)
        .build()
        .new_agent()
}

/// The request could not be assembled: unparsable URL, method or header.
fn invalid_request(err: http::Error) -> HttpError {
    HttpError::BadUrl(err.to_string())
}

fn from_ureq(err: ::ureq::Error) -> HttpError {
    match err {
        ::ureq::Error::Timeout(_) => HttpError::Timeout,
        ::ureq::Error::BadUri(message) => HttpError::BadUrl(message),
        ::ureq::Error::Http(err) => invalid_request(err),
        other => HttpError::Network(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn parts(url: &str) -> RequestParts {
        RequestParts {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Vec::new(),
            body: Body::Empty,
            timeout: None,
            with_credentials: false,
        }
    }

    #[test]
    fn unparsable_url_is_bad_url() {
        let err = UreqTransport::new().execute(&parts("not a url")).unwrap_err();
        assert!(matches!(err, HttpError::BadUrl(_)), "{err:?}");
    }

    #[test]
    fn invalid_header_name_is_rejected_before_sending() {
        let mut request = parts("http://127.0.0.1:9/");
        request.headers.push(("bad header".to_string(), "v".to_string()));
        let err = UreqTransport::new().execute(&request).unwrap_err();
        assert!(matches!(err, HttpError::BadUrl(_)), "{err:?}");
    }

    #[test]
    fn ureq_errors_map_onto_taxonomy() {
        assert_eq!(
            from_ureq(::ureq::Error::BadUri("bad".to_string())),
            HttpError::BadUrl("bad".to_string())
        );
        assert!(matches!(
            from_ureq(::ureq::Error::HostNotFound),
            HttpError::Network(_)
        ));
    }
}
