//! Decoding server-declared errors out of failed requests.
//!
//! Only a [`HttpError::BadStatus`] carries a body worth decoding. Every other
//! failure is wrapped as-is and the error decoder is never called. A body
//! that does not match the decoder leaves the server part empty; the
//! mismatch itself is logged and dropped.

use std::fmt;

use serde::de::DeserializeOwned;

use crate::error::{CompositeError, HttpError};

/// Decode a bad-status body with `error_decoder`, passing successes through.
pub fn decode_errors_with<T, E, D, DE>(
    error_decoder: D,
    outcome: Result<T, HttpError>,
) -> Result<T, CompositeError<E>>
where
    D: FnOnce(&str) -> Result<E, DE>,
    DE: fmt::Display,
{
    let transport = match outcome {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    let decoded = match &transport {
        HttpError::BadStatus(response) => Some((response.status, error_decoder(&response.body))),
        _ => None,
    };

    match decoded {
        Some((_, Ok(server))) => Err(CompositeError::with_server(transport, server)),
        Some((status, Err(err))) => {
            tracing::debug!(status, error = %err, "error body did not match the expected shape");
            Err(CompositeError::from(transport))
        }
        None => Err(CompositeError::from(transport)),
    }
}

/// Decode a bad-status body as JSON into `E`.
pub fn decode_errors<E, T>(outcome: Result<T, HttpError>) -> Result<T, CompositeError<E>>
where
    E: DeserializeOwned,
{
    decode_errors_with(|body| serde_json::from_str::<E>(body), outcome)
}

/// Method-call form of [`decode_errors`] and [`decode_errors_with`].
pub trait DecodeErrors<T> {
    fn decode_errors<E: DeserializeOwned>(self) -> Result<T, CompositeError<E>>;

    fn decode_errors_with<E, D, DE>(self, error_decoder: D) -> Result<T, CompositeError<E>>
    where
        D: FnOnce(&str) -> Result<E, DE>,
        DE: fmt::Display;
}

impl<T> DecodeErrors<T> for Result<T, HttpError> {
    fn decode_errors<E: DeserializeOwned>(self) -> Result<T, CompositeError<E>> {
        decode_errors(self)
    }

    fn decode_errors_with<E, D, DE>(self, error_decoder: D) -> Result<T, CompositeError<E>>
    where
        D: FnOnce(&str) -> Result<E, DE>,
        DE: fmt::Display,
    {
        decode_errors_with(error_decoder, self)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde::Deserialize;

    use super::*;
    use crate::http::HttpResponse;

    #[derive(Debug, Deserialize)]
    struct Envelope {
        errors: NameErrors,
    }

    #[derive(Debug, Deserialize)]
    struct NameErrors {
        name: Vec<String>,
    }

    fn name_errors(body: &str) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_str::<Envelope>(body).map(|e| e.errors.name)
    }

    fn bad_status(status: u16, body: &str) -> HttpError {
        HttpError::BadStatus(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        })
    }

    #[test]
    fn success_passes_through() {
        let outcome: Result<u32, HttpError> = Ok(7);
        let decoded = decode_errors_with(name_errors, outcome);
        assert_eq!(decoded, Ok(7));
    }

    #[test]
    fn bad_status_with_matching_body_decodes() {
        let failure = bad_status(422, r#"{"errors":{"name":["can't be blank"]}}"#);
        let err = decode_errors_with(name_errors, Err::<(), _>(failure.clone())).unwrap_err();
        assert_eq!(err.server(), Some(&vec!["can't be blank".to_string()]));
        assert_eq!(err.transport(), &failure);
    }

    #[test]
    fn bad_status_with_unexpected_body_has_no_server_error() {
        for body in [r#"{"unexpected":true}"#, "<html>oops</html>", ""] {
            let failure = bad_status(422, body);
            let err = decode_errors_with(name_errors, Err::<(), _>(failure.clone())).unwrap_err();
            assert!(err.server().is_none(), "{body}");
            assert_eq!(err.transport(), &failure);
        }
    }

    #[test]
    fn other_failures_never_invoke_decoder() {
        let failures = [
            HttpError::Timeout,
            HttpError::Network("connection refused".to_string()),
            HttpError::BadUrl("::".to_string()),
            HttpError::BadPayload {
                message: "expected value".to_string(),
                response: HttpResponse {
                    status: 200,
                    headers: Vec::new(),
                    body: r#"{"errors":{"name":["x"]}}"#.to_string(),
                },
            },
        ];
        for failure in failures {
            let calls = Cell::new(0);
            let decoder = |body: &str| {
                calls.set(calls.get() + 1);
                name_errors(body)
            };
            let err = decode_errors_with(decoder, Err::<(), _>(failure.clone())).unwrap_err();
            assert_eq!(calls.get(), 0, "{failure:?}");
            assert!(err.server().is_none());
            assert_eq!(err.transport(), &failure);
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Message {
        error: String,
    }

    #[test]
    fn serde_form_decodes_json() {
        let outcome: Result<(), _> = Err(bad_status(403, r#"{"error":"forbidden"}"#));
        let err = decode_errors::<Message, _>(outcome).unwrap_err();
        assert_eq!(
            err.server(),
            Some(&Message {
                error: "forbidden".to_string()
            })
        );
    }

    #[test]
    fn extension_trait_forms() {
        let outcome: Result<(), HttpError> = Err(bad_status(500, r#"{"error":"boom"}"#));
        let err = outcome.clone().decode_errors::<Message>().unwrap_err();
        assert_eq!(err.server().map(|m| m.error.as_str()), Some("boom"));

        let err = outcome.decode_errors_with(name_errors).unwrap_err();
        assert!(err.server().is_none());

        let ok: Result<&str, HttpError> = Ok("fine");
        assert_eq!(ok.decode_errors::<Message>(), Ok("fine"));
    }
}
