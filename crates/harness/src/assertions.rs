//! Assertion helpers for response callbacks.
//!
//! Each helper returns `Err(AssertionFailure)` on mismatch so callbacks can
//! chain them with `?`:
//!
//! ```ignore
//! |result| {
//!     let response = assert_no_error(result)?;
//!     assert_status(response, 200)?;
//!     assert_body(response, "Hello, World!")
//! }
//! ```

use std::time::Duration;

use regex::Regex;
use serde_json::Value;
use wisent_domain::{AssertionFailure, CaseOutcome, HttpResponse, StatusExpectation};

use crate::ports::ExecResult;

/// Fails if the request itself failed; yields the response otherwise.
///
/// # Errors
///
/// Returns a failure carrying the transport error.
pub fn assert_no_error(result: &ExecResult) -> Result<&HttpResponse, AssertionFailure> {
    result
        .as_ref()
        .map_err(|e| AssertionFailure::new(format!("Error performing the request: {e}")))
}

/// Checks the status code.
///
/// # Errors
///
/// Returns a failure when the status differs.
pub fn assert_status(response: &HttpResponse, expected: u16) -> CaseOutcome {
    assert_status_in(response, StatusExpectation::Exact(expected))
}

/// Checks the status code against a range or a set of codes.
///
/// # Errors
///
/// Returns a failure when the status does not match.
pub fn assert_status_in(
    response: &HttpResponse,
    expected: impl Into<StatusExpectation>,
) -> CaseOutcome {
    let expected = expected.into();
    if expected.matches(response.status) {
        Ok(())
    } else {
        Err(AssertionFailure::new(format!(
            "Incorrect status code, got: {}, want: {expected}",
            response.status
        )))
    }
}

/// Checks that the body equals `expected` exactly.
///
/// # Errors
///
/// Returns a failure showing both bodies on mismatch.
pub fn assert_body(response: &HttpResponse, expected: &str) -> CaseOutcome {
    let actual = response.text();
    if actual == expected {
        Ok(())
    } else {
        Err(AssertionFailure::new(format!(
            "Body mismatch\nExpected: {expected}\nActual: {actual}"
        )))
    }
}

/// Checks that the body contains `text`.
///
/// # Errors
///
/// Returns a failure when the text is absent.
pub fn assert_body_contains(response: &HttpResponse, text: &str) -> CaseOutcome {
    let body = response.text();
    if body.contains(text) {
        Ok(())
    } else {
        Err(AssertionFailure::new(format!(
            "Body does not contain '{text}'\nActual: {body}"
        )))
    }
}

/// Checks the body against a regular expression.
///
/// # Errors
///
/// Returns a failure when the pattern is invalid or does not match.
pub fn assert_body_matches(response: &HttpResponse, pattern: &str) -> CaseOutcome {
    let regex = Regex::new(pattern)
        .map_err(|e| AssertionFailure::new(format!("Invalid regex pattern '{pattern}': {e}")))?;
    let body = response.text();
    if regex.is_match(&body) {
        Ok(())
    } else {
        Err(AssertionFailure::new(format!(
            "Body does not match pattern '{pattern}'\nActual: {body}"
        )))
    }
}

/// Checks that a header is present and, if `expected` is given, its value.
///
/// # Errors
///
/// Returns a failure when the header is missing or differs.
pub fn assert_header(response: &HttpResponse, name: &str, expected: Option<&str>) -> CaseOutcome {
    let Some(actual) = response.header(name) else {
        return Err(AssertionFailure::new(format!("Header '{name}' not found")));
    };
    match expected {
        Some(expected) if actual != expected => Err(AssertionFailure::new(format!(
            "Header '{name}' value mismatch: expected '{expected}', got '{actual}'"
        ))),
        _ => Ok(()),
    }
}

/// Checks the JSON value at an RFC 6901 pointer such as `/status`.
///
/// # Errors
///
/// Returns a failure when the body is not JSON, the pointer is absent or the
/// value differs.
pub fn assert_json_pointer(response: &HttpResponse, pointer: &str, expected: &Value) -> CaseOutcome {
    let body: Value = response
        .json()
        .map_err(|e| AssertionFailure::new(format!("Response is not valid JSON: {e}")))?;
    match body.pointer(pointer) {
        Some(actual) if actual == expected => Ok(()),
        Some(actual) => Err(AssertionFailure::new(format!(
            "JSON value mismatch at '{pointer}'\nExpected: {expected}\nActual: {actual}"
        ))),
        None => Err(AssertionFailure::new(format!(
            "JSON pointer '{pointer}' not found"
        ))),
    }
}

/// Checks that the response arrived within `max`.
///
/// # Errors
///
/// Returns a failure when the response was slower.
pub fn assert_response_time(response: &HttpResponse, max: Duration) -> CaseOutcome {
    if response.duration <= max {
        Ok(())
    } else {
        Err(AssertionFailure::new(format!(
            "Response took {}ms, expected <= {}ms",
            response.duration.as_millis(),
            max.as_millis()
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ports::TransportError;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wisent_domain::Headers;

    fn response(status: u16, body: &str) -> HttpResponse {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain; charset=utf-8");
        HttpResponse::new(status, headers, body.into(), Duration::from_millis(12))
    }

    fn message(outcome: CaseOutcome) -> String {
        outcome.unwrap_err().message
    }

    #[test]
    fn test_no_error() {
        let ok: ExecResult = Ok(response(200, "ok"));
        assert_eq!(assert_no_error(&ok).unwrap().status, 200);

        let err: ExecResult = Err(TransportError::ConnectionRefused {
            host: "127.0.0.1".to_string(),
            port: 8080,
        });
        assert_eq!(
            assert_no_error(&err).unwrap_err().message,
            "Error performing the request: connection refused by 127.0.0.1:8080"
        );
    }

    #[test]
    fn test_status() {
        let response = response(400, "Invalid request body");
        assert!(assert_status(&response, 400).is_ok());
        assert!(assert_status_in(&response, 400_u16..=499).is_ok());
        assert!(assert_status_in(&response, &[200_u16, 400][..]).is_ok());
        assert!(assert_status_in(&response, StatusExpectation::success()).is_err());
        assert_eq!(
            message(assert_status(&response, 200)),
            "Incorrect status code, got: 400, want: 200"
        );
    }

    #[test]
    fn test_body() {
        let response = response(200, "Hello, World!");
        assert!(assert_body(&response, "Hello, World!").is_ok());
        assert_eq!(
            message(assert_body(&response, "Hello, Rust!")),
            "Body mismatch\nExpected: Hello, Rust!\nActual: Hello, World!"
        );
        assert!(assert_body_contains(&response, "World").is_ok());
        assert!(assert_body_contains(&response, "Rust").is_err());
    }

    #[test]
    fn test_body_matches() {
        let response = response(200, "Hello, World!");
        assert!(assert_body_matches(&response, r"^Hello, \w+!$").is_ok());
        assert!(assert_body_matches(&response, r"^Bye").is_err());
        assert!(
            message(assert_body_matches(&response, "(")).starts_with("Invalid regex pattern '('")
        );
    }

    #[test]
    fn test_header() {
        let response = response(200, "");
        assert!(assert_header(&response, "content-type", None).is_ok());
        assert!(
            assert_header(&response, "Content-Type", Some("text/plain; charset=utf-8")).is_ok()
        );
        assert_eq!(
            message(assert_header(&response, "X-Request-Id", None)),
            "Header 'X-Request-Id' not found"
        );
        assert!(assert_header(&response, "Content-Type", Some("application/json")).is_err());
    }

    #[test]
    fn test_json_pointer() {
        let response = response(200, r#"{"status":"ok","checks":[{"db":true}]}"#);
        assert!(assert_json_pointer(&response, "/status", &json!("ok")).is_ok());
        assert!(assert_json_pointer(&response, "/checks/0/db", &json!(true)).is_ok());
        assert_eq!(
            message(assert_json_pointer(&response, "/missing", &json!(1))),
            "JSON pointer '/missing' not found"
        );
        assert!(assert_json_pointer(&response, "/status", &json!("down")).is_err());

        let not_json = HttpResponse::default();
        assert!(message(assert_json_pointer(&not_json, "/status", &json!("ok")))
            .starts_with("Response is not valid JSON"));
    }

    #[test]
    fn test_response_time() {
        let response = response(200, "");
        assert!(assert_response_time(&response, Duration::from_millis(12)).is_ok());
        assert_eq!(
            message(assert_response_time(&response, Duration::from_millis(5))),
            "Response took 12ms, expected <= 5ms"
        );
    }
}
