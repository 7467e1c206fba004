//! Mapping of HTTP and transport failures to [`ProviderError`].

use augment_core::ProviderError;

/// Map a non-success HTTP status from the Anthropic API.
///
/// Reference: <https://docs.anthropic.com/en/api/errors>
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ProviderError {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v["error"]["message"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                body.to_string()
            }
        });

    match status.as_u16() {
        401 => ProviderError::Authentication(message),
        429 => ProviderError::RateLimited {
            status: 429,
            body: parsed,
        },
        code => ProviderError::Api {
            status: code,
            message,
            body: parsed,
        },
    }
}

/// Map a [`reqwest::Error`] to a [`ProviderError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    ProviderError::Network(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn unauthorized_is_authentication() {
        let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        match map_http_status(StatusCode::UNAUTHORIZED, body) {
            ProviderError::Authentication(msg) => assert_eq!(msg, "invalid x-api-key"),
            other => panic!("expected Authentication, got {other:?}"),
        }
    }

    #[test]
    fn forbidden_is_an_api_error() {
        let body = r#"{"type":"error","error":{"type":"permission_error","message":"Your API key does not have permission to use the specified resource."}}"#;
        let err = map_http_status(StatusCode::FORBIDDEN, body);
        assert!(!err.is_auth());
        assert_eq!(err.status(), Some(403));
        assert!(
            err.diagnostic().starts_with("Error code: 403 - {"),
            "{}",
            err.diagnostic()
        );
    }

    #[test]
    fn rate_limit_keeps_body() {
        let err = map_http_status(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"type":"rate_limit_error"}}"#,
        );
        assert_eq!(err.status(), Some(429));
        assert_eq!(
            err.diagnostic(),
            r#"Error code: 429 - {"error":{"type":"rate_limit_error"}}"#
        );
    }

    #[test]
    fn other_statuses_are_api_errors() {
        let err = map_http_status(
            StatusCode::from_u16(529).unwrap(),
            r#"{"error":{"message":"Overloaded"}}"#,
        );
        match err {
            ProviderError::Api {
                status,
                message,
                body,
            } => {
                assert_eq!(status, 529);
                assert_eq!(message, "Overloaded");
                assert_eq!(body, Some(json!({"error": {"message": "Overloaded"}})));
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn non_json_body_is_the_message() {
        match map_http_status(StatusCode::BAD_GATEWAY, "upstream down") {
            ProviderError::Api { message, body, .. } => {
                assert_eq!(message, "upstream down");
                assert!(body.is_none());
            }
            other => panic!("expected Api, got {other:?}"),
        }
        match map_http_status(StatusCode::INTERNAL_SERVER_ERROR, "") {
            ProviderError::Api { message, .. } => assert_eq!(message, "Internal Server Error"),
            other => panic!("expected Api, got {other:?}"),
        }
    }
}
