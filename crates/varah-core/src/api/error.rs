use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// 401 from any endpoint. The session has already been cleared by the
    /// time this error reaches the caller.
    #[error("Unauthorized - please log in again")]
    Unauthorized,

    /// Non-2xx response. Carries the server message verbatim so the UI can
    /// display it as-is.
    #[error("{0}")]
    Api(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Classify a reqwest transport failure. The client enforces a request
    /// deadline, so an elapsed timeout surfaces here as a reqwest error.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(err)
        }
    }

    /// Build an error for a failed JSON response. The message comes from the
    /// body's `message` field when present, falling back to a generic
    /// status-derived string.
    pub fn from_json_body(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from));

        match message {
            Some(msg) if !msg.is_empty() => ApiError::Api(msg),
            _ => ApiError::Api(format!("Server Error: {}", status.as_u16())),
        }
    }

    /// Build an error for a failed response that did not carry a JSON body.
    pub fn from_non_json(status: reqwest::StatusCode) -> Self {
        ApiError::Api(format!(
            "Server returned a non-JSON error page (Status: {})",
            status.as_u16()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_message_taken_from_body() {
        let err = ApiError::from_json_body(
            StatusCode::BAD_REQUEST,
            r#"{"message": "Invalid credentials"}"#,
        );
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_missing_message_falls_back_to_status() {
        let err = ApiError::from_json_body(StatusCode::BAD_REQUEST, r#"{"error": true}"#);
        assert_eq!(err.to_string(), "Server Error: 400");
    }

    #[test]
    fn test_unparseable_body_falls_back_to_status() {
        let err = ApiError::from_json_body(StatusCode::INTERNAL_SERVER_ERROR, "not json");
        assert_eq!(err.to_string(), "Server Error: 500");
    }

    #[test]
    fn test_empty_message_falls_back_to_status() {
        let err = ApiError::from_json_body(StatusCode::BAD_GATEWAY, r#"{"message": ""}"#);
        assert_eq!(err.to_string(), "Server Error: 502");
    }

    #[test]
    fn test_non_json_error_page() {
        let err = ApiError::from_non_json(StatusCode::BAD_GATEWAY);
        assert_eq!(
            err.to_string(),
            "Server returned a non-JSON error page (Status: 502)"
        );
    }
}
