use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - check your username and password")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    /// The backend refused the request and said why (`{"error": "..."}`).
    #[error("{0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Deserialize)]
struct BackendErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|&i| body.is_char_boundary(i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    /// Pull the human readable message out of a backend error body.
    pub fn backend_message(body: &str) -> Option<String> {
        let parsed: BackendErrorBody = serde_json::from_str(body).ok()?;
        parsed
            .error
            .or(parsed.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let code = status.as_u16();
        if code == 429 {
            return ApiError::RateLimited;
        }
        if (400..500).contains(&code) {
            if let Some(message) = Self::backend_message(body) {
                return ApiError::Rejected(message);
            }
        }

        let truncated = Self::truncate_body(body);
        match code {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Message suitable for showing to the user verbatim.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected(message) => message.clone(),
            ApiError::Unauthorized => "Invalid username or password".to_string(),
            ApiError::NetworkError(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::NetworkError(_) => {
                "Unable to connect to server. Check that the backend is running.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Status-line text for an application error: the classified API error's
/// message when there is one, otherwise the outermost context.
pub fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api) => api.user_message(),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_backend_error_message_is_surfaced() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"error": "Invalid credentials"}"#,
        );
        assert!(matches!(err, ApiError::Rejected(ref m) if m == "Invalid credentials"));
        assert_eq!(err.user_message(), "Invalid credentials");

        let err = ApiError::from_status(StatusCode::CONFLICT, r#"{"message": "Username taken"}"#);
        assert_eq!(err.to_string(), "Username taken");
    }

    #[test]
    fn test_status_classification_without_body() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "nope"),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, r#"{"error": "slow down"}"#),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, r#"{"error": "upstream"}"#),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_describe_error() {
        let err = anyhow::Error::from(ApiError::Rejected("Username taken".to_string()))
            .context("Failed to register");
        assert_eq!(describe_error(&err), "Username taken");
        assert_eq!(describe_error(&anyhow::anyhow!("No bike data found.")), "No bike data found.");
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(600);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(500)));
        assert!(truncated.ends_with("(truncated, 600 total bytes)"));
        assert_eq!(ApiError::truncate_body("short"), "short");
    }

    #[test]
    fn test_backend_message_ignores_blank_and_non_json() {
        assert_eq!(ApiError::backend_message(r#"{"error": "  "}"#), None);
        assert_eq!(ApiError::backend_message("<html>oops</html>"), None);
    }
}
