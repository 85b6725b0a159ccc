//! Errors raised by the remote adapters.

use reqwest::blocking::Response;
use thiserror::Error;

/// Remote call errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    /// The request never produced a response (DNS, TLS, timeout, refused).
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-2xx status.
    #[error("Remote API error ({status}): {message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The request was rejected before being sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A non-HTTP backend failed (e.g. the offline SQLite store).
    #[error("Backend error: {0}")]
    Backend(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

impl RemoteError {
    /// True for 401/403 answers.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RemoteError::Status { status: 401 | 403, .. })
    }

    /// True for answers where the server rejected the payload or filter.
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            RemoteError::Status {
                status: 400 | 404 | 409 | 422,
                ..
            }
        )
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else if e.is_builder() {
            RemoteError::InvalidRequest(e.to_string())
        } else {
            RemoteError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(e: serde_json::Error) -> Self {
        RemoteError::Decode(e.to_string())
    }
}

/// Pull a human-readable message out of an error body.
///
/// The data API answers `{"message": ..}`, the auth API `{"msg": ..}` or
/// `{"error_description": ..}`. Anything else is returned trimmed.
pub fn extract_error_message(body: &str) -> String {
    let parsed = body
        .find('{')
        .zip(body.rfind('}'))
        .filter(|(start, end)| start < end)
        .and_then(|(start, end)| serde_json::from_str::<serde_json::Value>(&body[start..=end]).ok());

    if let Some(value) = parsed {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "<empty body>".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Map non-2xx responses to [`RemoteError::Status`].
pub(crate) fn ensure_success(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(RemoteError::Status {
        status: status.as_u16(),
        message: extract_error_message(&body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_data_api_message() {
        let body = r#"{"code":"23502","details":null,"hint":null,"message":"null value in column \"name\""}"#;
        assert_eq!(extract_error_message(body), "null value in column \"name\"");
    }

    #[test]
    fn test_extract_auth_message() {
        assert_eq!(
            extract_error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(
            extract_error_message(r#"{"code":422,"msg":"Password should be at least 6 characters"}"#),
            "Password should be at least 6 characters"
        );
    }

    #[test]
    fn test_extract_plain_body() {
        assert_eq!(extract_error_message("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(extract_error_message(""), "<empty body>");
    }

    #[test]
    fn test_status_classification() {
        let unauthorized = RemoteError::Status {
            status: 401,
            message: "JWT expired".into(),
        };
        assert!(unauthorized.is_unauthorized());
        assert!(!unauthorized.is_rejected());

        let rejected = RemoteError::Status {
            status: 422,
            message: "bad".into(),
        };
        assert!(rejected.is_rejected());
        assert!(!RemoteError::Network("refused".into()).is_rejected());
    }
}
