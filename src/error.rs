//! Error taxonomy shared by the session, API and form layers.

use serde_json::Value;

use crate::constants::REQUEST_TIMEOUT_SECS;

/// Authentication failures. All of these end the session and force a new login.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("No refresh token available")]
    MissingRefreshToken,

    #[error("Session expired: {0}")]
    RefreshRejected(String),

    #[error("Access token could not be decoded")]
    MalformedToken,

    #[error("Not logged in")]
    NotAuthenticated,
}

/// Client-side form checks. Recoverable, displayed next to the offending field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be a number")]
    NotANumber { field: &'static str },

    #[error("{field} must be between {min} and {max} {unit}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        unit: &'static str,
    },

    #[error("{field} must use the format {expected}")]
    InvalidFormat {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} must be one of: {choices}")]
    InvalidChoice {
        field: &'static str,
        choices: &'static str,
    },

    #[error("Enter a valid email address")]
    InvalidEmail,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Start date must not be after end date")]
    InvertedRange,
}

/// Any non-2xx response or transport failure, normalized for display.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} ({status})")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    /// Build from a failed `reqwest` call that produced no HTTP response.
    ///
    /// Transport failures report status 500 so callers can treat every
    /// failure through the same `{status, message}` shape.
    pub fn transport(err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("Request timed out ({}s)", REQUEST_TIMEOUT_SECS)
        } else if err.is_connect() {
            format!("Connection failed: {}", err)
        } else if err.is_decode() {
            format!("Unexpected response: {}", err)
        } else {
            format!("Request failed: {}", err)
        };
        ApiError::new(500, message)
    }

    /// Build from an HTTP error response body.
    ///
    /// Message priority: `detail`, then `message`, then the first field error
    /// of a validation payload, then a status-based fallback.
    pub fn from_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| message_from_payload(&json))
            .unwrap_or_else(|| format!("Request failed with status code {}", status));
        ApiError::new(status, message)
    }
}

fn message_from_payload(json: &Value) -> Option<String> {
    for key in ["detail", "message"] {
        if let Some(text) = json.get(key).and_then(Value::as_str) {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }

    // Field errors look like {"username": ["already taken"]}
    let object = json.as_object()?;
    object.iter().find_map(|(field, value)| {
        let first = match value {
            Value::Array(items) => items.first().and_then(Value::as_str),
            Value::String(text) => Some(text.as_str()),
            _ => None,
        }?;
        if field == "non_field_errors" {
            Some(first.to_string())
        } else {
            Some(format!("{}: {}", field, first))
        }
    })
}

/// Umbrella error returned by the library's public operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    /// HTTP-ish status for display; auth failures map to 401.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth(_) => Some(401),
            Error::Validation(_) => None,
            Error::Api(api) => Some(api.status),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Human-readable text without the status suffix.
    pub fn user_message(&self) -> String {
        match self {
            Error::Api(api) => api.message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result alias for library operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_takes_priority() {
        let err = ApiError::from_body(400, r#"{"detail": "Bad input", "message": "other"}"#);
        assert_eq!(err.status, 400);
        assert_eq!(err.message, "Bad input");
    }

    #[test]
    fn test_message_field_used_without_detail() {
        let err = ApiError::from_body(500, r#"{"message": "Database down"}"#);
        assert_eq!(err.message, "Database down");
    }

    #[test]
    fn test_field_errors_are_flattened() {
        let err = ApiError::from_body(400, r#"{"username": ["A user with that username already exists."]}"#);
        assert_eq!(err.message, "username: A user with that username already exists.");

        let err = ApiError::from_body(400, r#"{"non_field_errors": ["Invalid range"]}"#);
        assert_eq!(err.message, "Invalid range");
    }

    #[test]
    fn test_fallback_for_non_json_body() {
        let err = ApiError::from_body(502, "<html>Bad Gateway</html>");
        assert_eq!(err.message, "Request failed with status code 502");

        let err = ApiError::from_body(404, "");
        assert_eq!(err, ApiError::new(404, "Request failed with status code 404"));
    }

    #[test]
    fn test_error_status_mapping() {
        let auth: Error = AuthError::MissingRefreshToken.into();
        assert_eq!(auth.status(), Some(401));
        assert!(auth.is_auth());

        let validation: Error = ValidationError::InvalidEmail.into();
        assert_eq!(validation.status(), None);

        let api: Error = ApiError::new(403, "Forbidden").into();
        assert_eq!(api.status(), Some(403));
        assert_eq!(api.user_message(), "Forbidden");
    }

    #[test]
    fn test_validation_messages() {
        let err = ValidationError::OutOfRange {
            field: "Weight",
            min: 10.0,
            max: 300.0,
            unit: "kg",
        };
        assert_eq!(err.to_string(), "Weight must be between 10 and 300 kg");
    }
}
