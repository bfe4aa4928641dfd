use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned {status}: {message}")]
    Status {
        method: String,
        url: String,
        status: u16,
        message: String,
    },
    #[error("could not decode response from {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("the offline skill tree file is read-only")]
    ReadOnly,
}

impl ApiError {
    /// Text shown to the user in the blocking alert: the server's own message
    /// when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Pulls a human readable message out of an error response body.
///
/// Accepts `{"message": ...}`, `{"error": ...}` and `{"error": {"message": ...}}`.
pub fn server_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    let object = parsed.as_object()?;

    let message = object
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| object.get("error").and_then(Value::as_str))
        .or_else(|| {
            object
                .get("error")
                .and_then(Value::as_object)
                .and_then(|inner| inner.get("message"))
                .and_then(Value::as_str)
        })?;

    let message = message.trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_known_message_shapes() {
        assert_eq!(
            server_message(r#"{"message":"Edge already exists"}"#).as_deref(),
            Some("Edge already exists")
        );
        assert_eq!(
            server_message(r#"{"error":"Forbidden"}"#).as_deref(),
            Some("Forbidden")
        );
        assert_eq!(
            server_message(r#"{"error":{"message":"Cycle detected"}}"#).as_deref(),
            Some("Cycle detected")
        );
    }

    #[test]
    fn ignores_bodies_without_a_message() {
        assert_eq!(server_message("<html>502</html>"), None);
        assert_eq!(server_message(r#"{"message":"  "}"#), None);
        assert_eq!(server_message(r#"["message"]"#), None);
    }

    #[test]
    fn user_message_prefers_server_text() {
        let error = ApiError::Status {
            method: "POST".to_owned(),
            url: "http://localhost/edges".to_owned(),
            status: 409,
            message: "Edge already exists".to_owned(),
        };
        assert_eq!(error.user_message(), "Edge already exists");
        assert_eq!(
            ApiError::ReadOnly.user_message(),
            "the offline skill tree file is read-only"
        );
    }
}
