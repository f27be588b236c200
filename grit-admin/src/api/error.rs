//! Typed errors at the HTTP boundary

use thiserror::Error;

use super::models::ErrorEnvelope;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("{message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    /// Non-2xx response without an error envelope
    #[error("request failed with status {status}")]
    Http { status: u16 },
    #[error("not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("session expired, run `grit-admin auth login`")]
    SessionExpired,
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("file error: {0}")]
    File(String),
}

impl ApiError {
    /// Build an error from a non-2xx response body
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<ErrorEnvelope>(body) {
            Err(_) if status == 401 => ApiError::Unauthorized,
            Ok(envelope) if status == 404 && envelope.error.message.is_empty() => {
                ApiError::NotFound
            }
            Ok(envelope) => ApiError::Api {
                status,
                code: envelope.error.code,
                message: envelope.error.message,
            },
            Err(_) if status == 404 => ApiError::NotFound,
            Err(_) => ApiError::Http { status },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound | ApiError::Api { status: 404, .. })
    }

    /// Message for a notification: the server's words when it sent any
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Api { message, .. } if !message.is_empty() => message.clone(),
            ApiError::SessionExpired => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
