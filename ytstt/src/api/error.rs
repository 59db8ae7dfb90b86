//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{json, Map, Value};

use super::json_response;
use crate::error::Error;

/// Diagnostic strings returned to clients are capped at this many characters.
pub const MAX_DETAILS_CHARS: usize = 600;

/// Failed request, rendered as `{"ok": false, "error": <code>, ...context}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub context: Map<String, Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            context: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    pub fn server_error(details: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "server_error")
            .with("details", truncate_details(details))
    }

    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("ok".into(), Value::Bool(false));
        body.insert("error".into(), self.code.clone().into());
        for (k, v) in &self.context {
            body.insert(k.clone(), v.clone());
        }
        Value::Object(body)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        json_response(self.status, &self.body())
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::MissingParameter(name) => {
                ApiError::new(StatusCode::BAD_REQUEST, format!("missing {name}"))
            }
            Error::NoAudioFormat => ApiError::new(StatusCode::NOT_FOUND, "no_audio_format"),
            Error::AudioFetchFailed { status } => {
                ApiError::new(StatusCode::BAD_GATEWAY, "audio_fetch_failed")
                    .with("status", status)
            }
            Error::AudioTooLarge { limit_bytes } => {
                ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "audio_too_large")
                    .with("limitMB", limit_mb(limit_bytes))
            }
            Error::DownloadTimeout { .. } => {
                ApiError::new(StatusCode::GATEWAY_TIMEOUT, "download_timeout")
            }
            Error::TranscriptionFailed { status, details } => {
                ApiError::new(StatusCode::BAD_GATEWAY, "whisper_failed")
                    .with("status", status)
                    .with("details", truncate_details(&details))
            }
            other => ApiError::server_error(&other.to_string()),
        }
    }
}

/// Keep at most [`MAX_DETAILS_CHARS`] characters.
pub fn truncate_details(details: &str) -> String {
    details.chars().take(MAX_DETAILS_CHARS).collect()
}

/// Byte limit expressed in MiB; whole numbers serialize without a fraction.
fn limit_mb(limit_bytes: u64) -> Value {
    const MIB: u64 = 1024 * 1024;
    if limit_bytes % MIB == 0 {
        json!(limit_bytes / MIB)
    } else {
        json!(limit_bytes as f64 / MIB as f64)
    }
}
