//! HTTP surface: a single `/api/stt` endpoint returning JSON.

pub mod error;

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

pub use error::ApiError;

use crate::error::Error;
use crate::relay::Relay;

/// Path the transcription endpoint is mounted on.
pub const STT_PATH: &str = "/api/stt";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Headers set on every response, including router-generated ones.
fn common_headers() -> [(HeaderName, &'static str); 5] {
    [
        (header::CONTENT_TYPE, JSON_CONTENT_TYPE),
        (header::CACHE_CONTROL, "no-store"),
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            "authorization,content-type",
        ),
        (header::ACCESS_CONTROL_ALLOW_METHODS, "GET,POST,OPTIONS"),
    ]
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

/// Query parameters of a transcription request.
#[derive(Debug, Default, PartialEq)]
pub struct SttParams {
    pub yt: Option<String>,
    pub lang: Option<String>,
}

impl SttParams {
    /// Keeps the first value of each known key. Repeats and unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "yt" if params.yt.is_none() => params.yt = Some(value),
                "lang" if params.lang.is_none() => params.lang = Some(value),
                _ => {}
            }
        }
        params
    }
}

/// Create the API router.
///
/// Methods other than OPTIONS all reach [`stt`], and unknown paths get a
/// JSON 404.
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .route(
            STT_PATH,
            get(stt).post(stt).options(preflight).fallback(stt),
        )
        .fallback(not_found);

    common_headers()
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::overriding(
                name,
                HeaderValue::from_static(value),
            ))
        })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Transcribe the video named by `yt`.
///
/// Parameters always come from the query string, whatever the method.
pub async fn stt(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(pairs) = query
        .map_err(|rejection| ApiError::server_error(&rejection.body_text()))?;
    let params = SttParams::from_pairs(pairs);

    let video_id = params
        .yt
        .filter(|id| !id.is_empty())
        .ok_or(Error::MissingParameter("yt"))?;
    let language = params
        .lang
        .unwrap_or_else(|| state.relay.config().default_language.clone());

    let transcript = state.relay.transcribe_video(&video_id, &language).await?;

    let body = json!({
        "ok": true,
        "text": transcript.text(),
        "vtt": transcript.to_vtt(),
        "segments": transcript.segments,
    });
    Ok(json_response(StatusCode::OK, &body))
}

async fn preflight() -> Response {
    json_response(StatusCode::OK, &json!({"ok": true}))
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not_found")
}

/// Serialize `body` as the JSON reply with the given status.
pub fn json_response(status: StatusCode, body: &Value) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
        body.to_string(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &[(&str, &str)]) -> Vec<(String, String)> {
        query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_json_response_status_and_content_type() {
        let response = json_response(StatusCode::BAD_GATEWAY, &json!({"ok": false}));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.headers()[header::CONTENT_TYPE], JSON_CONTENT_TYPE);
    }

    #[test]
    fn test_params_default_to_none() {
        assert_eq!(SttParams::from_pairs(Vec::new()), SttParams::default());
    }

    #[test]
    fn test_params_keep_first_value() {
        let params = SttParams::from_pairs(pairs(&[
            ("lang", "en"),
            ("yt", "abc"),
            ("utm", "x"),
            ("yt", "zzz"),
            ("lang", "fr"),
        ]));
        assert_eq!(params.yt.as_deref(), Some("abc"));
        assert_eq!(params.lang.as_deref(), Some("en"));
    }

    #[test]
    fn test_params_empty_values_are_kept() {
        let params = SttParams::from_pairs(pairs(&[("yt", ""), ("lang", "")]));
        assert_eq!(params.yt.as_deref(), Some(""));
        assert_eq!(params.lang.as_deref(), Some(""));
    }
}
