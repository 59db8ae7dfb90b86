use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::RelayConfig;
use crate::error::{Error, Result};

/// Audio handed to a transcription service.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub audio: Vec<u8>,
    pub filename: String,
    pub content_type: String,
    pub language: String,
}

/// A segment as returned by the service, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    #[serde(default)]
    pub text: Option<String>,
}

/// The subset of a `verbose_json` response the relay uses.
#[derive(Debug, Default, Deserialize)]
pub struct VerboseTranscription {
    #[serde(default)]
    pub segments: Option<Vec<RawSegment>>,
}

/// A speech-to-text backend.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, upload: AudioUpload) -> Result<Vec<RawSegment>>;
}

/// Client for an OpenAI-compatible `/audio/transcriptions` endpoint.
#[derive(Clone)]
pub struct WhisperApiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl WhisperApiClient {
    pub fn new(http: reqwest::Client, config: &RelayConfig) -> Self {
        Self {
            http,
            endpoint: config.transcription_url(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl Transcriber for WhisperApiClient {
    async fn transcribe(&self, upload: AudioUpload) -> Result<Vec<RawSegment>> {
        info!(
            bytes = upload.audio.len(),
            filename = %upload.filename,
            language = %upload.language,
            model = %self.model,
            "uploading audio for transcription"
        );

        let file = Part::bytes(upload.audio)
            .file_name(upload.filename)
            .mime_str(&upload.content_type)?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("language", upload.language)
            .text("response_format", "verbose_json");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                "transcription service returned an error"
            );
            return Err(Error::TranscriptionFailed {
                status: status.as_u16(),
                details,
            });
        }

        let body: VerboseTranscription = response.json().await?;
        let segments = body.segments.unwrap_or_default();
        debug!(num_segments = segments.len(), "transcription received");
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_transcription_parses_segments() {
        let json = r#"{
            "task": "transcribe",
            "language": "portuguese",
            "duration": 3.0,
            "text": "Olá mundo",
            "segments": [
                {"id": 0, "start": 0.0, "end": 1.5, "text": " Olá", "avg_logprob": -0.2},
                {"id": 1, "start": 1.5, "end": 3.0, "text": " mundo"}
            ]
        }"#;
        let body: VerboseTranscription = serde_json::from_str(json).unwrap();
        let segments = body.segments.unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text.as_deref(), Some(" Olá"));
        assert_eq!(segments[1].end, 3.0);
    }

    #[test]
    fn test_verbose_transcription_missing_or_null_segments() {
        let body: VerboseTranscription = serde_json::from_str(r#"{"text": ""}"#).unwrap();
        assert!(body.segments.is_none());

        let body: VerboseTranscription = serde_json::from_str(r#"{"segments": null}"#).unwrap();
        assert!(body.segments.unwrap_or_default().is_empty());
    }

    #[test]
    fn test_raw_segment_missing_text() {
        let seg: RawSegment = serde_json::from_str(r#"{"start": 1, "end": 2}"#).unwrap();
        assert_eq!(seg.start, 1.0);
        assert_eq!(seg.text, None);
    }
}
