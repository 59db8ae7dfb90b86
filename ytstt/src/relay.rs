use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::RelayConfig;
use crate::download::download_audio;
use crate::error::{Error, Result};
use crate::resolve::{select_audio_format, watch_url, StreamResolver};
use crate::transcribe::{AudioUpload, Transcriber};
use crate::types::Transcript;

/// Resolve, download, transcribe and format a single video.
///
/// Stages run strictly in sequence. The audio buffer lives only for the
/// duration of one [`Relay::transcribe_video`] call.
pub struct Relay {
    config: RelayConfig,
    resolver: Arc<dyn StreamResolver>,
    transcriber: Arc<dyn Transcriber>,
    http: reqwest::Client,
}

impl Relay {
    /// Relay backed by yt-dlp and the configured Whisper API.
    #[cfg(feature = "yt-dlp")]
    pub fn new(config: RelayConfig) -> Result<Self> {
        use crate::resolve::YtDlpResolver;
        use crate::transcribe::WhisperApiClient;

        config.validate()?;
        let http = build_http_client(&config)?;
        let resolver = Arc::new(YtDlpResolver::new(config.yt_dlp_path.clone()));
        let transcriber = Arc::new(WhisperApiClient::new(http.clone(), &config));
        Ok(Self {
            config,
            resolver,
            transcriber,
            http,
        })
    }

    /// Relay with caller-supplied collaborators.
    pub fn with_collaborators(
        config: RelayConfig,
        resolver: Arc<dyn StreamResolver>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Result<Self> {
        config.validate()?;
        let http = build_http_client(&config)?;
        Ok(Self {
            config,
            resolver,
            transcriber,
            http,
        })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub async fn transcribe_video(&self, video_id: &str, language: &str) -> Result<Transcript> {
        if video_id.is_empty() {
            return Err(Error::MissingParameter("yt"));
        }

        let started = Instant::now();
        info!(video_id, language, "transcription requested");

        let page_url = watch_url(&self.config.watch_url_base, video_id);
        let formats = self.resolver.resolve(&page_url).await?;
        let format = select_audio_format(&formats)?;
        let audio_url = format.url.as_deref().ok_or(Error::NoAudioFormat)?;
        debug!(
            format_id = %format.format_id,
            abr = ?format.audio_bitrate,
            "selected audio format"
        );

        let limits = self.config.download_limits();
        let audio = download_audio(&self.http, audio_url, &limits).await?;

        let upload = AudioUpload {
            audio,
            filename: format!("{video_id}.{}", self.config.upload_extension),
            content_type: self.config.upload_content_type.clone(),
            language: language.to_string(),
        };
        let raw = self.transcriber.transcribe(upload).await?;
        let transcript = Transcript::from_raw(raw);

        info!(
            video_id,
            segments = transcript.segments.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "transcription complete"
        );
        Ok(transcript)
    }
}

fn build_http_client(config: &RelayConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::StreamDescriptor;
    use crate::transcribe::RawSegment;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl StreamResolver for Unreachable {
        async fn resolve(&self, _: &str) -> Result<Vec<StreamDescriptor>> {
            panic!("resolver must not be called");
        }
    }

    #[async_trait]
    impl Transcriber for Unreachable {
        async fn transcribe(&self, _: AudioUpload) -> Result<Vec<RawSegment>> {
            panic!("transcriber must not be called");
        }
    }

    struct NoFormats;

    #[async_trait]
    impl StreamResolver for NoFormats {
        async fn resolve(&self, _: &str) -> Result<Vec<StreamDescriptor>> {
            Ok(Vec::new())
        }
    }

    fn relay(resolver: Arc<dyn StreamResolver>) -> Relay {
        Relay::with_collaborators(RelayConfig::new("sk-test"), resolver, Arc::new(Unreachable))
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_video_id_touches_nothing() {
        let err = relay(Arc::new(Unreachable))
            .transcribe_video("", "pt")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingParameter("yt")));
    }

    #[tokio::test]
    async fn test_no_formats_stops_before_transcription() {
        let err = relay(Arc::new(NoFormats))
            .transcribe_video("abc", "pt")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoAudioFormat));
    }

    #[test]
    fn test_with_collaborators_validates_config() {
        let result = Relay::with_collaborators(
            RelayConfig::new(""),
            Arc::new(Unreachable),
            Arc::new(Unreachable),
        );
        assert!(matches!(result, Err(Error::InvalidOption(_))));
    }
}
