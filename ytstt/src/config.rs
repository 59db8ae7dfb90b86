use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::download::DownloadLimits;
use crate::error::{Error, Result};

/// Default transcription service root (OpenAI-compatible).
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
/// Default transcription model identifier.
pub const DEFAULT_MODEL: &str = "whisper-1";
/// Language hint used when a request does not specify one.
pub const DEFAULT_LANGUAGE: &str = "pt";
/// 25 MiB, the upload ceiling of the hosted Whisper API.
pub const DEFAULT_MAX_AUDIO_BYTES: u64 = 25 * 1024 * 1024;
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(45);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// Environment variable holding the transcription service bearer token.
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";

/// Builder for relay configuration.
///
/// The bearer credential is passed in explicitly; nothing in the request
/// path reads the process environment. Use [`RelayConfig::from_env`] at
/// startup if the environment is where the secret lives.
#[derive(Clone)]
pub struct RelayConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub default_language: String,
    pub max_audio_bytes: u64,
    pub download_timeout: Duration,
    pub connect_timeout: Duration,
    pub upload_extension: String,
    pub upload_content_type: String,
    pub watch_url_base: String,
    pub yt_dlp_path: PathBuf,
}

impl RelayConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.into(),
            model: DEFAULT_MODEL.into(),
            default_language: DEFAULT_LANGUAGE.into(),
            max_audio_bytes: DEFAULT_MAX_AUDIO_BYTES,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            upload_extension: "m4a".into(),
            upload_content_type: "audio/mp4".into(),
            watch_url_base: DEFAULT_WATCH_URL_BASE.into(),
            yt_dlp_path: PathBuf::from("yt-dlp"),
        }
    }

    /// Build from `OPENAI_API_KEY` plus optional `YTSTT_*` overrides.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(ENV_API_KEY)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::InvalidOption(format!("{ENV_API_KEY} is not set")))?;

        let mut config = Self::new(api_key);

        if let Some(base) = lookup("YTSTT_API_BASE") {
            config = config.api_base(base);
        }
        if let Some(model) = lookup("YTSTT_MODEL") {
            config = config.model(model);
        }
        if let Some(lang) = lookup("YTSTT_DEFAULT_LANGUAGE") {
            config = config.default_language(lang);
        }
        if let Some(raw) = lookup("YTSTT_MAX_AUDIO_MB") {
            let mb = parse_number("YTSTT_MAX_AUDIO_MB", &raw)?;
            config = config.max_audio_bytes(mb * 1024 * 1024);
        }
        if let Some(raw) = lookup("YTSTT_DOWNLOAD_TIMEOUT_SECS") {
            let secs = parse_number("YTSTT_DOWNLOAD_TIMEOUT_SECS", &raw)?;
            config = config.download_timeout(Duration::from_secs(secs));
        }
        if let Some(path) = lookup("YTSTT_YT_DLP") {
            config = config.yt_dlp_path(PathBuf::from(path));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn default_language(mut self, lang: impl Into<String>) -> Self {
        self.default_language = lang.into();
        self
    }

    pub fn max_audio_bytes(mut self, bytes: u64) -> Self {
        self.max_audio_bytes = bytes;
        self
    }

    pub fn download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the file extension and MIME type the audio is uploaded as.
    pub fn upload_format(
        mut self,
        extension: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        self.upload_extension = extension.into();
        self.upload_content_type = content_type.into();
        self
    }

    pub fn watch_url_base(mut self, base: impl Into<String>) -> Self {
        self.watch_url_base = base.into();
        self
    }

    pub fn yt_dlp_path(mut self, path: PathBuf) -> Self {
        self.yt_dlp_path = path;
        self
    }

    /// Reject settings the relay cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::InvalidOption("api key must not be empty".into()));
        }
        if self.max_audio_bytes == 0 {
            return Err(Error::InvalidOption("max_audio_bytes must be > 0".into()));
        }
        if self.download_timeout.is_zero() {
            return Err(Error::InvalidOption("download_timeout must be > 0".into()));
        }
        Ok(())
    }

    /// Endpoint receiving the multipart transcription upload.
    pub fn transcription_url(&self) -> String {
        format!(
            "{}/audio/transcriptions",
            self.api_base.trim_end_matches('/')
        )
    }

    pub fn download_limits(&self) -> DownloadLimits {
        DownloadLimits {
            max_bytes: self.max_audio_bytes,
            timeout: self.download_timeout,
        }
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| Error::InvalidOption(format!("{key}={raw}")))
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("default_language", &self.default_language)
            .field("max_audio_bytes", &self.max_audio_bytes)
            .field("download_timeout", &self.download_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("upload_extension", &self.upload_extension)
            .field("upload_content_type", &self.upload_content_type)
            .field("watch_url_base", &self.watch_url_base)
            .field("yt_dlp_path", &self.yt_dlp_path)
            .finish()
    }
}
