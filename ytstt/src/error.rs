use std::time::Duration;

/// All errors that can occur while relaying a transcription request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing {0}")]
    MissingParameter(&'static str),

    #[error("no audio-only format available")]
    NoAudioFormat,

    #[error("audio fetch failed with HTTP status {status}")]
    AudioFetchFailed { status: u16 },

    #[error("audio exceeds the {limit_bytes} byte limit")]
    AudioTooLarge { limit_bytes: u64 },

    #[error("audio download exceeded {timeout:?}")]
    DownloadTimeout { timeout: Duration },

    #[error("transcription service returned HTTP status {status}")]
    TranscriptionFailed { status: u16, details: String },

    #[error("stream resolution failed: {0}")]
    Resolve(String),

    #[cfg(feature = "yt-dlp")]
    #[error("yt-dlp not found, install with: pip install yt-dlp")]
    YtDlpNotFound,

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_parameter() {
        let e = Error::MissingParameter("yt");
        assert_eq!(e.to_string(), "missing yt");
    }

    #[test]
    fn test_error_display_audio_fetch_failed() {
        let e = Error::AudioFetchFailed { status: 403 };
        assert!(e.to_string().contains("403"));
    }

    #[test]
    fn test_error_display_too_large() {
        let e = Error::AudioTooLarge {
            limit_bytes: 26_214_400,
        };
        assert!(e.to_string().contains("26214400"));
    }

    #[test]
    fn test_error_display_transcription_failed_omits_details() {
        let e = Error::TranscriptionFailed {
            status: 401,
            details: "invalid api key".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("401"));
        assert!(!msg.contains("invalid api key"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("reset by peer"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<String>("invalid json").unwrap_err();
        let e: Error = json_err.into();
        assert!(matches!(e, Error::Json(_)));
    }

    #[test]
    fn test_error_debug_impl() {
        let e = Error::Resolve("video unavailable".into());
        let debug = format!("{:?}", e);
        assert!(debug.contains("Resolve"));
    }
}
