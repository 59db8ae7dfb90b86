use async_trait::async_trait;
use serde::{Deserialize, Serialize};
#[cfg(feature = "yt-dlp")]
use std::path::PathBuf;
#[cfg(feature = "yt-dlp")]
use tracing::{debug, info};

use crate::error::{Error, Result};

/// One downloadable rendition of a source video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub format_id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default, rename = "acodec")]
    pub audio_codec: Option<String>,
    #[serde(default, rename = "vcodec")]
    pub video_codec: Option<String>,
    /// Average audio bitrate in kbit/s.
    #[serde(default, rename = "abr")]
    pub audio_bitrate: Option<f64>,
}

impl StreamDescriptor {
    /// Carries audio and explicitly no video.
    pub fn is_audio_only(&self) -> bool {
        let has_audio = self.audio_codec.as_deref().is_some_and(|c| c != "none");
        let no_video = self.video_codec.as_deref() == Some("none");
        has_audio && no_video
    }

    fn usable_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// Source of stream descriptors for a video page URL.
#[async_trait]
pub trait StreamResolver: Send + Sync {
    async fn resolve(&self, watch_url: &str) -> Result<Vec<StreamDescriptor>>;
}

/// Canonical page URL for a video id.
pub fn watch_url(base: &str, video_id: &str) -> String {
    format!("{base}{video_id}")
}

/// Pick the highest-quality audio-only descriptor.
///
/// Ranking is by audio bitrate; on a tie the later descriptor wins, since
/// resolvers list formats from worst to best.
pub fn select_audio_format(formats: &[StreamDescriptor]) -> Result<&StreamDescriptor> {
    let best = formats
        .iter()
        .filter(|f| f.is_audio_only())
        .max_by(|a, b| {
            let a = a.audio_bitrate.unwrap_or(0.0);
            let b = b.audio_bitrate.unwrap_or(0.0);
            a.total_cmp(&b)
        })
        .ok_or(Error::NoAudioFormat)?;

    if best.usable_url().is_none() {
        return Err(Error::NoAudioFormat);
    }
    Ok(best)
}

#[derive(Deserialize)]
struct YtDlpInfo {
    #[serde(default)]
    formats: Vec<StreamDescriptor>,
}

/// Parse the `--dump-json` document yt-dlp prints for a single video.
pub fn parse_yt_dlp_info(json: &[u8]) -> Result<Vec<StreamDescriptor>> {
    let info: YtDlpInfo = serde_json::from_slice(json)?;
    Ok(info.formats)
}

/// Resolves formats by running `yt-dlp` as a subprocess.
///
/// # Security
/// - Arguments are passed via `.arg()` (no shell expansion)
/// - `--no-exec` prevents yt-dlp from running post-processing commands
/// - Nothing is written to disk (`--no-download`)
#[cfg(feature = "yt-dlp")]
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    program: PathBuf,
}

#[cfg(feature = "yt-dlp")]
impl YtDlpResolver {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[cfg(feature = "yt-dlp")]
#[async_trait]
impl StreamResolver for YtDlpResolver {
    async fn resolve(&self, watch_url: &str) -> Result<Vec<StreamDescriptor>> {
        info!(%watch_url, "resolving stream formats");

        let output = tokio::process::Command::new(&self.program)
            .args([
                "--dump-json",
                "--no-download",
                "--no-exec",
                "--no-playlist",
            ])
            .arg(watch_url)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::YtDlpNotFound
                } else {
                    Error::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Limit error message length to avoid dumping huge stderr
            let stderr_truncated: String = stderr.trim().chars().take(1000).collect();
            return Err(Error::Resolve(format!("yt-dlp failed: {stderr_truncated}")));
        }

        let formats = parse_yt_dlp_info(&output.stdout)?;
        debug!(count = formats.len(), "formats resolved");
        Ok(formats)
    }
}
