//! Video transcription relay: video id in, transcript with timestamps out.
//!
//! **ytstt** resolves the best audio-only stream of a video (via yt-dlp),
//! downloads it into memory under a size and time budget, sends it to an
//! OpenAI-compatible Whisper endpoint, and returns plain text, timed
//! segments and a WebVTT track.
//!
//! # Quick start
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> ytstt::Result<()> {
//! let relay = ytstt::Relay::new(ytstt::RelayConfig::from_env()?)?;
//! let transcript = relay.transcribe_video("dQw4w9WgXcQ", "en").await?;
//! println!("{}", transcript.text());
//! println!("{}", transcript.to_vtt());
//! # Ok(())
//! # }
//! ```
//!
//! The [`api`] module exposes the same pipeline as a JSON HTTP endpoint.

pub mod api;
pub mod config;
pub mod download;
pub mod error;
pub mod relay;
pub mod resolve;
pub mod transcribe;
pub mod types;

pub use config::RelayConfig;
pub use download::DownloadLimits;
pub use error::{Error, Result};
pub use relay::Relay;
pub use resolve::{StreamDescriptor, StreamResolver};
#[cfg(feature = "yt-dlp")]
pub use resolve::YtDlpResolver;
pub use transcribe::{AudioUpload, RawSegment, Transcriber, WhisperApiClient};
pub use types::{format_vtt_time, Segment, Transcript};
