use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Size and wall-clock ceilings for a single audio download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadLimits {
    pub max_bytes: u64,
    pub timeout: Duration,
}

/// Fetch `url` into memory, enforcing `limits`.
///
/// A non-success status fails with [`Error::AudioFetchFailed`] before any
/// body bytes are read.
pub async fn download_audio(
    client: &reqwest::Client,
    url: &str,
    limits: &DownloadLimits,
) -> Result<Vec<u8>> {
    info!(
        max_bytes = limits.max_bytes,
        timeout = ?limits.timeout,
        "downloading audio"
    );

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        warn!(status = status.as_u16(), "audio source rejected request");
        return Err(Error::AudioFetchFailed {
            status: status.as_u16(),
        });
    }

    if let Some(len) = response.content_length() {
        debug!(content_length = len, "audio response headers received");
    }

    collect_bounded(response.bytes_stream(), limits).await
}

/// Drain a chunk stream into one buffer.
///
/// The running total is checked after every chunk so an oversized body is
/// abandoned as soon as it crosses `max_bytes`; at most one chunk past the
/// ceiling is ever held. Elapsed time is checked at the same points, and
/// each pull is bounded by the remaining budget so a stalled stream also
/// times out.
pub async fn collect_bounded<S, E>(stream: S, limits: &DownloadLimits) -> Result<Vec<u8>>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    Error: From<E>,
{
    let started = Instant::now();
    let deadline = started + limits.timeout;
    let timed_out = || Error::DownloadTimeout {
        timeout: limits.timeout,
    };

    futures_util::pin_mut!(stream);

    let mut chunks: Vec<Bytes> = Vec::new();
    let mut received: u64 = 0;

    loop {
        let next = tokio::time::timeout_at(deadline, stream.next())
            .await
            .map_err(|_| timed_out())?;
        let Some(chunk) = next else { break };
        let chunk = chunk?;

        received += chunk.len() as u64;
        if received > limits.max_bytes {
            warn!(
                received,
                limit = limits.max_bytes,
                "audio too large, aborting download"
            );
            return Err(Error::AudioTooLarge {
                limit_bytes: limits.max_bytes,
            });
        }
        if started.elapsed() > limits.timeout {
            warn!(received, "audio download timed out");
            return Err(timed_out());
        }

        chunks.push(chunk);
    }

    let audio = chunks.concat();
    debug!(
        bytes = audio.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "audio downloaded"
    );
    Ok(audio)
}
