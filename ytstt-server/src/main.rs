use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing::info;
use ytstt::api::{create_router, AppState, STT_PATH};
use ytstt::config::{DEFAULT_API_BASE, DEFAULT_LANGUAGE, DEFAULT_MODEL};
use ytstt::{Relay, RelayConfig};

#[derive(Parser)]
#[command(name = "ytstt-server", about = "Serve transcriptions over HTTP")]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "YTSTT_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "YTSTT_PORT", default_value = "8080")]
    port: u16,

    /// Bearer token for the transcription service.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Transcription service base URL.
    #[arg(long, env = "YTSTT_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Transcription model identifier.
    #[arg(long, env = "YTSTT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Language hint used when a request has no `lang`.
    #[arg(long, env = "YTSTT_DEFAULT_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    default_language: String,

    /// Maximum audio size in MiB.
    #[arg(long, env = "YTSTT_MAX_AUDIO_MB", default_value = "25")]
    max_audio_mb: u64,

    /// Maximum audio download time in seconds.
    #[arg(long, env = "YTSTT_DOWNLOAD_TIMEOUT_SECS", default_value = "45")]
    download_timeout_secs: u64,

    /// Path to the yt-dlp executable.
    #[arg(long = "yt-dlp", env = "YTSTT_YT_DLP", default_value = "yt-dlp")]
    yt_dlp: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ytstt=info,ytstt_server=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = RelayConfig::new(cli.api_key)
        .api_base(cli.api_base)
        .model(cli.model)
        .default_language(cli.default_language)
        .max_audio_bytes(cli.max_audio_mb * 1024 * 1024)
        .download_timeout(Duration::from_secs(cli.download_timeout_secs))
        .yt_dlp_path(cli.yt_dlp);
    info!(?config, "configuration loaded");

    let relay = Relay::new(config)?;
    let app = create_router(AppState::new(relay));

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on http://{addr}{STT_PATH}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Resolve when Ctrl+C or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
