//! Fakes and a local HTTP fixture shared by the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use ytstt::{
    AudioUpload, Error, RawSegment, Result, StreamDescriptor, StreamResolver, Transcriber,
};

/// Resolver returning a fixed answer and recording what it was asked.
pub struct FakeResolver {
    formats: std::result::Result<Vec<StreamDescriptor>, String>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn returning(formats: Vec<StreamDescriptor>) -> Arc<Self> {
        Arc::new(Self {
            formats: Ok(formats),
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            formats: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StreamResolver for FakeResolver {
    async fn resolve(&self, watch_url: &str) -> Result<Vec<StreamDescriptor>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(watch_url.to_string());
        match &self.formats {
            Ok(formats) => Ok(formats.clone()),
            Err(message) => Err(Error::Resolve(message.clone())),
        }
    }
}

/// Transcriber returning fixed segments and keeping every upload.
pub struct FakeTranscriber {
    segments: Vec<RawSegment>,
    uploads: Mutex<Vec<AudioUpload>>,
}

impl FakeTranscriber {
    pub fn returning(segments: Vec<RawSegment>) -> Arc<Self> {
        Arc::new(Self {
            segments,
            uploads: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn uploads(&self) -> Vec<AudioUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, upload: AudioUpload) -> Result<Vec<RawSegment>> {
        self.uploads.lock().unwrap().push(upload);
        Ok(self.segments.clone())
    }
}

pub fn raw(start: f64, end: f64, text: &str) -> RawSegment {
    RawSegment {
        start,
        end,
        text: Some(text.to_string()),
    }
}

pub fn audio_format(id: &str, abr: f64, url: &str) -> StreamDescriptor {
    StreamDescriptor {
        format_id: id.to_string(),
        url: Some(url.to_string()),
        ext: Some("m4a".into()),
        audio_codec: Some("mp4a.40.2".into()),
        video_codec: Some("none".into()),
        audio_bitrate: Some(abr),
    }
}

/// Serve `app` on an ephemeral local port.
pub async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
