use serde::{Deserialize, Serialize};

use crate::transcribe::RawSegment;

/// A transcript segment with trimmed text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Complete transcription result, in the order the service returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// Normalize raw service segments. Empty segments are kept.
    pub fn from_raw(raw: Vec<RawSegment>) -> Self {
        let segments = raw
            .into_iter()
            .map(|s| Segment {
                start: s.start,
                end: s.end,
                text: s.text.as_deref().unwrap_or_default().trim().to_string(),
            })
            .collect();
        Self { segments }
    }

    /// Full text (all segments joined by single spaces).
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }

    /// Format as WebVTT subtitles with numbered cues.
    pub fn to_vtt(&self) -> String {
        let mut out = String::from("WEBVTT\n\n");
        for (i, seg) in self.segments.iter().enumerate() {
            out.push_str(&format!("{}\n", i + 1));
            out.push_str(&format!(
                "{} --> {}\n",
                format_vtt_time(seg.start),
                format_vtt_time(seg.end)
            ));
            out.push_str(seg.text.trim());
            out.push_str("\n\n");
        }
        out
    }
}

/// Format seconds as VTT timestamp: HH:MM:SS.mmm
///
/// Each field is truncated on its own; milliseconds never carry into
/// seconds, so output stays identical to existing subtitle files.
pub fn format_vtt_time(seconds: f64) -> String {
    let h = (seconds / 3600.0).floor() as i64;
    let m = ((seconds % 3600.0) / 60.0).floor() as i64;
    let s = (seconds % 60.0).floor() as i64;
    let ms = ((seconds - seconds.floor()) * 1000.0).floor() as i64;
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}
