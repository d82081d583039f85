//! Stream descriptors and session parameters.
//!
//! These types describe *what* a backend should play: the stream-type
//! family, the ordered list of candidate source URIs, and live/on-demand
//! semantics. They are deliberately backend-agnostic; each backend family
//! interprets the descriptor according to its own transport.

use crate::playback::BackendFamily;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Transport/container family of a stream source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// Plain HTTP(S) audio stream.
    Http,
    /// RTMP streaming endpoint (plugin backends only).
    Rtmp,
    /// Progressive download of a container file.
    ProgressiveContainer,
    /// Playlist file resolving to one or more streams.
    Playlist,
}

impl StreamKind {
    /// Infer the stream kind from a source URI.
    ///
    /// RTMP schemes map to [`StreamKind::Rtmp`]; playlist extensions map to
    /// [`StreamKind::Playlist`]; everything else is treated as HTTP.
    pub fn from_uri(uri: &str) -> Self {
        let lower = uri.to_ascii_lowercase();
        if lower.starts_with("rtmp://") || lower.starts_with("rtmpt://") {
            StreamKind::Rtmp
        } else if lower.ends_with(".m3u") || lower.ends_with(".m3u8") || lower.ends_with(".pls") {
            StreamKind::Playlist
        } else {
            StreamKind::Http
        }
    }
}

/// Live versus on-demand playback semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Live stream with no fixed duration or seeking.
    Live,
    /// On-demand stream with known duration once reported.
    OnDemand,
}

impl PlaybackMode {
    /// Wire name used in the `mode` event payload.
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackMode::Live => "live",
            PlaybackMode::OnDemand => "ondemand",
        }
    }
}

/// A resolved stream descriptor handed to the active backend.
///
/// `uris` is ordered: the first entry is the primary source, the rest are
/// fallbacks a backend may try in order when the primary fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSource {
    /// Transport/container family.
    pub kind: StreamKind,
    /// Candidate source URIs in fallback order. Never empty for a valid
    /// descriptor; an empty resolved list is a configuration error.
    pub uris: Vec<String>,
    /// Live versus on-demand semantics.
    pub mode: PlaybackMode,
    /// Target buffer duration the backend should maintain.
    pub buffer: Duration,
}

impl StreamSource {
    /// Build a descriptor from an ordered URI list, inferring the kind from
    /// the primary URI.
    pub fn from_uris(uris: Vec<String>, mode: PlaybackMode, buffer: Duration) -> Self {
        let kind = uris
            .first()
            .map(|u| StreamKind::from_uri(u))
            .unwrap_or(StreamKind::Http);
        Self {
            kind,
            uris,
            mode,
            buffer,
        }
    }

    /// The primary source URI, if any.
    pub fn primary(&self) -> Option<&str> {
        self.uris.first().map(String::as_str)
    }

    /// Returns `true` if the descriptor has no candidate sources.
    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }
}

/// Parameters supplied when (re)configuring an audio session.
///
/// Source lists are keyed by backend family; the facade resolves the list
/// matching the active backend after selection has run.
#[derive(Debug, Clone, Default)]
pub struct SessionParams {
    /// Candidate source URIs per backend family, each in fallback order.
    pub sources: HashMap<BackendFamily, Vec<String>>,
    /// Whether the stream is live (no duration, no seeking).
    pub live: bool,
    /// Target buffer duration.
    pub buffer: Duration,
    /// Caller preference for the native-audio backend during selection.
    pub prefer_native_audio: bool,
}

impl SessionParams {
    /// Create parameters with the given live flag and buffer duration.
    pub fn new(live: bool, buffer: Duration, prefer_native_audio: bool) -> Self {
        Self {
            sources: HashMap::new(),
            live,
            buffer,
            prefer_native_audio,
        }
    }

    /// Attach the source list for a backend family.
    pub fn with_sources(mut self, family: BackendFamily, uris: Vec<String>) -> Self {
        self.sources.insert(family, uris);
        self
    }

    /// Playback mode implied by the live flag.
    pub fn mode(&self) -> PlaybackMode {
        if self.live {
            PlaybackMode::Live
        } else {
            PlaybackMode::OnDemand
        }
    }

    /// Resolve the stream descriptor for a backend family.
    ///
    /// Returns a descriptor even when the family has no sources; callers
    /// must check [`StreamSource::is_empty`] and surface a configuration
    /// error before any load is attempted.
    pub fn resolve(&self, family: BackendFamily) -> StreamSource {
        let uris = self.sources.get(&family).cloned().unwrap_or_default();
        StreamSource::from_uris(uris, self.mode(), self.buffer)
    }
}
