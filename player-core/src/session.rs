//! # Playback Session
//!
//! Mutable state for the stream currently under playback. A session is
//! created by `configureSession` and destroyed by `cleanup`; every
//! re-configure cycle starts from a fresh instance.

use backend_traits::{PlaybackMode, StreamSource};
use std::time::Duration;

/// Maximum volume on the public `0..=100` scale.
pub const MAX_VOLUME: u8 = 100;

/// State of the current playback session.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    /// Resolved stream descriptor for the active backend family.
    pub source: StreamSource,
    /// Current playhead position.
    pub position: Duration,
    /// Stream duration; unknown until the backend reports it.
    pub duration: Option<Duration>,
    /// Playback mode (live or on-demand).
    pub mode: PlaybackMode,
    /// Whether the session is ready to accept transport commands.
    /// `resume` is a no-op until this is set.
    pub ready: bool,
    volume: u8,
}

impl PlaybackSession {
    /// Create a fresh session for a resolved stream descriptor.
    pub fn new(source: StreamSource, volume: u8) -> Self {
        let mode = source.mode;
        Self {
            source,
            position: Duration::ZERO,
            duration: None,
            mode,
            ready: false,
            volume: volume.min(MAX_VOLUME),
        }
    }

    /// Current volume on the `0..=100` scale.
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Set the volume, clamping to `0..=100`. Returns the clamped value.
    pub fn set_volume(&mut self, volume: u8) -> u8 {
        self.volume = volume.min(MAX_VOLUME);
        self.volume
    }
}
