//! Playback backend capability interface.
//!
//! A backend is a concrete playback engine — historically a plugin-based
//! streaming player or the native browser audio element — exposed to the
//! core through one fixed trait. Backends implement *partial* capability
//! sets: every control method has a default body returning
//! [`BackendError::Unsupported`], and the dispatcher consults
//! [`PlaybackBackend::supports`] before forwarding a command. A missing
//! capability is a valid, checked state, not an error.

use crate::error::{BackendError, Result};
use crate::stream::{PlaybackMode, StreamSource};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The two backend families the selection policy distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendFamily {
    /// Plugin-based streaming player (historical default).
    Plugin,
    /// Native browser audio element.
    NativeAudio,
}

/// Fieldless command discriminant used for capability probes and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    LoadUrl,
    LoadServerEndpoint,
    LoadContainer,
    LoadPlaylist,
    Configure,
    Resume,
    Pause,
    Stop,
    Cleanup,
    Seek,
    GetPosition,
    GetDuration,
    SetVolume,
    SetBufferTime,
    SetPlaybackMode,
    GetPlaybackMode,
    GetVersion,
    ForceMemoryReset,
    SetMemoryLimit,
    SetStallTimeout,
    CreateObject,
    Diagnostics,
}

impl CommandKind {
    /// Stable name of the command, matching the public control surface.
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::LoadUrl => "loadByUrl",
            CommandKind::LoadServerEndpoint => "loadByServerEndpoint",
            CommandKind::LoadContainer => "loadContainerStream",
            CommandKind::LoadPlaylist => "loadPlaylist",
            CommandKind::Configure => "configure",
            CommandKind::Resume => "resume",
            CommandKind::Pause => "pause",
            CommandKind::Stop => "stop",
            CommandKind::Cleanup => "cleanup",
            CommandKind::Seek => "seek",
            CommandKind::GetPosition => "getPosition",
            CommandKind::GetDuration => "getDuration",
            CommandKind::SetVolume => "setVolume",
            CommandKind::SetBufferTime => "setBufferTime",
            CommandKind::SetPlaybackMode => "setPlaybackMode",
            CommandKind::GetPlaybackMode => "getPlaybackMode",
            CommandKind::GetVersion => "getVersion",
            CommandKind::ForceMemoryReset => "forceMemoryReset",
            CommandKind::SetMemoryLimit => "setMemoryLimit",
            CommandKind::SetStallTimeout => "setStallTimeout",
            CommandKind::CreateObject => "createObject",
            CommandKind::Diagnostics => "diagnostics",
        }
    }

    /// Returns `true` for commands that start loading a stream. These are
    /// the commands the resilience layer re-issues on retry.
    pub fn is_load(&self) -> bool {
        matches!(
            self,
            CommandKind::LoadUrl
                | CommandKind::LoadServerEndpoint
                | CommandKind::LoadContainer
                | CommandKind::LoadPlaylist
        )
    }
}

/// A playback command together with its arguments.
///
/// The dispatcher routes each command to the matching trait operation of the
/// active backend; the resilience layer keeps the last load command so it
/// can be re-issued with identical arguments on retry.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadUrl(String),
    LoadServerEndpoint { server: String, endpoint: String },
    LoadContainer(String),
    LoadPlaylist(String),
    Configure(StreamSource),
    Resume,
    Pause,
    Stop,
    Cleanup,
    Seek(Duration),
    GetPosition,
    GetDuration,
    SetVolume(u8),
    SetBufferTime(Duration),
    SetPlaybackMode(PlaybackMode),
    GetPlaybackMode,
    GetVersion,
    ForceMemoryReset,
    SetMemoryLimit(u64),
    SetStallTimeout(Duration),
    CreateObject,
    Diagnostics,
}

impl Command {
    /// The fieldless discriminant for this command.
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::LoadUrl(_) => CommandKind::LoadUrl,
            Command::LoadServerEndpoint { .. } => CommandKind::LoadServerEndpoint,
            Command::LoadContainer(_) => CommandKind::LoadContainer,
            Command::LoadPlaylist(_) => CommandKind::LoadPlaylist,
            Command::Configure(_) => CommandKind::Configure,
            Command::Resume => CommandKind::Resume,
            Command::Pause => CommandKind::Pause,
            Command::Stop => CommandKind::Stop,
            Command::Cleanup => CommandKind::Cleanup,
            Command::Seek(_) => CommandKind::Seek,
            Command::GetPosition => CommandKind::GetPosition,
            Command::GetDuration => CommandKind::GetDuration,
            Command::SetVolume(_) => CommandKind::SetVolume,
            Command::SetBufferTime(_) => CommandKind::SetBufferTime,
            Command::SetPlaybackMode(_) => CommandKind::SetPlaybackMode,
            Command::GetPlaybackMode => CommandKind::GetPlaybackMode,
            Command::GetVersion => CommandKind::GetVersion,
            Command::ForceMemoryReset => CommandKind::ForceMemoryReset,
            Command::SetMemoryLimit(_) => CommandKind::SetMemoryLimit,
            Command::SetStallTimeout(_) => CommandKind::SetStallTimeout,
            Command::CreateObject => CommandKind::CreateObject,
            Command::Diagnostics => CommandKind::Diagnostics,
        }
    }
}

/// Value returned by a successfully dispatched command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// Control command executed with no return value.
    Ack,
    /// Current playhead position.
    Position(Duration),
    /// Stream duration; `None` until the backend has reported it.
    Duration(Option<Duration>),
    /// Current playback mode.
    Mode(PlaybackMode),
    /// Backend version string.
    Version(String),
    /// Backend diagnostics snapshot.
    Diagnostics(serde_json::Value),
}

/// Notification raised by a backend toward the facade.
///
/// Backends do not touch the event bus directly; the facade ingests these
/// notifications, updates session and health state, and re-emits the fixed
/// event vocabulary to consumers.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendNotification {
    /// Buffering/load progress.
    LoadProgress { loaded: u64, total: Option<u64> },
    /// Playback has started or resumed producing audio.
    Started,
    /// Stream duration became known.
    DurationKnown(Duration),
    /// Playhead position report.
    Position(Duration),
    /// End of stream reached.
    Ended,
    /// The backend failed to load or play the stream.
    StreamError(String),
    /// A cross-origin/security violation was reported by the environment.
    SecurityError(String),
}

/// Capability interface implemented by every playback backend.
///
/// Control methods default to [`BackendError::Unsupported`]; a backend
/// overrides exactly the subset it implements and reports that subset
/// through [`PlaybackBackend::supports`].
#[cfg_attr(test, mockall::automock)]
pub trait PlaybackBackend: Send {
    /// Human-readable backend name for logging and diagnostics.
    fn name(&self) -> &str;

    /// The family this backend belongs to.
    fn family(&self) -> BackendFamily;

    /// Probe whether the backend is usable in the current environment.
    ///
    /// Called once per initialization by the registry; the result is cached
    /// on the backend descriptor.
    fn probe_available(&self) -> bool;

    /// Returns `true` if the backend implements the given command.
    fn supports(&self, command: CommandKind) -> bool;

    /// Load a stream directly by URL.
    fn load_url(&mut self, url: &str) -> Result<()> {
        let _ = url;
        Err(BackendError::Unsupported)
    }

    /// Load a stream from a server/endpoint pair.
    fn load_server_endpoint(&mut self, server: &str, endpoint: &str) -> Result<()> {
        let _ = (server, endpoint);
        Err(BackendError::Unsupported)
    }

    /// Load a progressive container stream.
    fn load_container(&mut self, url: &str) -> Result<()> {
        let _ = url;
        Err(BackendError::Unsupported)
    }

    /// Load a playlist file.
    fn load_playlist(&mut self, path: &str) -> Result<()> {
        let _ = path;
        Err(BackendError::Unsupported)
    }

    /// Apply a new stream descriptor without starting playback.
    fn configure(&mut self, source: &StreamSource) -> Result<()> {
        let _ = source;
        Err(BackendError::Unsupported)
    }

    /// Begin or resume playback.
    fn resume(&mut self) -> Result<()> {
        Err(BackendError::Unsupported)
    }

    /// Pause playback, keeping the session.
    fn pause(&mut self) -> Result<()> {
        Err(BackendError::Unsupported)
    }

    /// Stop playback and release the stream.
    fn stop(&mut self) -> Result<()> {
        Err(BackendError::Unsupported)
    }

    /// Tear down all backend-internal resources.
    fn cleanup(&mut self) -> Result<()> {
        Err(BackendError::Unsupported)
    }

    /// Seek to an absolute position.
    fn seek(&mut self, position: Duration) -> Result<()> {
        let _ = position;
        Err(BackendError::Unsupported)
    }

    /// Current playhead position.
    fn position(&self) -> Result<Duration> {
        Err(BackendError::Unsupported)
    }

    /// Stream duration, `None` until known.
    fn duration(&self) -> Result<Option<Duration>> {
        Err(BackendError::Unsupported)
    }

    /// Set output volume. The facade clamps to `0..=100` before dispatch.
    fn set_volume(&mut self, volume: u8) -> Result<()> {
        let _ = volume;
        Err(BackendError::Unsupported)
    }

    /// Set the target buffering duration.
    fn set_buffer_time(&mut self, buffer: Duration) -> Result<()> {
        let _ = buffer;
        Err(BackendError::Unsupported)
    }

    /// Switch between live and on-demand semantics.
    fn set_playback_mode(&mut self, mode: PlaybackMode) -> Result<()> {
        let _ = mode;
        Err(BackendError::Unsupported)
    }

    /// Current playback mode.
    fn playback_mode(&self) -> Result<PlaybackMode> {
        Err(BackendError::Unsupported)
    }

    /// Backend version string.
    fn version(&self) -> Result<String> {
        Err(BackendError::Unsupported)
    }

    /// Swap the backend's underlying audio object while preserving stream
    /// position, volume, and mode. Issued by the memory watchdog; must not
    /// interrupt playback semantics.
    fn force_memory_reset(&mut self) -> Result<()> {
        Err(BackendError::Unsupported)
    }

    /// Set the resource high-water mark the backend reports against.
    fn set_memory_limit(&mut self, bytes: u64) -> Result<()> {
        let _ = bytes;
        Err(BackendError::Unsupported)
    }

    /// Set the buffering stall timeout.
    fn set_stall_timeout(&mut self, timeout: Duration) -> Result<()> {
        let _ = timeout;
        Err(BackendError::Unsupported)
    }

    /// Eagerly create the backend's underlying audio object.
    ///
    /// Plugin backends require this after configuration; native-audio
    /// backends create their element lazily on first use.
    fn create_object(&mut self) -> Result<()> {
        Err(BackendError::Unsupported)
    }

    /// Diagnostics snapshot for inspection tooling.
    fn diagnostics(&self) -> Result<serde_json::Value> {
        Err(BackendError::Unsupported)
    }

    /// Current resource-usage estimate in bytes, if the backend tracks one.
    ///
    /// Consulted by the memory watchdog. `None` opts the backend out of
    /// memory-pressure resets.
    fn memory_estimate(&self) -> Option<u64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MinimalBackend;

    impl PlaybackBackend for MinimalBackend {
        fn name(&self) -> &str {
            "minimal"
        }

        fn family(&self) -> BackendFamily {
            BackendFamily::NativeAudio
        }

        fn probe_available(&self) -> bool {
            true
        }

        fn supports(&self, command: CommandKind) -> bool {
            matches!(command, CommandKind::Resume | CommandKind::Pause)
        }

        fn resume(&mut self) -> Result<()> {
            Ok(())
        }

        fn pause(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn default_methods_report_unsupported() {
        let mut backend = MinimalBackend;
        assert!(matches!(
            backend.load_url("http://example.com/stream"),
            Err(BackendError::Unsupported)
        ));
        assert!(matches!(
            backend.seek(Duration::from_secs(10)),
            Err(BackendError::Unsupported)
        ));
        assert!(backend.memory_estimate().is_none());
        assert!(backend.resume().is_ok());
    }

    #[test]
    fn supports_reflects_partial_capability_set() {
        let backend = MinimalBackend;
        assert!(backend.supports(CommandKind::Resume));
        assert!(!backend.supports(CommandKind::LoadUrl));
        assert!(!backend.supports(CommandKind::ForceMemoryReset));
    }

    #[test]
    fn command_kind_round_trip() {
        let commands = [
            Command::LoadUrl("http://a".into()),
            Command::LoadServerEndpoint {
                server: "s".into(),
                endpoint: "e".into(),
            },
            Command::Seek(Duration::from_secs(3)),
            Command::SetVolume(50),
            Command::ForceMemoryReset,
        ];
        let kinds: Vec<_> = commands.iter().map(Command::kind).collect();
        assert_eq!(
            kinds,
            vec![
                CommandKind::LoadUrl,
                CommandKind::LoadServerEndpoint,
                CommandKind::Seek,
                CommandKind::SetVolume,
                CommandKind::ForceMemoryReset,
            ]
        );
    }

    #[test]
    fn load_commands_are_retryable() {
        assert!(CommandKind::LoadUrl.is_load());
        assert!(CommandKind::LoadPlaylist.is_load());
        assert!(!CommandKind::Resume.is_load());
        assert!(!CommandKind::ForceMemoryReset.is_load());
    }

    #[test]
    fn mocked_backend_capability_probe() {
        let mut mock = MockPlaybackBackend::new();
        mock.expect_supports()
            .withf(|c| *c == CommandKind::SetVolume)
            .return_const(true);
        mock.expect_set_volume().withf(|v| *v == 80).returning(|_| Ok(()));

        assert!(mock.supports(CommandKind::SetVolume));
        assert!(mock.set_volume(80).is_ok());
    }
}
