//! # Command Dispatcher
//!
//! Routes playback commands to the active backend and implements the
//! facade's named control surface.
//!
//! ## Routing rules
//!
//! Evaluated per dispatch, in order:
//!
//! 1. No active backend (selection never ran, or found nothing): emit one
//!    `noSupport` event and drop the command.
//! 2. Active backend does not support the command kind: drop it silently.
//!    Partial capability sets are expected; consumers issue the full
//!    surface without caring which backend won selection.
//! 3. Otherwise invoke the matching backend operation. Stream errors are
//!    funneled into the resilience layer; other failures are logged and
//!    swallowed.
//!
//! The distinction between rule 1 and rule 2 is deliberate: "no backend at
//! all" is an environment problem consumers must hear about, "this backend
//! cannot do that" is routine.

use crate::facade::PlayerFacade;
use crate::session::MAX_VOLUME;
use backend_traits::error::{BackendError, Result};
use backend_traits::{Command, CommandOutput, PlaybackBackend, PlaybackMode};
use player_runtime::events::PlayerEvent;
use std::time::Duration;

impl PlayerFacade {
    /// Dispatch a command to the active backend.
    ///
    /// Returns the command output, or `None` when the command was dropped
    /// by a routing rule or failed.
    pub fn dispatch(&mut self, command: Command) -> Option<CommandOutput> {
        let kind = command.kind();
        let Some(backend) = self.registry.active_backend_mut() else {
            tracing::debug!(command = kind.name(), "dispatch with no active backend");
            self.bus.emit(&PlayerEvent::NoSupport);
            return None;
        };

        if !backend.supports(kind) {
            tracing::trace!(
                command = kind.name(),
                backend = backend.name(),
                "command not supported by the active backend"
            );
            return None;
        }

        if kind.is_load() {
            self.resilience.record_load(command.clone());
        }

        match execute(backend, &command) {
            Ok(output) => Some(output),
            Err(BackendError::Unsupported) => None,
            Err(BackendError::Stream(message)) => {
                self.handle_stream_error(&message);
                None
            }
            Err(error) => {
                tracing::warn!(command = kind.name(), %error, "command failed");
                None
            }
        }
    }

    // ========================================================================
    // Control surface
    // ========================================================================

    /// Load a stream directly by URL.
    pub fn load_by_url(&mut self, url: impl Into<String>) {
        self.dispatch(Command::LoadUrl(url.into()));
    }

    /// Load a stream from a server/endpoint pair.
    pub fn load_by_server_endpoint(&mut self, server: impl Into<String>, endpoint: impl Into<String>) {
        self.dispatch(Command::LoadServerEndpoint {
            server: server.into(),
            endpoint: endpoint.into(),
        });
    }

    /// Load a progressive container stream.
    pub fn load_container_stream(&mut self, url: impl Into<String>) {
        self.dispatch(Command::LoadContainer(url.into()));
    }

    /// Load a playlist file.
    pub fn load_playlist(&mut self, path: impl Into<String>) {
        self.dispatch(Command::LoadPlaylist(path.into()));
    }

    /// Begin or resume playback.
    ///
    /// A no-op until the session is configured and ready; a successful
    /// resume also resets the retry counter so a deliberate user action
    /// starts recovery from a clean slate.
    pub fn resume(&mut self) {
        let ready = self.session.as_ref().is_some_and(|session| session.ready);
        if !ready {
            tracing::debug!("resume before the session is ready, ignoring");
            return;
        }
        self.resilience.reset_attempts();
        self.dispatch(Command::Resume);
    }

    /// Pause playback, keeping the session.
    pub fn pause(&mut self) {
        if self.dispatch(Command::Pause).is_some() {
            self.paused = true;
            let position = self.current_position();
            self.bus.emit(&PlayerEvent::PausePlaying { position });
        }
    }

    /// Stop playback and release the stream.
    pub fn stop(&mut self) {
        if self.dispatch(Command::Stop).is_some() {
            self.paused = false;
            self.resilience.on_stopped();
            self.bus.emit(&PlayerEvent::Stopped);
        }
    }

    /// Seek to an absolute position.
    pub fn seek(&mut self, position: Duration) {
        if self.dispatch(Command::Seek(position)).is_some() {
            if let Some(session) = self.session.as_mut() {
                session.position = position;
            }
        }
    }

    /// Current playhead position, preferring the backend's live value over
    /// the last recorded session position.
    pub fn position(&mut self) -> Option<Duration> {
        match self.dispatch(Command::GetPosition) {
            Some(CommandOutput::Position(position)) => {
                if let Some(session) = self.session.as_mut() {
                    session.position = position;
                }
                Some(position)
            }
            _ => self.session.as_ref().map(|session| session.position),
        }
    }

    /// Stream duration, `None` until known.
    pub fn duration(&mut self) -> Option<Duration> {
        match self.dispatch(Command::GetDuration) {
            Some(CommandOutput::Duration(duration)) => duration,
            _ => self.session.as_ref().and_then(|session| session.duration),
        }
    }

    /// Set the output volume, clamped to `0..=100`.
    ///
    /// Also closes the settings window: an explicit volume always beats the
    /// timeout fallback.
    pub fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(MAX_VOLUME);
        self.volume = volume;
        self.volume_committed = true;
        self.settings_deadline = None;
        if let Some(session) = self.session.as_mut() {
            session.set_volume(volume);
        }
        if self.dispatch(Command::SetVolume(volume)).is_some() {
            self.bus.emit(&PlayerEvent::VolumeSet { volume });
        }
    }

    /// Set the target buffering duration.
    pub fn set_buffer_time(&mut self, buffer: Duration) {
        if self.dispatch(Command::SetBufferTime(buffer)).is_some() {
            if let Some(session) = self.session.as_mut() {
                session.source.buffer = buffer;
            }
        }
    }

    /// Switch between live and on-demand semantics.
    pub fn set_playback_mode(&mut self, mode: PlaybackMode) {
        if self.dispatch(Command::SetPlaybackMode(mode)).is_some() {
            if let Some(session) = self.session.as_mut() {
                session.mode = mode;
            }
            self.bus.emit(&PlayerEvent::Mode { mode });
        }
    }

    /// Current playback mode.
    pub fn playback_mode(&mut self) -> Option<PlaybackMode> {
        match self.dispatch(Command::GetPlaybackMode) {
            Some(CommandOutput::Mode(mode)) => Some(mode),
            _ => self.session.as_ref().map(|session| session.mode),
        }
    }

    /// Backend version string.
    pub fn version(&mut self) -> Option<String> {
        match self.dispatch(Command::GetVersion) {
            Some(CommandOutput::Version(version)) => Some(version),
            _ => None,
        }
    }

    /// Ask the backend to swap its underlying audio object while keeping
    /// position, volume, and mode.
    pub fn force_memory_reset(&mut self) {
        self.dispatch(Command::ForceMemoryReset);
    }

    /// Set the memory high-water mark for the watchdog and the backend.
    pub fn set_memory_limit(&mut self, bytes: u64) {
        self.resilience.set_memory_limit(bytes);
        self.dispatch(Command::SetMemoryLimit(bytes));
    }

    /// Set the buffering stall timeout for the watchdog and the backend.
    pub fn set_stall_timeout(&mut self, timeout: Duration) {
        let now = self.clock.now();
        self.resilience.set_stall_timeout(timeout, now);
        self.dispatch(Command::SetStallTimeout(timeout));
    }

    /// Diagnostics snapshot from the active backend.
    pub fn diagnostics(&mut self) -> Option<serde_json::Value> {
        match self.dispatch(Command::Diagnostics) {
            Some(CommandOutput::Diagnostics(snapshot)) => Some(snapshot),
            _ => None,
        }
    }
}

/// Invoke the trait operation matching a command.
fn execute(backend: &mut dyn PlaybackBackend, command: &Command) -> Result<CommandOutput> {
    match command {
        Command::LoadUrl(url) => backend.load_url(url).map(|_| CommandOutput::Ack),
        Command::LoadServerEndpoint { server, endpoint } => backend
            .load_server_endpoint(server, endpoint)
            .map(|_| CommandOutput::Ack),
        Command::LoadContainer(url) => backend.load_container(url).map(|_| CommandOutput::Ack),
        Command::LoadPlaylist(path) => backend.load_playlist(path).map(|_| CommandOutput::Ack),
        Command::Configure(source) => backend.configure(source).map(|_| CommandOutput::Ack),
        Command::Resume => backend.resume().map(|_| CommandOutput::Ack),
        Command::Pause => backend.pause().map(|_| CommandOutput::Ack),
        Command::Stop => backend.stop().map(|_| CommandOutput::Ack),
        Command::Cleanup => backend.cleanup().map(|_| CommandOutput::Ack),
        Command::Seek(position) => backend.seek(*position).map(|_| CommandOutput::Ack),
        Command::GetPosition => backend.position().map(CommandOutput::Position),
        Command::GetDuration => backend.duration().map(CommandOutput::Duration),
        Command::SetVolume(volume) => backend.set_volume(*volume).map(|_| CommandOutput::Ack),
        Command::SetBufferTime(buffer) => {
            backend.set_buffer_time(*buffer).map(|_| CommandOutput::Ack)
        }
        Command::SetPlaybackMode(mode) => {
            backend.set_playback_mode(*mode).map(|_| CommandOutput::Ack)
        }
        Command::GetPlaybackMode => backend.playback_mode().map(CommandOutput::Mode),
        Command::GetVersion => backend.version().map(CommandOutput::Version),
        Command::ForceMemoryReset => backend.force_memory_reset().map(|_| CommandOutput::Ack),
        Command::SetMemoryLimit(bytes) => {
            backend.set_memory_limit(*bytes).map(|_| CommandOutput::Ack)
        }
        Command::SetStallTimeout(timeout) => {
            backend.set_stall_timeout(*timeout).map(|_| CommandOutput::Ack)
        }
        Command::CreateObject => backend.create_object().map(|_| CommandOutput::Ack),
        Command::Diagnostics => backend.diagnostics().map(CommandOutput::Diagnostics),
    }
}
