//! # Playback Facade
//!
//! The single entry point consumers interact with. The facade owns the
//! backend registry, the event bus, the current session, and the resilience
//! state, and translates backend notifications into the fixed event
//! vocabulary.
//!
//! ## Overview
//!
//! The facade is single-threaded and cooperative: nothing happens between
//! calls into it. Commands run synchronously on the caller's stack, backend
//! notifications are ingested through [`PlayerFacade::on_backend_event`],
//! and time-based behavior (stall watchdog, memory watchdog, settings
//! fallback, position updates) is evaluated by [`PlayerFacade::tick`]
//! against the injected [`Clock`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use player_core::{PlayerConfig, PlayerFacade};
//! use backend_traits::{BackendFamily, SessionParams};
//! use std::time::Duration;
//!
//! # fn backends() -> Vec<Box<dyn backend_traits::PlaybackBackend>> { Vec::new() }
//! let mut player = PlayerFacade::new(PlayerConfig::default())?;
//! for backend in backends() {
//!     player.register_backend(backend);
//! }
//!
//! player.events().subscribe(|event, _| println!("{}", event.name()));
//!
//! let params = SessionParams::new(true, Duration::from_secs(5), false)
//!     .with_sources(BackendFamily::NativeAudio, vec!["https://host/live".into()]);
//! player.configure_session(params);
//! player.resume();
//! # Ok::<(), player_runtime::Error>(())
//! ```

use crate::config::PlayerConfig;
use crate::registry::BackendRegistry;
use crate::resilience::{Disposition, HealthState, Resilience};
use crate::session::PlaybackSession;
use backend_traits::{
    BackendFamily, BackendNotification, Clock, Command, PlaybackBackend, SessionParams,
    SystemClock,
};
use chrono::{DateTime, Utc};
use player_runtime::events::{ErrorClass, EventBus, PlayerEvent};
use player_runtime::Error;
use std::sync::Arc;

/// Unified playback facade over the registered backends.
pub struct PlayerFacade {
    pub(crate) config: PlayerConfig,
    pub(crate) registry: BackendRegistry,
    pub(crate) bus: EventBus,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) session: Option<PlaybackSession>,
    pub(crate) resilience: Resilience,
    pub(crate) params: Option<SessionParams>,
    pub(crate) selection_done: bool,
    pub(crate) paused: bool,
    pub(crate) volume: u8,
    pub(crate) volume_committed: bool,
    pub(crate) settings_deadline: Option<DateTime<Utc>>,
    pub(crate) last_update_emit: Option<DateTime<Utc>>,
}

impl PlayerFacade {
    /// Create a facade with the system clock.
    pub fn new(config: PlayerConfig) -> Result<Self, Error> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a facade with an injected clock, for deterministic tests.
    pub fn with_clock(config: PlayerConfig, clock: Arc<dyn Clock>) -> Result<Self, Error> {
        config.validate().map_err(Error::Config)?;
        let resilience = Resilience::new(
            config.retry_ceiling,
            config.memory_high_water_bytes,
            config.stall_timeout,
        );
        Ok(Self {
            volume: config.default_volume,
            config,
            registry: BackendRegistry::new(),
            bus: EventBus::new(),
            clock,
            session: None,
            resilience,
            params: None,
            selection_done: false,
            paused: false,
            volume_committed: false,
            settings_deadline: None,
            last_update_emit: None,
        })
    }

    /// Register a playback backend. Must happen before initialization.
    pub fn register_backend(&mut self, backend: Box<dyn PlaybackBackend>) {
        self.registry.register(backend);
    }

    /// The event bus consumers subscribe to.
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    /// Current session health.
    pub fn health(&self) -> HealthState {
        self.resilience.health()
    }

    /// Family of the active backend, once selection has run.
    pub fn active_family(&self) -> Option<BackendFamily> {
        self.registry.active_family()
    }

    /// Read-only view of the current session.
    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Run backend probing and selection.
    ///
    /// Selection is sticky: it runs once per facade unless a later
    /// [`PlayerFacade::configure_session`] arrives before any selection has
    /// succeeded. When no backend is usable a single `noSupport` event is
    /// emitted and `None` returned.
    ///
    /// Initialization also opens the settings window: if no stored volume
    /// arrives via [`PlayerFacade::apply_stored_volume`] before the window
    /// closes, [`PlayerFacade::tick`] commits the configured default volume.
    pub fn initialize(&mut self, prefer_native_audio: bool) -> Option<BackendFamily> {
        match self.registry.select(prefer_native_audio) {
            Ok(family) => {
                self.selection_done = true;
                if !self.volume_committed && self.settings_deadline.is_none() {
                    self.settings_deadline =
                        Some(self.clock.now() + to_chrono(self.config.settings_timeout));
                }
                Some(family)
            }
            Err(_) => {
                tracing::warn!("no playback backend available in this environment");
                self.bus.emit(&PlayerEvent::NoSupport);
                None
            }
        }
    }

    /// Commit a volume retrieved from persistent settings.
    ///
    /// First commit wins: once a volume has been committed, later stored
    /// values and the settings-timeout fallback are ignored.
    pub fn apply_stored_volume(&mut self, volume: u8) {
        if self.volume_committed {
            return;
        }
        self.set_volume(volume);
    }

    /// Configure a new playback session from per-family source lists.
    ///
    /// Runs selection first if it has not happened, resolves the source
    /// list for the active family, and prepares the backend. An empty
    /// resolved list is a configuration error, surfaced as a terminal
    /// `error` event and never retried.
    pub fn configure_session(&mut self, params: SessionParams) {
        if !self.selection_done && self.initialize(params.prefer_native_audio).is_none() {
            return;
        }
        let Some(family) = self.registry.active_family() else {
            self.bus.emit(&PlayerEvent::NoSupport);
            return;
        };

        let source = params.resolve(family);
        self.params = Some(params);
        if source.is_empty() {
            tracing::warn!(family = ?family, "no stream sources for the active backend family");
            self.bus.emit(&PlayerEvent::Error {
                class: ErrorClass::Configuration,
                message: format!("no stream sources configured for {family:?}"),
            });
            return;
        }

        if self.session.is_some() {
            self.cleanup();
        }

        let mode = source.mode;
        let mut session = PlaybackSession::new(source.clone(), self.volume);
        self.dispatch(Command::Configure(source));
        self.bus.emit(&PlayerEvent::Mode { mode });

        // Plugin backends need their audio object created eagerly; native
        // backends create theirs lazily and silently skip this.
        if family == BackendFamily::Plugin {
            self.dispatch(Command::CreateObject);
        }

        session.ready = true;
        self.session = Some(session);
    }

    /// Tear down the current session.
    ///
    /// Idempotent: a second cleanup with no session is a no-op apart from
    /// the `cleanedup` event consumers may key teardown logic on.
    pub fn cleanup(&mut self) {
        if self.registry.active().is_some() {
            self.dispatch(Command::Cleanup);
        }
        self.resilience.reset();
        self.session = None;
        self.paused = false;
        self.last_update_emit = None;
        self.bus.emit(&PlayerEvent::CleanedUp);
    }

    // ========================================================================
    // Backend notifications
    // ========================================================================

    /// Ingest a notification from the active backend.
    ///
    /// Updates session and health state and re-emits the corresponding
    /// consumer event. Backends never touch the event bus directly.
    pub fn on_backend_event(&mut self, notification: BackendNotification) {
        match notification {
            BackendNotification::LoadProgress { loaded, total } => {
                let now = self.clock.now();
                self.resilience.on_progress(now);
                self.bus.emit(&PlayerEvent::LoadProgress { loaded, total });
            }
            BackendNotification::Started => {
                self.resilience.on_playing();
                if self.paused {
                    self.paused = false;
                    let position = self.current_position();
                    self.bus.emit(&PlayerEvent::Resumed { position });
                } else {
                    self.bus.emit(&PlayerEvent::StartPlaying);
                }
            }
            BackendNotification::DurationKnown(duration) => {
                if let Some(session) = self.session.as_mut() {
                    session.duration = Some(duration);
                }
                self.bus.emit(&PlayerEvent::DurationSet { duration });
            }
            BackendNotification::Position(position) => {
                if let Some(session) = self.session.as_mut() {
                    session.position = position;
                }
            }
            BackendNotification::Ended => {
                self.resilience.on_stopped();
                self.bus.emit(&PlayerEvent::Ended);
            }
            BackendNotification::StreamError(message) => {
                self.handle_stream_error(&message);
            }
            BackendNotification::SecurityError(message) => {
                tracing::warn!(%message, "security violation reported by the environment");
                self.bus.emit(&PlayerEvent::SecurityError { message });
            }
        }
    }

    /// Classify a stream error and either retry or surface it.
    pub(crate) fn handle_stream_error(&mut self, message: &str) {
        match self.resilience.on_stream_error() {
            Disposition::Retry(command) => {
                tracing::warn!(
                    attempt = self.resilience.attempts(),
                    %message,
                    command = command.kind().name(),
                    "stream error, retrying load"
                );
                self.dispatch(command);
            }
            Disposition::Fail => {
                tracing::error!(%message, "stream error exceeded the retry ceiling");
                self.bus.emit(&PlayerEvent::Error {
                    class: ErrorClass::Stream,
                    message: message.to_string(),
                });
            }
        }
    }

    // ========================================================================
    // Cooperative timers
    // ========================================================================

    /// Evaluate all time-based behavior against the injected clock.
    ///
    /// The host drives this from its scheduling primitive (an interval
    /// timer, a frame callback). One call checks, in order: the settings
    /// fallback window, the buffering stall watchdog, the memory watchdog,
    /// and the periodic position `update` event.
    pub fn tick(&mut self) {
        let now = self.clock.now();

        if let Some(deadline) = self.settings_deadline {
            if now >= deadline {
                self.settings_deadline = None;
                if !self.volume_committed {
                    tracing::debug!(
                        volume = self.config.default_volume,
                        "settings window elapsed, committing default volume"
                    );
                    self.apply_stored_volume(self.config.default_volume);
                }
            }
        }

        if self.resilience.check_stall(now) {
            self.handle_stream_error("buffering stalled");
        }

        let estimate = self
            .registry
            .active()
            .and_then(|descriptor| descriptor.backend().memory_estimate());
        if self.resilience.memory_exceeded(estimate) {
            tracing::warn!(bytes = estimate, "memory high-water mark crossed, resetting backend");
            self.dispatch(Command::ForceMemoryReset);
        }

        // Health stays Playing across a pause; the paused flag keeps frozen
        // positions out of the update stream.
        if self.resilience.health() == HealthState::Playing && !self.paused {
            let due = match self.last_update_emit {
                Some(last) => now >= last + to_chrono(self.config.update_interval),
                None => true,
            };
            if due {
                self.last_update_emit = Some(now);
                let position = self.position().unwrap_or_default();
                self.bus.emit(&PlayerEvent::Update { position });
            }
        }
    }

    pub(crate) fn current_position(&self) -> std::time::Duration {
        self.session
            .as_ref()
            .map(|session| session.position)
            .unwrap_or_default()
    }
}

fn to_chrono(duration: std::time::Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::MAX)
}
