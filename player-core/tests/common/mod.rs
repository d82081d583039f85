//! Shared fixtures: a manually advanced clock, a recording fake backend,
//! and an event collector.

#![allow(dead_code)]

use backend_traits::error::{BackendError, Result};
use backend_traits::{
    BackendFamily, Clock, CommandKind, PlaybackBackend, PlaybackMode, SessionParams, StreamSource,
};
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use player_runtime::events::{EventBus, PlayerEvent};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Clock
// ============================================================================

/// Test clock advanced explicitly by the test body.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(epoch_seconds: i64) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc.timestamp_opt(epoch_seconds, 0).unwrap()),
        })
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += chrono::Duration::from_std(by).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

// ============================================================================
// Fake backend
// ============================================================================

/// Handle into a [`FakeBackend`]'s recorded state, kept by the test after
/// the backend itself moves into the facade.
#[derive(Clone, Default)]
pub struct BackendProbe {
    pub calls: Arc<Mutex<Vec<String>>>,
    /// While positive, load commands fail with a stream error and the
    /// counter decrements.
    pub load_failures: Arc<Mutex<u32>>,
    pub memory: Arc<Mutex<Option<u64>>>,
    pub position: Arc<Mutex<Duration>>,
    pub duration: Arc<Mutex<Option<Duration>>>,
}

impl BackendProbe {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == name).count()
    }

    pub fn fail_next_loads(&self, count: u32) {
        *self.load_failures.lock() = count;
    }
}

/// Recording backend with a configurable capability set.
pub struct FakeBackend {
    name: &'static str,
    family: BackendFamily,
    available: bool,
    supported: HashSet<CommandKind>,
    mode: Mutex<PlaybackMode>,
    probe: BackendProbe,
}

const ALL_KINDS: [CommandKind; 22] = [
    CommandKind::LoadUrl,
    CommandKind::LoadServerEndpoint,
    CommandKind::LoadContainer,
    CommandKind::LoadPlaylist,
    CommandKind::Configure,
    CommandKind::Resume,
    CommandKind::Pause,
    CommandKind::Stop,
    CommandKind::Cleanup,
    CommandKind::Seek,
    CommandKind::GetPosition,
    CommandKind::GetDuration,
    CommandKind::SetVolume,
    CommandKind::SetBufferTime,
    CommandKind::SetPlaybackMode,
    CommandKind::GetPlaybackMode,
    CommandKind::GetVersion,
    CommandKind::ForceMemoryReset,
    CommandKind::SetMemoryLimit,
    CommandKind::SetStallTimeout,
    CommandKind::CreateObject,
    CommandKind::Diagnostics,
];

impl FakeBackend {
    /// Plugin-family backend supporting the full command surface.
    pub fn plugin() -> (Box<Self>, BackendProbe) {
        let probe = BackendProbe::default();
        let backend = Box::new(Self {
            name: "fake-plugin",
            family: BackendFamily::Plugin,
            available: true,
            supported: ALL_KINDS.into_iter().collect(),
            mode: Mutex::new(PlaybackMode::OnDemand),
            probe: probe.clone(),
        });
        (backend, probe)
    }

    /// Native-audio backend with the reduced capability set of a browser
    /// audio element.
    pub fn native() -> (Box<Self>, BackendProbe) {
        let probe = BackendProbe::default();
        let supported = ALL_KINDS
            .into_iter()
            .filter(|kind| {
                !matches!(
                    kind,
                    CommandKind::LoadServerEndpoint
                        | CommandKind::LoadPlaylist
                        | CommandKind::SetBufferTime
                        | CommandKind::CreateObject
                        | CommandKind::ForceMemoryReset
                        | CommandKind::SetMemoryLimit
                        | CommandKind::Diagnostics
                )
            })
            .collect();
        let backend = Box::new(Self {
            name: "fake-native",
            family: BackendFamily::NativeAudio,
            available: true,
            supported,
            mode: Mutex::new(PlaybackMode::OnDemand),
            probe: probe.clone(),
        });
        (backend, probe)
    }

    /// Backend whose environment probe fails.
    pub fn unavailable(family: BackendFamily) -> Box<Self> {
        Box::new(Self {
            name: "fake-unavailable",
            family,
            available: false,
            supported: HashSet::new(),
            mode: Mutex::new(PlaybackMode::OnDemand),
            probe: BackendProbe::default(),
        })
    }

    fn record(&self, kind: CommandKind) {
        self.probe.calls.lock().push(kind.name().to_string());
    }

    fn load(&self, kind: CommandKind) -> Result<()> {
        self.record(kind);
        let mut failures = self.probe.load_failures.lock();
        if *failures > 0 {
            *failures -= 1;
            return Err(BackendError::Stream("synthetic load failure".into()));
        }
        Ok(())
    }
}

impl PlaybackBackend for FakeBackend {
    fn name(&self) -> &str {
        self.name
    }

    fn family(&self) -> BackendFamily {
        self.family
    }

    fn probe_available(&self) -> bool {
        self.available
    }

    fn supports(&self, command: CommandKind) -> bool {
        self.supported.contains(&command)
    }

    fn load_url(&mut self, _url: &str) -> Result<()> {
        self.load(CommandKind::LoadUrl)
    }

    fn load_server_endpoint(&mut self, _server: &str, _endpoint: &str) -> Result<()> {
        self.load(CommandKind::LoadServerEndpoint)
    }

    fn load_container(&mut self, _url: &str) -> Result<()> {
        self.load(CommandKind::LoadContainer)
    }

    fn load_playlist(&mut self, _path: &str) -> Result<()> {
        self.load(CommandKind::LoadPlaylist)
    }

    fn configure(&mut self, _source: &StreamSource) -> Result<()> {
        self.record(CommandKind::Configure);
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.record(CommandKind::Resume);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.record(CommandKind::Pause);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.record(CommandKind::Stop);
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        self.record(CommandKind::Cleanup);
        Ok(())
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.record(CommandKind::Seek);
        *self.probe.position.lock() = position;
        Ok(())
    }

    fn position(&self) -> Result<Duration> {
        self.record(CommandKind::GetPosition);
        Ok(*self.probe.position.lock())
    }

    fn duration(&self) -> Result<Option<Duration>> {
        self.record(CommandKind::GetDuration);
        Ok(*self.probe.duration.lock())
    }

    fn set_volume(&mut self, _volume: u8) -> Result<()> {
        self.record(CommandKind::SetVolume);
        Ok(())
    }

    fn set_buffer_time(&mut self, _buffer: Duration) -> Result<()> {
        self.record(CommandKind::SetBufferTime);
        Ok(())
    }

    fn set_playback_mode(&mut self, mode: PlaybackMode) -> Result<()> {
        self.record(CommandKind::SetPlaybackMode);
        *self.mode.lock() = mode;
        Ok(())
    }

    fn playback_mode(&self) -> Result<PlaybackMode> {
        self.record(CommandKind::GetPlaybackMode);
        Ok(*self.mode.lock())
    }

    fn version(&self) -> Result<String> {
        self.record(CommandKind::GetVersion);
        Ok("fake-1.0".to_string())
    }

    fn force_memory_reset(&mut self) -> Result<()> {
        self.record(CommandKind::ForceMemoryReset);
        Ok(())
    }

    fn set_memory_limit(&mut self, _bytes: u64) -> Result<()> {
        self.record(CommandKind::SetMemoryLimit);
        Ok(())
    }

    fn set_stall_timeout(&mut self, _timeout: Duration) -> Result<()> {
        self.record(CommandKind::SetStallTimeout);
        Ok(())
    }

    fn create_object(&mut self) -> Result<()> {
        self.record(CommandKind::CreateObject);
        Ok(())
    }

    fn diagnostics(&self) -> Result<serde_json::Value> {
        self.record(CommandKind::Diagnostics);
        Ok(serde_json::json!({ "backend": self.name }))
    }

    fn memory_estimate(&self) -> Option<u64> {
        *self.probe.memory.lock()
    }
}

// ============================================================================
// Event collection
// ============================================================================

pub type EventLog = Arc<Mutex<Vec<PlayerEvent>>>;

/// Subscribe a collector that records every emitted event.
pub fn collect_events(bus: &EventBus) -> EventLog {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    bus.subscribe(move |event, _| sink.lock().push(event.clone()));
    log
}

/// Wire names of all collected events, in emission order.
pub fn event_names(log: &EventLog) -> Vec<&'static str> {
    log.lock().iter().map(PlayerEvent::name).collect()
}

/// Session parameters with a single source list for one family.
pub fn params_for(family: BackendFamily, uris: &[&str], live: bool) -> SessionParams {
    SessionParams::new(live, Duration::from_secs(3), false)
        .with_sources(family, uris.iter().map(|u| u.to_string()).collect())
}
