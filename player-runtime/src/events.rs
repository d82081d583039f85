//! # Event Bus
//!
//! Fixed lifecycle/state event vocabulary and a synchronous publish/subscribe
//! channel connecting the playback core to its consumers.
//!
//! ## Overview
//!
//! The event names are the wire contract consumers bind to; backend
//! implementations come and go behind the facade, the vocabulary does not.
//! Delivery semantics:
//!
//! - **Synchronous fan-out**: `emit` invokes every subscriber callback
//!   before returning, in subscription order.
//! - **No replay**: a subscriber added after an event fired never sees it.
//! - **Explicit unsubscription**: subscriptions are identified by a
//!   [`SubscriptionId`] and removed with [`EventBus::unsubscribe`].
//!
//! Each event is delivered with its typed payload plus an optional custom
//! JSON payload supplied by the emitter.
//!
//! ## Usage
//!
//! ```rust
//! use player_runtime::events::{EventBus, PlayerEvent};
//!
//! let bus = EventBus::new();
//! let id = bus.subscribe(|event, _custom| {
//!     println!("{}: {:?}", event.name(), event);
//! });
//!
//! bus.emit(&PlayerEvent::StartPlaying);
//! bus.unsubscribe(&id);
//! ```

use backend_traits::PlaybackMode;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

// ============================================================================
// Event Vocabulary
// ============================================================================

/// Error class carried by terminal `error` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    /// No matching source list for the active backend family; never retried.
    Configuration,
    /// Stream failed to load/play and the retry ceiling was exhausted.
    Stream,
}

/// The fixed event vocabulary emitted by the playback facade.
///
/// Variant wire names (see [`PlayerEvent::name`]) are versioned contract;
/// changing one breaks every consumer binding to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum PlayerEvent {
    /// Playback mode changed.
    Mode { mode: PlaybackMode },
    /// Buffering/load progress.
    LoadProgress { loaded: u64, total: Option<u64> },
    /// Playback started producing audio.
    StartPlaying,
    /// Playback paused.
    PausePlaying { position: Duration },
    /// Playback resumed after a pause.
    Resumed { position: Duration },
    /// Playback stopped.
    Stopped,
    /// Session torn down.
    #[serde(rename = "cleanedup")]
    CleanedUp,
    /// Stream duration became known.
    DurationSet { duration: Duration },
    /// End of stream reached.
    Ended,
    /// Periodic playhead position report.
    Update { position: Duration },
    /// Output volume changed.
    VolumeSet { volume: u8 },
    /// Cross-origin/security violation reported by the environment.
    SecurityError { message: String },
    /// Terminal error surfaced to consumers.
    Error { class: ErrorClass, message: String },
    /// No backend is available for this session.
    NoSupport,
}

impl PlayerEvent {
    /// Wire name of the event. Consumers bind to these strings.
    pub fn name(&self) -> &'static str {
        match self {
            PlayerEvent::Mode { .. } => "mode",
            PlayerEvent::LoadProgress { .. } => "loadProgress",
            PlayerEvent::StartPlaying => "startPlaying",
            PlayerEvent::PausePlaying { .. } => "pausePlaying",
            PlayerEvent::Resumed { .. } => "resumed",
            PlayerEvent::Stopped => "stopped",
            PlayerEvent::CleanedUp => "cleanedup",
            PlayerEvent::DurationSet { .. } => "durationSet",
            PlayerEvent::Ended => "ended",
            PlayerEvent::Update { .. } => "update",
            PlayerEvent::VolumeSet { .. } => "volumeSet",
            PlayerEvent::SecurityError { .. } => "securityError",
            PlayerEvent::Error { .. } => "error",
            PlayerEvent::NoSupport => "noSupport",
        }
    }

    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &'static str {
        match self {
            PlayerEvent::Mode { .. } => "Playback mode changed",
            PlayerEvent::LoadProgress { .. } => "Buffering progress",
            PlayerEvent::StartPlaying => "Playback started",
            PlayerEvent::PausePlaying { .. } => "Playback paused",
            PlayerEvent::Resumed { .. } => "Playback resumed",
            PlayerEvent::Stopped => "Playback stopped",
            PlayerEvent::CleanedUp => "Session cleaned up",
            PlayerEvent::DurationSet { .. } => "Stream duration known",
            PlayerEvent::Ended => "End of stream",
            PlayerEvent::Update { .. } => "Position update",
            PlayerEvent::VolumeSet { .. } => "Volume changed",
            PlayerEvent::SecurityError { .. } => "Security error",
            PlayerEvent::Error { .. } => "Playback error",
            PlayerEvent::NoSupport => "No backend available",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            PlayerEvent::Error { .. }
            | PlayerEvent::SecurityError { .. }
            | PlayerEvent::NoSupport => EventSeverity::Error,
            PlayerEvent::Mode { .. }
            | PlayerEvent::StartPlaying
            | PlayerEvent::Stopped
            | PlayerEvent::Ended
            | PlayerEvent::CleanedUp => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Subscriptions
// ============================================================================

/// Unique identifier for an event-bus subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Generate a new subscription identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

type Subscriber = Arc<dyn Fn(&PlayerEvent, Option<&Value>) + Send + Sync>;

// ============================================================================
// Event Bus
// ============================================================================

/// Synchronous publish/subscribe channel for [`PlayerEvent`]s.
///
/// Cloning the bus yields another handle to the same subscriber list, so the
/// facade and its components can share one bus without lifetimes.
///
/// Subscriber callbacks run on the emitting call stack. The subscriber list
/// is snapshotted before delivery, so callbacks may subscribe, unsubscribe,
/// or emit reentrantly; mutations take effect from the next emission.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<Vec<(SubscriptionId, Subscriber)>>>,
}

impl EventBus {
    /// Creates a new event bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber for every event.
    ///
    /// Returns the identifier used to unsubscribe. Subscribers are invoked
    /// in subscription order.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&PlayerEvent, Option<&Value>) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.subscribers.write().push((id, Arc::new(callback)));
        id
    }

    /// Removes a subscription. Returns `false` if the id was not registered.
    pub fn unsubscribe(&self, id: &SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| sub_id != id);
        subscribers.len() != before
    }

    /// Publishes an event with no custom payload.
    pub fn emit(&self, event: &PlayerEvent) {
        self.emit_with(event, None);
    }

    /// Publishes an event with an optional custom payload.
    ///
    /// Every current subscriber is invoked synchronously, in subscription
    /// order, before this method returns. Events are not replayed to later
    /// subscribers.
    pub fn emit_with(&self, event: &PlayerEvent, custom: Option<&Value>) {
        let snapshot: Vec<Subscriber> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in snapshot {
            callback(event, custom);
        }
    }

    /// Returns the number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Attaches a diagnostic subscriber that logs every event.
///
/// Logs event name, native payload, and any custom payload through
/// `tracing`. Intended for development; correct operation must never depend
/// on this subscriber being attached.
pub fn attach_diagnostics(bus: &EventBus) -> SubscriptionId {
    bus.subscribe(|event, custom| {
        tracing::debug!(
            target: "player_runtime::diagnostics",
            event = event.name(),
            payload = ?event,
            custom = ?custom,
            "{}",
            event.description()
        );
    })
}

// ============================================================================
// Tests
// ============================================================================
