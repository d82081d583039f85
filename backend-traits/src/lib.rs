//! # Backend Capability Traits
//!
//! Contract between the playback facade and concrete playback backends.
//!
//! ## Overview
//!
//! This crate defines the fixed set of operations any playback backend must
//! expose — load, transport control, seek, volume, buffering, diagnostics —
//! plus an environment availability probe. Backends implement partial
//! capability sets; the core checks [`PlaybackBackend::supports`] before
//! forwarding a command and treats a missing capability as a silent no-op.
//!
//! ## Contents
//!
//! - [`PlaybackBackend`](playback::PlaybackBackend) — the capability trait
//! - [`Command`](playback::Command) / [`CommandKind`](playback::CommandKind)
//!   — the command vocabulary routed by the dispatcher
//! - [`BackendNotification`](playback::BackendNotification) — backend-to-core
//!   lifecycle notifications
//! - [`StreamSource`](stream::StreamSource) / [`SessionParams`](stream::SessionParams)
//!   — stream descriptors and session configuration
//! - [`Clock`](time::Clock) — injectable time source for deterministic tests
//!
//! ## Error Handling
//!
//! Backend operations return [`BackendError`](error::BackendError).
//! `BackendError::Unsupported` is reserved for capability misses and is
//! never surfaced to consumers; `BackendError::Stream` feeds the core's
//! retry machinery.

pub mod error;
pub mod playback;
pub mod stream;
pub mod time;

pub use error::BackendError;

// Re-export commonly used types
pub use playback::{
    BackendFamily, BackendNotification, Command, CommandKind, CommandOutput, PlaybackBackend,
};
pub use stream::{PlaybackMode, SessionParams, StreamKind, StreamSource};
pub use time::{Clock, SystemClock};
