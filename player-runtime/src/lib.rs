//! # Player Runtime
//!
//! Ambient runtime services for the playback facade workspace.
//!
//! ## Overview
//!
//! This crate provides:
//! - The fixed [`PlayerEvent`](events::PlayerEvent) vocabulary and the
//!   synchronous [`EventBus`](events::EventBus) consumers subscribe to
//! - A diagnostic subscriber that mirrors all event traffic into `tracing`
//! - Logging bootstrap over `tracing-subscriber`
//!
//! The event names are a versioned wire contract: backends change behind the
//! facade, the vocabulary does not.

pub mod error;
pub mod events;
pub mod logging;

pub use error::Error;
pub use events::{
    attach_diagnostics, ErrorClass, EventBus, EventSeverity, PlayerEvent, SubscriptionId,
};
pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
