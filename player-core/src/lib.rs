//! # Player Core
//!
//! Unified playback facade over heterogeneous audio backends.
//!
//! ## Overview
//!
//! This crate provides:
//! - Backend registry and the deterministic selection policy
//! - Command dispatch with per-backend capability checks
//! - Session state (source, position, duration, mode, volume)
//! - Resilience: retry ceiling, stall watchdog, memory watchdog
//! - The [`PlayerFacade`] tying all of it to the event bus

pub mod config;
pub mod dispatch;
pub mod facade;
pub mod registry;
pub mod resilience;
pub mod session;

pub use config::PlayerConfig;
pub use facade::PlayerFacade;
pub use registry::{BackendRegistry, SelectionError};
pub use resilience::{Disposition, HealthState, Resilience};
pub use session::{PlaybackSession, MAX_VOLUME};
