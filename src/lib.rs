//! Workspace placeholder crate.
//!
//! This crate exists to expose the playback facade through a single
//! dependency. Host applications can depend on `player-workspace` with the
//! default `facade` feature instead of wiring the individual workspace
//! crates themselves.

#[cfg(feature = "facade")]
pub use player_core as facade;
