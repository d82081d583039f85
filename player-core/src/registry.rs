//! # Backend Registry & Selector
//!
//! Holds the registered playback backends, probes each for environment
//! availability, and applies the deterministic preference policy that picks
//! exactly one active backend before any playback command can succeed.
//!
//! ## Selection policy
//!
//! Evaluated in fixed priority order, first match wins:
//!
//! 1. Both families available and the caller prefers native audio → native.
//! 2. Both available, no native preference → plugin (historical default).
//! 3. Only native audio available → native.
//! 4. Only the plugin backend available → plugin.
//! 5. Neither available → `NoSupport`, terminal for the session.

use backend_traits::{BackendFamily, PlaybackBackend};
use thiserror::Error;

/// Selection failure: no registered backend is usable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    /// Neither backend family is available in this environment.
    #[error("No playback backend available")]
    NoSupport,
}

/// A registered backend plus the registry's bookkeeping about it.
///
/// The availability flag is computed once per initialization; the `in_use`
/// flag is set by the selector for at most one descriptor.
pub struct BackendDescriptor {
    backend: Box<dyn PlaybackBackend>,
    available: bool,
    in_use: bool,
}

impl BackendDescriptor {
    fn new(backend: Box<dyn PlaybackBackend>) -> Self {
        Self {
            backend,
            available: false,
            in_use: false,
        }
    }

    /// Backend name for logging.
    pub fn name(&self) -> &str {
        self.backend.name()
    }

    /// Family of the underlying backend.
    pub fn family(&self) -> BackendFamily {
        self.backend.family()
    }

    /// Availability as of the last probe.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Whether the selector marked this backend active.
    pub fn is_in_use(&self) -> bool {
        self.in_use
    }

    /// Shared view of the backend.
    pub fn backend(&self) -> &dyn PlaybackBackend {
        self.backend.as_ref()
    }
}

/// Registry of playback backends with the selection policy of the facade.
#[derive(Default)]
pub struct BackendRegistry {
    descriptors: Vec<BackendDescriptor>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend. Order matters only among backends of the same
    /// family: the first available one of a family wins.
    pub fn register(&mut self, backend: Box<dyn PlaybackBackend>) {
        self.descriptors.push(BackendDescriptor::new(backend));
    }

    /// Number of registered backends.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` if no backends are registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Registered descriptors, for diagnostics.
    pub fn descriptors(&self) -> &[BackendDescriptor] {
        &self.descriptors
    }

    /// Run the availability probe and the selection policy.
    ///
    /// Re-running clears any previous in-use flag and re-probes every
    /// backend, so re-initialization sees current environment state. On
    /// success exactly one descriptor is marked in use.
    pub fn select(&mut self, prefer_native_audio: bool) -> Result<BackendFamily, SelectionError> {
        for descriptor in &mut self.descriptors {
            descriptor.in_use = false;
            descriptor.available = descriptor.backend.probe_available();
        }

        let plugin = self.first_available(BackendFamily::Plugin);
        let native = self.first_available(BackendFamily::NativeAudio);

        let chosen = match (plugin, native) {
            (Some(_), Some(native_idx)) if prefer_native_audio => native_idx,
            (Some(plugin_idx), Some(_)) => plugin_idx,
            (None, Some(native_idx)) => native_idx,
            (Some(plugin_idx), None) => plugin_idx,
            (None, None) => return Err(SelectionError::NoSupport),
        };

        self.descriptors[chosen].in_use = true;
        let family = self.descriptors[chosen].family();
        tracing::info!(
            backend = self.descriptors[chosen].name(),
            family = ?family,
            "playback backend selected"
        );
        Ok(family)
    }

    fn first_available(&self, family: BackendFamily) -> Option<usize> {
        self.descriptors
            .iter()
            .position(|d| d.available && d.family() == family)
    }

    /// The active descriptor, if selection has succeeded.
    pub fn active(&self) -> Option<&BackendDescriptor> {
        self.descriptors.iter().find(|d| d.in_use)
    }

    /// Family of the active backend.
    pub fn active_family(&self) -> Option<BackendFamily> {
        self.active().map(BackendDescriptor::family)
    }

    /// Mutable access to the active backend for command dispatch.
    ///
    /// The explicit match lets the boxed backend unsize to the trait object
    /// at the `Some` expression; a `.map()` closure cannot, because `&mut`
    /// is invariant over the boxed type.
    pub fn active_backend_mut(&mut self) -> Option<&mut (dyn PlaybackBackend + '_)> {
        match self.descriptors.iter_mut().find(|d| d.in_use) {
            Some(descriptor) => Some(descriptor.backend.as_mut()),
            None => None,
        }
    }
}
