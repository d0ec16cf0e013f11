//! External collaborator interface.
//!
//! The core never renders, decodes assets, or plays audio. It acquires
//! opaque visual handles and emits sound requests through a [`Host`]
//! supplied by the embedding layer. Both calls are fire-and-forget from
//! the simulation's point of view: they must not block the tick, and any
//! acquisition failure is handled by the host's own error policy.

use serde::{Deserialize, Serialize};

/// Opaque handle to a loaded visual (sprite sheet, animation).
///
/// The core owns handles it acquires and persists them across
/// save/restore, but never interprets their contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

/// Capabilities the simulation consumes from its embedding layer.
pub trait Host {
    /// Load the visual asset named by `key` and return a handle to it.
    fn load_visual(&mut self, key: &str) -> VisualHandle;

    /// Release a handle previously returned by `load_visual`. Called
    /// when the owning missile is retired.
    fn release_visual(&mut self, handle: VisualHandle);

    /// Request playback of a named sound effect. One-way; no ordering
    /// guarantee relative to simulation state.
    fn request_sound(&mut self, effect: &str);
}

/// A host that satisfies every request with dummy handles and discards
/// sound requests. Used for headless runs and tests.
#[derive(Debug, Default)]
pub struct NullHost {
    next_handle: u64,
}

impl Host for NullHost {
    fn load_visual(&mut self, _key: &str) -> VisualHandle {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn release_visual(&mut self, _handle: VisualHandle) {}

    fn request_sound(&mut self, _effect: &str) {}
}

/// A host that records every request, for asserting on visual/sound
/// traffic in tests.
#[derive(Debug, Default)]
pub struct RecordingHost {
    next_handle: u64,
    /// Keys passed to `load_visual`, in call order.
    pub visuals: Vec<String>,
    /// Handles passed to `release_visual`, in call order.
    pub released: Vec<VisualHandle>,
    /// Effect names passed to `request_sound`, in call order.
    pub sounds: Vec<String>,
}

impl Host for RecordingHost {
    fn load_visual(&mut self, key: &str) -> VisualHandle {
        self.visuals.push(key.to_owned());
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn release_visual(&mut self, handle: VisualHandle) {
        self.released.push(handle);
    }

    fn request_sound(&mut self, effect: &str) {
        self.sounds.push(effect.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_host_hands_out_distinct_handles() {
        let mut host = NullHost::default();
        let a = host.load_visual("a");
        let b = host.load_visual("b");
        assert_ne!(a, b);
    }

    #[test]
    fn test_recording_host_captures_traffic() {
        let mut host = RecordingHost::default();
        let handle = host.load_visual("missiles/arrow/3");
        host.request_sound("missiles/arrow_impact");
        host.release_visual(handle);

        assert_eq!(host.visuals, vec!["missiles/arrow/3"]);
        assert_eq!(host.sounds, vec!["missiles/arrow_impact"]);
        assert_eq!(host.released, vec![handle]);
    }
}
