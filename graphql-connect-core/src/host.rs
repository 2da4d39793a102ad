//! What a component overlay needs from the component it wraps.

use crate::Field;

/// A UI component that can carry a [`QueryableComponent`](crate::QueryableComponent)
/// overlay.
pub trait ComponentHost: Send + Sync + 'static {
    /// Called once when the component is permanently removed from its host.
    fn disconnected(&self);

    /// Called synchronously after an observable field was assigned.
    ///
    /// Hosts that render use this to schedule a re-render.
    fn request_update(&self, _field: Field) {}
}

/// Headless host for overlays that are not attached to any UI.
impl ComponentHost for () {
    fn disconnected(&self) {}
}
