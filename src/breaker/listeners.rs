//! Transition listener slots.

use crate::core::StateKind;
use std::fmt;
use std::sync::Arc;

/// Zero-argument callback fired when the breaker enters a state.
///
/// Listeners run synchronously while the breaker's lock is held. They must
/// not block or call back into the same breaker.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// One optional listener per target state.
#[derive(Clone, Default)]
pub struct Listeners {
    pub(crate) to_closed: Option<Listener>,
    pub(crate) to_half_open: Option<Listener>,
    pub(crate) to_open: Option<Listener>,
}

impl Listeners {
    /// Install the same listener for every target state.
    pub(crate) fn set_all(&mut self, listener: Listener) {
        self.to_closed = Some(Arc::clone(&listener));
        self.to_half_open = Some(Arc::clone(&listener));
        self.to_open = Some(listener);
    }

    pub(crate) fn slot_mut(&mut self, target: StateKind) -> &mut Option<Listener> {
        match target {
            StateKind::Closed => &mut self.to_closed,
            StateKind::HalfOpen => &mut self.to_half_open,
            StateKind::Open => &mut self.to_open,
        }
    }

    /// Fire the listener registered for `target`, if any.
    pub(crate) fn notify(&self, target: StateKind) {
        let slot = match target {
            StateKind::Closed => &self.to_closed,
            StateKind::HalfOpen => &self.to_half_open,
            StateKind::Open => &self.to_open,
        };
        if let Some(listener) = slot {
            listener();
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("to_closed", &self.to_closed.is_some())
            .field("to_half_open", &self.to_half_open.is_some())
            .field("to_open", &self.to_open.is_some())
            .finish()
    }
}
