use std::sync::{Arc, Weak};

use crate::{ElementId, MediaElement, TransmitState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No media element is subscribed.
    Unhooked,
    /// Listeners are attached to exactly one element.
    Hooked,
    /// The delivery channel went away. Terminal.
    Killed,
}

/// The element currently subscribed to.
///
/// Only a weak handle is kept: the page owns the element and may drop it
/// at any time.
pub(crate) struct HookedElement {
    pub(crate) id: ElementId,
    pub(crate) handle: Weak<dyn MediaElement>,
}

impl HookedElement {
    pub(crate) fn new(element: &Arc<dyn MediaElement>) -> Self {
        Self {
            id: element.id(),
            handle: Arc::downgrade(element),
        }
    }

    pub(crate) fn upgrade(&self) -> Option<Arc<dyn MediaElement>> {
        self.handle.upgrade()
    }
}

/// Mutable state of one observer run.
#[derive(Default)]
pub struct ObserverSession {
    pub(crate) hooked: Option<HookedElement>,
    pub(crate) transmit: TransmitState,
    pub(crate) killed: bool,
}

impl ObserverSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        if self.killed {
            SessionState::Killed
        } else if self.hooked.is_some() {
            SessionState::Hooked
        } else {
            SessionState::Unhooked
        }
    }

    pub fn hooked_id(&self) -> Option<ElementId> {
        self.hooked.as_ref().map(|h| h.id)
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    pub fn transmit(&self) -> &TransmitState {
        &self.transmit
    }
}
