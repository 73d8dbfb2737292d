use thiserror::Error;

use crate::ElementId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    #[error("media element {0} is detached from the document")]
    Detached(ElementId),
    #[error("listener operation failed on {0}: {1}")]
    Listener(ElementId, String),
    #[error("mutation watcher unavailable: {0}")]
    Watcher(String),
}

/// The delivery primitive itself is gone (page context unloading, runtime
/// torn down). Terminal for the observer session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("delivery channel is gone: {0}")]
pub struct ChannelGone(pub String);
