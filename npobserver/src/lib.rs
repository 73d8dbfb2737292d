//! Change detection and re-acquisition engine for the now-playing observer.
//!
//! The observer lives next to a page whose media element is created, replaced
//! and destroyed at will. It never owns that element: it re-resolves it
//! through a stable query, subscribes to its events, and decides which
//! snapshots are worth sending down the delivery [`Channel`].
//!
//! ```text
//!  mutation watcher ─┐
//!  rehook interval  ─┼──► Observer::reacquire ──► hook / rehook
//!  settle timers    ─┘
//!  media events     ─┐
//!  heartbeat        ─┴──► TransmitState::evaluate ──► Channel::deliver
//! ```
//!
//! All triggers are serialized onto a single loop ([`ObserverDriver`]), so
//! the session needs no locking.

mod channel;
mod config;
mod driver;
mod element;
mod errors;
pub mod extract;
mod observer;
mod page;
mod policy;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use channel::Channel;
pub use config::ObserverConfig;
pub use driver::ObserverDriver;
pub use element::{ElementId, MediaElement, MediaEvent, MediaSample};
pub use errors::{ChannelGone, HookError};
pub use extract::{PageContext, PageMetadata};
pub use observer::Observer;
pub use page::{Page, PageSignal, SettleTrigger, SignalSink};
pub use policy::{TransmitPolicy, TransmitState, Verdict};
pub use session::{ObserverSession, SessionState};
