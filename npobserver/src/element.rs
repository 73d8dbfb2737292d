use std::fmt;

use crate::{HookError, SignalSink};

/// Identity of a media element, stable for the element's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "media#{}", self.0)
    }
}

/// Media events the observer listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaEvent {
    TimeUpdate,
    Play,
    Pause,
    Seeking,
    Seeked,
    Ended,
    LoadedMetadata,
}

impl MediaEvent {
    pub const ALL: [MediaEvent; 7] = [
        MediaEvent::TimeUpdate,
        MediaEvent::Play,
        MediaEvent::Pause,
        MediaEvent::Seeking,
        MediaEvent::Seeked,
        MediaEvent::Ended,
        MediaEvent::LoadedMetadata,
    ];

    /// DOM event name.
    pub fn dom_name(self) -> &'static str {
        match self {
            MediaEvent::TimeUpdate => "timeupdate",
            MediaEvent::Play => "play",
            MediaEvent::Pause => "pause",
            MediaEvent::Seeking => "seeking",
            MediaEvent::Seeked => "seeked",
            MediaEvent::Ended => "ended",
            MediaEvent::LoadedMetadata => "loadedmetadata",
        }
    }
}

/// Live fields read off a media element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaSample {
    /// May be NaN (no metadata yet) or infinite (live stream).
    pub duration: f64,
    pub current_time: f64,
    pub paused: bool,
    pub ended: bool,
}

impl MediaSample {
    pub fn playing(&self) -> bool {
        !self.paused && !self.ended
    }
}

/// Borrowed handle on a media element living in the page.
///
/// Listener registration goes through [`SignalSink`]: the element reports
/// its events as [`crate::PageSignal::Media`] tagged with its [`ElementId`].
pub trait MediaElement: Send + Sync {
    fn id(&self) -> ElementId;

    fn sample(&self) -> MediaSample;

    fn subscribe(&self, events: &[MediaEvent], sink: SignalSink) -> Result<(), HookError>;

    fn unsubscribe(&self, events: &[MediaEvent]) -> Result<(), HookError>;
}
