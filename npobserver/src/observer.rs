use std::sync::Arc;
use std::time::Instant;

use npmodel::{PlaybackSnapshot, RelayMessage};
use tracing::{debug, info, trace, warn};

use crate::extract::extract_metadata;
use crate::session::HookedElement;
use crate::{
    Channel, ElementId, MediaElement, MediaEvent, ObserverConfig, ObserverSession,
    Page, SessionState, SignalSink,
};

/// Tracks the page's active media element and reports its playback state.
///
/// Every entry point takes the current instant so the engine can be driven
/// by a real clock ([`crate::ObserverDriver`]) or stepped by hand.
pub struct Observer {
    page: Arc<dyn Page>,
    channel: Box<dyn Channel>,
    config: ObserverConfig,
    sink: SignalSink,
    session: ObserverSession,
}

impl Observer {
    /// `sink` is handed to the page and to hooked elements; its receiving
    /// half must be drained by whoever drives the observer.
    pub fn new(
        page: Arc<dyn Page>,
        channel: impl Channel + 'static,
        config: ObserverConfig,
        sink: SignalSink,
    ) -> Self {
        Self {
            page,
            channel: Box::new(channel),
            config,
            sink,
            session: ObserverSession::new(),
        }
    }

    /// Starts the mutation watcher and performs the initial forced
    /// acquisition.
    pub fn setup(&mut self, now: Instant) {
        if self.session.killed {
            return;
        }

        if let Err(e) = self.page.watch_mutations(self.sink.clone()) {
            warn!("{}, falling back to periodic rehook", e);
        }
        self.reacquire(now, true);
    }

    /// Resolves the media element again and hooks it if it changed.
    ///
    /// A newly hooked element is always sent. With `force`, the current
    /// element is sent even when it did not change.
    pub fn reacquire(&mut self, now: Instant, force: bool) {
        if self.session.killed {
            return;
        }

        let Some(element) = self.page.query_media(&self.config.media_selector) else {
            if self.session.hooked.is_some() {
                debug!("Media element disappeared");
                self.unhook();
            }
            return;
        };

        if self.session.hooked_id() == Some(element.id()) {
            if force {
                self.maybe_send(&element, now, true);
            }
            return;
        }

        self.hook(&element);
        self.maybe_send(&element, now, true);
    }

    /// Makes `element` the hooked one. A listener that cannot be attached
    /// leaves the element hooked: the heartbeat still samples it.
    fn hook(&mut self, element: &Arc<dyn MediaElement>) {
        self.unhook();
        if let Err(e) = element.subscribe(&MediaEvent::ALL, self.sink.clone()) {
            debug!("Ignoring attach failure: {}", e);
        }
        self.session.hooked = Some(HookedElement::new(element));
        info!("Hooked media element {}", element.id());
    }

    /// Detaches listeners from the hooked element. Failures are ignored: the
    /// element may already be gone from the document.
    fn unhook(&mut self) {
        let Some(previous) = self.session.hooked.take() else {
            return;
        };

        if let Some(element) = previous.upgrade() {
            if let Err(e) = element.unsubscribe(&MediaEvent::ALL) {
                debug!("Ignoring detach failure: {}", e);
            }
        }
        debug!("Unhooked media element {}", previous.id);
    }

    /// Handles an event fired by a subscribed element.
    ///
    /// Events from an element that is no longer hooked are dropped.
    pub fn on_media_event(&mut self, element: ElementId, event: MediaEvent, now: Instant) {
        if self.session.killed || self.session.hooked_id() != Some(element) {
            trace!("Dropping {} from stale {}", event.dom_name(), element);
            return;
        }

        if let Some(hooked) = self.hooked_element() {
            trace!("{} on {}", event.dom_name(), element);
            self.maybe_send(&hooked, now, false);
        }
    }

    /// Periodic evaluation of the hooked element.
    pub fn on_heartbeat(&mut self, now: Instant) {
        if self.session.killed {
            return;
        }

        if let Some(hooked) = self.hooked_element() {
            self.maybe_send(&hooked, now, false);
        }
    }

    fn hooked_element(&self) -> Option<Arc<dyn MediaElement>> {
        self.session.hooked.as_ref().and_then(HookedElement::upgrade)
    }

    fn candidate(&self, element: &dyn MediaElement) -> PlaybackSnapshot {
        let sample = element.sample();
        let metadata = extract_metadata(&self.page.context());

        PlaybackSnapshot {
            source: self.config.source.clone(),
            title: metadata.title,
            channel: metadata.channel,
            url: metadata.url,
            media_id: metadata.media_id,
            thumbnail_url: metadata.thumbnail_url,
            playing: sample.playing(),
            ..PlaybackSnapshot::default()
        }
        .with_timing(sample.duration, sample.current_time)
    }

    fn maybe_send(&mut self, element: &Arc<dyn MediaElement>, now: Instant, force: bool) {
        // Skip scraping entirely when the verdict is already known.
        if !force && self.session.transmit.within_gap(&self.config.policy, now) {
            return;
        }

        let candidate = self.candidate(element.as_ref());
        let verdict = self
            .session
            .transmit
            .evaluate(&self.config.policy, &candidate, now, force);
        if !verdict.transmits() {
            return;
        }

        trace!(
            "Sending {:?} update: {} at {}s",
            verdict, candidate.title, candidate.position_seconds
        );
        if let Err(gone) = self.channel.deliver(RelayMessage::PlaybackUpdate(candidate)) {
            warn!("{}", gone);
            self.kill();
        }
    }

    /// Tears the session down for good: listeners, watcher and timers.
    pub fn kill(&mut self) {
        if self.session.killed {
            return;
        }

        self.unhook();
        self.page.disconnect_mutations();
        self.session.killed = true;
        info!("Observer stopped");
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn is_killed(&self) -> bool {
        self.session.killed
    }

    pub fn session(&self) -> &ObserverSession {
        &self.session
    }

    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }
}
