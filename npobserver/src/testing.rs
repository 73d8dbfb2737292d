//! In-memory page, element and channel used by the observer tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use npmodel::{PlaybackSnapshot, RelayMessage};

use crate::{
    Channel, ChannelGone, ElementId, HookError, MediaElement, MediaEvent, MediaSample, Page,
    PageContext, PageSignal, SettleTrigger, SignalSink,
};

pub(crate) struct FakeElement {
    id: ElementId,
    sample: Mutex<MediaSample>,
    sink: Mutex<Option<SignalSink>>,
    subscribes: AtomicUsize,
    unsubscribes: AtomicUsize,
    fail_attach: AtomicBool,
    fail_detach: AtomicBool,
}

impl FakeElement {
    pub(crate) fn new(id: u64, duration: f64, current_time: f64, playing: bool) -> Arc<Self> {
        Arc::new(Self {
            id: ElementId(id),
            sample: Mutex::new(MediaSample {
                duration,
                current_time,
                paused: !playing,
                ended: false,
            }),
            sink: Mutex::new(None),
            subscribes: AtomicUsize::new(0),
            unsubscribes: AtomicUsize::new(0),
            fail_attach: AtomicBool::new(false),
            fail_detach: AtomicBool::new(false),
        })
    }

    pub(crate) fn set_time(&self, current_time: f64) {
        self.sample.lock().unwrap().current_time = current_time;
    }

    pub(crate) fn set_paused(&self, paused: bool) {
        self.sample.lock().unwrap().paused = paused;
    }

    /// Dispatches `event` to the subscribed listener, if any.
    pub(crate) fn fire(&self, event: MediaEvent) -> bool {
        match self.sink.lock().unwrap().as_ref() {
            Some(sink) => sink.emit(PageSignal::Media {
                element: self.id,
                event,
            }),
            None => false,
        }
    }

    pub(crate) fn fail_attach(&self) {
        self.fail_attach.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_detach(&self) {
        self.fail_detach.store(true, Ordering::SeqCst);
    }

    pub(crate) fn subscribe_count(&self) -> usize {
        self.subscribes.load(Ordering::SeqCst)
    }

    pub(crate) fn unsubscribe_count(&self) -> usize {
        self.unsubscribes.load(Ordering::SeqCst)
    }
}

impl MediaElement for FakeElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn sample(&self) -> MediaSample {
        *self.sample.lock().unwrap()
    }

    fn subscribe(&self, events: &[MediaEvent], sink: SignalSink) -> Result<(), HookError> {
        assert_eq!(events.len(), MediaEvent::ALL.len());
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        if self.fail_attach.load(Ordering::SeqCst) {
            return Err(HookError::Listener(self.id, "addEventListener threw".to_string()));
        }
        *self.sink.lock().unwrap() = Some(sink);
        Ok(())
    }

    fn unsubscribe(&self, _events: &[MediaEvent]) -> Result<(), HookError> {
        self.unsubscribes.fetch_add(1, Ordering::SeqCst);
        if self.fail_detach.load(Ordering::SeqCst) {
            return Err(HookError::Detached(self.id));
        }
        *self.sink.lock().unwrap() = None;
        Ok(())
    }
}

pub(crate) struct FakePage {
    element: Mutex<Option<Arc<dyn MediaElement>>>,
    context: Mutex<PageContext>,
    watcher: Mutex<Option<SignalSink>>,
    disconnected: AtomicBool,
    queries: AtomicUsize,
}

impl FakePage {
    pub(crate) fn new(element: Option<Arc<FakeElement>>) -> Arc<Self> {
        Arc::new(Self {
            element: Mutex::new(element.map(|e| e as Arc<dyn MediaElement>)),
            context: Mutex::new(PageContext {
                location: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
                document_title: "Never Gonna Give You Up - YouTube".to_string(),
                channel_name: Some("Rick Astley".to_string()),
                ..PageContext::default()
            }),
            watcher: Mutex::new(None),
            disconnected: AtomicBool::new(false),
            queries: AtomicUsize::new(0),
        })
    }

    /// Swaps the element the stable query resolves to.
    pub(crate) fn set_element(&self, element: Option<Arc<FakeElement>>) {
        *self.element.lock().unwrap() = element.map(|e| e as Arc<dyn MediaElement>);
    }

    pub(crate) fn set_context(&self, context: PageContext) {
        *self.context.lock().unwrap() = context;
    }

    pub(crate) fn mutate(&self) -> bool {
        self.signal(PageSignal::Mutation)
    }

    pub(crate) fn settle(&self, trigger: SettleTrigger) -> bool {
        self.signal(PageSignal::Settle(trigger))
    }

    fn signal(&self, signal: PageSignal) -> bool {
        match self.watcher.lock().unwrap().as_ref() {
            Some(sink) => sink.emit(signal),
            None => false,
        }
    }

    pub(crate) fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }

    pub(crate) fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl Page for FakePage {
    fn query_media(&self, _selector: &str) -> Option<Arc<dyn MediaElement>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.element.lock().unwrap().clone()
    }

    fn context(&self) -> PageContext {
        self.context.lock().unwrap().clone()
    }

    fn watch_mutations(&self, sink: SignalSink) -> Result<(), HookError> {
        *self.watcher.lock().unwrap() = Some(sink);
        Ok(())
    }

    fn disconnect_mutations(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
        *self.watcher.lock().unwrap() = None;
    }
}

/// Records delivered payloads; can be closed to simulate an unloaded page.
#[derive(Clone, Default)]
pub(crate) struct RecordingChannel {
    sent: Arc<Mutex<Vec<PlaybackSnapshot>>>,
    attempts: Arc<AtomicUsize>,
    gone: Arc<AtomicBool>,
}

impl RecordingChannel {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sent(&self) -> Vec<PlaybackSnapshot> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn close(&self) {
        self.gone.store(true, Ordering::SeqCst);
    }
}

impl Channel for RecordingChannel {
    fn deliver(&self, message: RelayMessage) -> Result<(), ChannelGone> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.gone.load(Ordering::SeqCst) {
            return Err(ChannelGone("extension context invalidated".to_string()));
        }
        self.sent.lock().unwrap().push(message.into_payload());
        Ok(())
    }
}
