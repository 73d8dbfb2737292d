use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::{ElementId, HookError, MediaElement, MediaEvent, PageContext};

/// Something happened in the page that the observer may care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSignal {
    /// An event fired on a subscribed media element.
    Media { element: ElementId, event: MediaEvent },
    /// The watched subtree changed structurally.
    Mutation,
    /// The page moved to a state whose metadata will settle shortly.
    Settle(SettleTrigger),
}

/// Boundaries after which the page needs a forced re-acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettleTrigger {
    /// SPA route change finished. Title and thumbnail lag behind it.
    RouteChanged,
    /// Browser back/forward.
    HistoryNavigation,
    /// The page became visible again.
    VisibilityRegained,
}

impl SettleTrigger {
    /// Delays after the trigger at which a forced re-acquisition runs.
    pub fn delays(self) -> &'static [Duration] {
        const ROUTE: [Duration; 3] = [
            Duration::from_millis(200),
            Duration::from_millis(900),
            Duration::from_millis(1800),
        ];
        const HISTORY: [Duration; 1] = [Duration::from_millis(250)];
        const VISIBILITY: [Duration; 1] = [Duration::from_millis(150)];

        match self {
            SettleTrigger::RouteChanged => &ROUTE,
            SettleTrigger::HistoryNavigation => &HISTORY,
            SettleTrigger::VisibilityRegained => &VISIBILITY,
        }
    }
}

/// Sending half of the observer's signal loop.
#[derive(Debug, Clone)]
pub struct SignalSink {
    tx: mpsc::UnboundedSender<PageSignal>,
}

impl SignalSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PageSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Returns `false` once the observer loop is gone.
    pub fn emit(&self, signal: PageSignal) -> bool {
        self.tx.send(signal).is_ok()
    }
}

/// The page hosting the media element.
pub trait Page: Send + Sync {
    /// Resolves the active media element, if any.
    fn query_media(&self, selector: &str) -> Option<Arc<dyn MediaElement>>;

    /// Raw strings scraped from the document, see [`crate::extract`].
    fn context(&self) -> PageContext;

    /// Starts reporting structural changes as [`PageSignal::Mutation`].
    fn watch_mutations(&self, sink: SignalSink) -> Result<(), HookError>;

    fn disconnect_mutations(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_delays() {
        assert_eq!(SettleTrigger::RouteChanged.delays().len(), 3);
        assert_eq!(
            SettleTrigger::HistoryNavigation.delays(),
            &[Duration::from_millis(250)]
        );
        assert_eq!(
            SettleTrigger::VisibilityRegained.delays(),
            &[Duration::from_millis(150)]
        );
    }

    #[test]
    fn test_sink_reports_closed_loop() {
        let (sink, rx) = SignalSink::channel();
        assert!(sink.emit(PageSignal::Mutation));
        drop(rx);
        assert!(!sink.emit(PageSignal::Mutation));
    }
}
