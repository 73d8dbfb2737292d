use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep_until};
use tracing::debug;

use crate::{Channel, Observer, ObserverConfig, Page, PageSignal, SignalSink};

/// Runs an [`Observer`] on the tokio clock.
///
/// Page signals, the heartbeat, the periodic rehook and the settle timers
/// are multiplexed onto one loop, so the observer is only ever touched from
/// a single task. The loop ends when the observer is killed.
pub struct ObserverDriver {
    observer: Observer,
    signals: UnboundedReceiver<PageSignal>,
    settle_at: Vec<Instant>,
}

impl ObserverDriver {
    pub fn new(observer: Observer, signals: UnboundedReceiver<PageSignal>) -> Self {
        Self {
            observer,
            signals,
            settle_at: Vec::new(),
        }
    }

    /// Wires a fresh observer to its own signal loop.
    pub fn build(
        page: Arc<dyn Page>,
        channel: impl Channel + 'static,
        config: ObserverConfig,
    ) -> Self {
        let (sink, signals) = SignalSink::channel();
        Self::new(Observer::new(page, channel, config, sink), signals)
    }

    pub fn spawn(self) -> JoinHandle<Observer> {
        tokio::spawn(self.run())
    }

    /// Drives the observer until it is killed, then hands it back.
    pub async fn run(mut self) -> Observer {
        let config = self.observer.config().clone();
        let start = Instant::now();

        let mut heartbeat = interval_at(start + config.heartbeat, config.heartbeat);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut rehook = interval_at(start + config.rehook, config.rehook);
        rehook.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.observer.setup(start.into_std());

        while !self.observer.is_killed() {
            let next_settle = self.settle_at.iter().min().copied();

            tokio::select! {
                signal = self.signals.recv() => match signal {
                    Some(signal) => self.on_signal(signal),
                    None => {
                        debug!("Signal loop closed");
                        break;
                    }
                },
                _ = heartbeat.tick() => {
                    self.observer.on_heartbeat(Instant::now().into_std());
                }
                _ = rehook.tick() => {
                    self.observer.reacquire(Instant::now().into_std(), false);
                }
                _ = sleep_until(next_settle.unwrap_or_else(Instant::now)), if next_settle.is_some() => {
                    let now = Instant::now();
                    self.settle_at.retain(|at| *at > now);
                    self.observer.reacquire(now.into_std(), true);
                }
            }
        }

        self.observer
    }

    fn on_signal(&mut self, signal: PageSignal) {
        let now = Instant::now();
        match signal {
            PageSignal::Media { element, event } => {
                self.observer.on_media_event(element, event, now.into_std());
            }
            PageSignal::Mutation => self.observer.reacquire(now.into_std(), false),
            PageSignal::Settle(trigger) => {
                debug!("Scheduling forced reacquire after {:?}", trigger);
                self.settle_at
                    .extend(trigger.delays().iter().map(|delay| now + *delay));
            }
        }
    }
}
