//! Bounded, lossy event delivery.
//!
//! Publishing never blocks: events go onto a bounded crossbeam channel with
//! `try_send`, and an event that does not fit is dropped and counted. A
//! background thread drains the channel into the registered listener.

use crate::engine::events::{EventListener, MatchingEvent};
use crate::engine::stats::EngineStats;
use crossbeam::channel::{Receiver, Sender, TrySendError, bounded};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::JoinHandle;
use tracing::{error, info, warn};

struct Consumer {
    shutdown: Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns the event queue and its consumer thread.
pub struct EventPublisher {
    sender: Sender<MatchingEvent>,
    receiver: Receiver<MatchingEvent>,
    listener: Arc<RwLock<Option<EventListener>>>,
    stats: Arc<EngineStats>,
    consumer: Mutex<Option<Consumer>>,
}

impl EventPublisher {
    /// Create a publisher with a queue of `capacity` events.
    pub fn new(capacity: usize, stats: Arc<EngineStats>) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            listener: Arc::new(RwLock::new(None)),
            stats,
            consumer: Mutex::new(None),
        }
    }

    /// Replace the listener. Takes effect for the next delivered event.
    pub fn set_listener(&self, listener: Option<EventListener>) {
        let mut guard = self.listener.write().unwrap_or_else(PoisonError::into_inner);
        *guard = listener;
    }

    /// Queue an event without blocking. On a full queue the event is dropped.
    pub fn publish(&self, event: MatchingEvent) {
        match self.sender.try_send(event) {
            Ok(()) => self.stats.record_published(),
            Err(TrySendError::Full(event)) | Err(TrySendError::Disconnected(event)) => {
                self.stats.record_dropped();
                #[cfg(feature = "metrics")]
                ::metrics::counter!("matching_engine_dropped_events_total").increment(1);
                warn!(
                    "Event queue full, dropped {} for {} ({} dropped so far)",
                    event.kind(),
                    event.symbol(),
                    self.stats.dropped_events()
                );
            }
        }
    }

    /// Number of events waiting in the queue.
    pub fn queued(&self) -> usize {
        self.receiver.len()
    }

    /// Spawn the consumer thread.
    pub fn start(&self) -> std::io::Result<()> {
        let mut consumer = self.consumer.lock().unwrap_or_else(PoisonError::into_inner);
        if consumer.is_some() {
            return Ok(());
        }

        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let events = self.receiver.clone();
        let listener = Arc::clone(&self.listener);

        let handle = std::thread::Builder::new()
            .name("matching-events".to_string())
            .spawn(move || {
                info!("Event consumer started");
                loop {
                    crossbeam::select! {
                        recv(events) -> event => match event {
                            Ok(event) => deliver(&listener, &event),
                            Err(_) => break,
                        },
                        recv(shutdown_rx) -> _ => {
                            for event in events.try_iter() {
                                deliver(&listener, &event);
                            }
                            break;
                        }
                    }
                }
                info!("Event consumer stopped");
            })?;

        *consumer = Some(Consumer {
            shutdown: shutdown_tx,
            handle,
        });
        Ok(())
    }

    /// Signal the consumer to deliver what is queued and exit, then join it.
    pub fn stop(&self) {
        let consumer = self
            .consumer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(consumer) = consumer else {
            return;
        };
        let _ = consumer.shutdown.send(());
        if consumer.handle.join().is_err() {
            error!("Event consumer thread panicked");
        }
    }
}

impl std::fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPublisher")
            .field("queued", &self.receiver.len())
            .field("capacity", &self.sender.capacity())
            .finish()
    }
}

fn deliver(listener: &RwLock<Option<EventListener>>, event: &MatchingEvent) {
    let listener = listener
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    if let Some(listener) = listener
        && catch_unwind(AssertUnwindSafe(|| listener(event))).is_err()
    {
        error!("Event listener panicked on {}", event.kind());
    }
}
