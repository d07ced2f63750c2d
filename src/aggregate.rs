//! Recognized-text aggregation and throttled publishing
//!
//! Each frame cycle replaces the display string wholesale; subscribers see it
//! through a trailing-edge throttle so a multi-times-per-second frame rate
//! does not churn the display surface.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, tick, unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

/// The current joined display string and when it last changed
#[derive(Debug, Clone)]
pub struct AggregatedResult {
    pub text: String,
    pub updated_at: Instant,
}

impl Default for AggregatedResult {
    fn default() -> Self {
        Self {
            text: String::new(),
            updated_at: Instant::now(),
        }
    }
}

#[derive(Default)]
struct Inner {
    current: RwLock<AggregatedResult>,
    /// Latest value not yet delivered to subscribers; cleared on publish
    pending: Mutex<Option<String>>,
    subscribers: Mutex<Vec<Sender<String>>>,
}

/// Accumulates each cycle's recognized fragments into a single display string
/// and republishes it under a time-based throttle.
///
/// `push_cycle` may be called from any thread (typically the capture callback
/// thread); replacement is last-writer-wins under a lock, so subscribers never
/// observe fragments from two cycles interleaved.
#[derive(Clone, Default)]
pub struct ResultAggregator {
    inner: Arc<Inner>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current value with this cycle's fragments joined by a
    /// single space, in input order. An empty cycle still overwrites the
    /// previous value with the empty string.
    pub fn push_cycle(&self, fragments: &[String]) {
        let joined = fragments.join(" ");
        {
            let mut current = self.inner.current.write();
            current.text = joined.clone();
            current.updated_at = Instant::now();
        }
        *self.inner.pending.lock() = Some(joined);
    }

    /// The current display string, readable at all times (not only at publish
    /// instants). This is what an external action trigger forwards downstream.
    pub fn current(&self) -> String {
        self.inner.current.read().text.clone()
    }

    pub fn current_result(&self) -> AggregatedResult {
        self.inner.current.read().clone()
    }

    /// Register a subscriber. The channel is primed with the current value so
    /// a sensible initial string is available immediately; there is no replay
    /// buffer beyond that.
    pub fn subscribe(&self) -> Receiver<String> {
        let (sender, receiver) = unbounded();
        let _ = sender.send(self.current());
        self.inner.subscribers.lock().push(sender);
        receiver
    }

    /// Tick body of the throttle: deliver the latest pending value if one
    /// arrived since the last tick, else do nothing. Values superseded within
    /// a window are dropped, never delivered.
    pub fn flush_pending(&self) {
        let Some(value) = self.inner.pending.lock().take() else {
            return;
        };
        let mut subscribers = self.inner.subscribers.lock();
        subscribers.retain(|sender| sender.send(value.clone()).is_ok());
        trace!(subscribers = subscribers.len(), "published aggregated text");
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }
}

/// Owns the throttle timer thread; publishing stops when this is dropped.
pub struct ThrottledPublisher {
    shutdown: Sender<()>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ThrottledPublisher {
    /// Spawn the publisher thread, flushing the aggregator's pending slot on
    /// every interval tick.
    pub fn start(aggregator: ResultAggregator, interval: Duration) -> Self {
        let (shutdown_sender, shutdown_receiver) = bounded(1);
        let ticker = tick(interval);
        let handle = thread::spawn(move || loop {
            select! {
                recv(ticker) -> _ => aggregator.flush_pending(),
                recv(shutdown_receiver) -> _ => break,
            }
        });
        debug!(?interval, "throttled publisher started");
        Self {
            shutdown: shutdown_sender,
            handle: Some(handle),
        }
    }
}

impl Drop for ThrottledPublisher {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
