//! In-process fan-out of call status events.

use dialtone_types::CallStatusEvent;
use tokio::sync::broadcast;

/// Publish/subscribe channel for [`CallStatusEvent`]s.
///
/// Backed by a `tokio::sync::broadcast` channel: every subscriber sees the
/// events published after it subscribed, in publish order. There is no
/// replay. A subscriber that falls more than `capacity` events behind loses
/// the oldest ones and gets a `Lagged` error on its next receive; the
/// publisher is never told.
#[derive(Debug, Clone)]
pub struct CallEventBus {
    tx: broadcast::Sender<CallStatusEvent>,
}

impl CallEventBus {
    /// Buffer size used by [`CallEventBus::default`].
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Creates a bus that buffers up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Delivers `event` to every current subscriber and returns how many
    /// there were. Publishing with nobody listening is not an error.
    pub fn publish(&self, event: CallStatusEvent) -> usize {
        match self.tx.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!(
                    call_id = %event.call_id,
                    status = %event.status,
                    "no live subscribers for call status event"
                );
                0
            }
        }
    }

    /// Registers a new observer.
    pub fn subscribe(&self) -> broadcast::Receiver<CallStatusEvent> {
        self.tx.subscribe()
    }

    /// Number of currently connected observers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for CallEventBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
