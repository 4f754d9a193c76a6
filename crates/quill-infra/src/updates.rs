//! In-process fan-out of the "changed" signal, backed by a
//! `tokio::sync::broadcast` channel.
//!
//! Every push channel holds its own receiver; dropping the receiver on
//! disconnect removes it from the set. Publishing never blocks: a full
//! buffer makes slow receivers observe `Lagged`, and publishing with zero
//! receivers is a no-op.

use tokio::sync::broadcast;

use quill_core::ports::ChangeNotifier;

/// Default buffer capacity per subscriber.
const DEFAULT_CAPACITY: usize = 64;

/// The opaque "changed" signal. Clients re-fetch on receipt; the signal
/// carries no payload differentiating operation or post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Changed;

/// Broadcast hub for update notifications, shared via `Arc`.
pub struct UpdateBus {
    sender: broadcast::Sender<Changed>,
}

impl UpdateBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new push channel.
    pub fn subscribe(&self) -> broadcast::Receiver<Changed> {
        self.sender.subscribe()
    }

    /// Number of currently live channels.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for UpdateBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeNotifier for UpdateBus {
    fn notify_changed(&self) {
        // The SendError only means there are zero receivers right now.
        let _ = self.sender.send(Changed);
    }
}
