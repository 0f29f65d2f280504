use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

const DEFAULT_CAPACITY: usize = 256;

/// Slot state transition pushed to every connected viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotUpdate {
    pub expert_id: Uuid,
    pub date: String,
    pub time: String,
    pub is_booked: bool,
}

/// Publish/subscribe seam between the reservation path and whatever
/// transport carries events to clients.
///
/// Delivery is best-effort and at most once per subscriber. Subscribers only
/// see events published after they subscribed and are expected to re-fetch
/// slots on reconnect.
pub trait Notifier: Send + Sync {
    /// Returns how many subscribers the event was handed to.
    fn publish(&self, event: SlotUpdate) -> usize;

    fn subscribe(&self) -> Subscription;

    fn subscriber_count(&self) -> usize;
}

/// In-process fan-out over a `tokio::sync::broadcast` channel.
#[derive(Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<SlotUpdate>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Notifier for BroadcastNotifier {
    fn publish(&self, event: SlotUpdate) -> usize {
        // No receivers is not an error, nobody is watching.
        self.sender.send(event).unwrap_or(0)
    }

    fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

pub struct Subscription {
    receiver: broadcast::Receiver<SlotUpdate>,
}

impl Subscription {
    /// Next event, or `None` once the notifier is gone. Events dropped
    /// because this subscriber fell behind are skipped, never replayed.
    pub async fn next(&mut self) -> Option<SlotUpdate> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Slot update subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = SlotUpdate> + Send + 'static {
        futures::stream::unfold(self, |mut subscription| async move {
            subscription.next().await.map(|event| (event, subscription))
        })
    }
}
