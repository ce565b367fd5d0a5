use std::sync::Mutex;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::envelope::DispatchEnvelope;

/// Trait contract for `DispatchQueue` behavior.
///
/// Publication is fire-and-forget: the call never blocks the webhook
/// response path, and delivery failures after it returns are unobserved
/// by this layer.
pub trait DispatchQueue: Send + Sync {
    fn publish(&self, envelope: DispatchEnvelope);
}

/// Dispatch queue over an in-process unbounded channel.
pub struct MpscDispatchQueue {
    sender: UnboundedSender<DispatchEnvelope>,
}

impl MpscDispatchQueue {
    pub fn new(sender: UnboundedSender<DispatchEnvelope>) -> Self {
        Self { sender }
    }

    /// Builds a connected queue/receiver pair.
    pub fn channel() -> (Self, UnboundedReceiver<DispatchEnvelope>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl DispatchQueue for MpscDispatchQueue {
    fn publish(&self, envelope: DispatchEnvelope) {
        let event_id = envelope.event_id.clone();
        if self.sender.send(envelope).is_err() {
            tracing::warn!(
                event_id = %event_id,
                "dispatch queue receiver dropped, event discarded"
            );
        }
    }
}

#[derive(Default)]
/// Test-support queue capturing published envelopes in order.
pub struct RecordingDispatchQueue {
    published: Mutex<Vec<DispatchEnvelope>>,
}

impl RecordingDispatchQueue {
    pub fn published(&self) -> Vec<DispatchEnvelope> {
        self.published
            .lock()
            .map(|published| published.clone())
            .unwrap_or_default()
    }
}

impl DispatchQueue for RecordingDispatchQueue {
    fn publish(&self, envelope: DispatchEnvelope) {
        if let Ok(mut published) = self.published.lock() {
            published.push(envelope);
        }
    }
}
