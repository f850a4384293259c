//! One-way, ordered message channel between builder and viewer
//!
//! Each direction is an unbounded tokio mpsc queue, so delivery is FIFO per
//! direction and posting never blocks the event loop.

use super::message::{BridgeMessage, Envelope};
use crate::error::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// One end of the bridge
#[derive(Debug)]
pub struct BridgeEndpoint {
    outgoing: UnboundedSender<Envelope>,
    incoming: UnboundedReceiver<Envelope>,
}

/// Create a connected `(builder, viewer)` endpoint pair
pub fn bridge_pair() -> (BridgeEndpoint, BridgeEndpoint) {
    let (to_viewer, from_builder) = mpsc::unbounded_channel();
    let (to_builder, from_viewer) = mpsc::unbounded_channel();
    (
        BridgeEndpoint {
            outgoing: to_viewer,
            incoming: from_viewer,
        },
        BridgeEndpoint {
            outgoing: to_builder,
            incoming: from_builder,
        },
    )
}

impl BridgeEndpoint {
    /// Post a typed message to the other side
    ///
    /// Returns whether the message was queued; a peer that has gone away
    /// simply does not receive it.
    pub fn post(&self, message: &BridgeMessage) -> Result<bool> {
        let envelope = message.to_envelope()?;
        Ok(self.post_envelope(envelope))
    }

    /// Post a raw envelope to the other side
    pub fn post_envelope(&self, envelope: Envelope) -> bool {
        let name = envelope.name.clone();
        match self.outgoing.send(envelope) {
            Ok(()) => true,
            Err(_) => {
                debug!(message = %name, "bridge peer closed, dropping message");
                false
            }
        }
    }

    /// Next queued message, if one is already waiting
    pub fn try_recv(&mut self) -> Option<Envelope> {
        self.incoming.try_recv().ok()
    }

    /// Wait for the next message; `None` once the peer is gone and the queue drained
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.incoming.recv().await
    }

    /// Drain every queued message
    pub fn drain(&mut self) -> Vec<Envelope> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
