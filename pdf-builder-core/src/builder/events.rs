//! Events emitted to external listeners

use crate::schema::{ComponentNode, FormSchema};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Notification for listeners such as a property panel or a persistence layer
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderEvent {
    /// A component was placed
    AddComponent(ComponentNode),
    /// A component's overlay changed
    UpdateComponent(ComponentNode),
    /// The form document changed as a whole
    Change(FormSchema),
}

impl BuilderEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BuilderEvent::AddComponent(_) => "addComponent",
            BuilderEvent::UpdateComponent(_) => "updateComponent",
            BuilderEvent::Change(_) => "change",
        }
    }
}

/// Fan-out of builder events to every live subscriber
#[derive(Debug, Default)]
pub struct EventEmitter {
    subscribers: Vec<UnboundedSender<BuilderEvent>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<BuilderEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver `event` to every subscriber, forgetting the ones that hung up
    pub fn emit(&mut self, event: BuilderEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subscriber_receives_events() {
        let mut emitter = EventEmitter::new();
        let mut first = emitter.subscribe();
        let mut second = emitter.subscribe();

        emitter.emit(BuilderEvent::Change(FormSchema::pdf()));

        assert_eq!(first.try_recv().unwrap().name(), "change");
        assert_eq!(second.try_recv().unwrap().name(), "change");
    }

    #[test]
    fn test_closed_subscribers_are_pruned() {
        let mut emitter = EventEmitter::new();
        let kept = emitter.subscribe();
        drop(emitter.subscribe());

        emitter.emit(BuilderEvent::AddComponent(ComponentNode::new("email")));
        assert_eq!(emitter.subscriber_count(), 1);
        drop(kept);
    }
}
