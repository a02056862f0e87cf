use crate::result::InstanceResult;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Pool-level notifications, delivered through [`DaemonPool::subscribe`](crate::DaemonPool::subscribe).
#[derive(Clone, Debug, PartialEq)]
pub enum PoolEvent {
    /// Every instance answered the health probe without error.
    Online,
    /// At least one instance failed the health probe; carries every probe result.
    ConnectionFailed(Vec<InstanceResult>),
}

#[derive(Debug)]
pub(crate) struct EventHub {
    sender: broadcast::Sender<PoolEvent>,
}

impl EventHub {
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.sender.subscribe()
    }

    pub(crate) fn emit(&self, event: PoolEvent) {
        // no subscribers is fine
        let _ = self.sender.send(event);
    }
}
