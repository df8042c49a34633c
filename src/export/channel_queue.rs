use super::{MessageQueue, QueueError};
use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub queue: String,
    pub payload: String,
}

/// Hands messages to an in-process consumer over a bounded channel.
///
/// Publishing never waits on the consumer: a full channel fails with
/// [`QueueError::Full`] and a dropped receiver with [`QueueError::Closed`].
#[derive(Clone)]
pub struct ChannelMessageQueue {
    sender: mpsc::Sender<QueuedMessage>,
}

impl ChannelMessageQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<QueuedMessage>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (ChannelMessageQueue { sender }, receiver)
    }
}

#[async_trait]
impl MessageQueue for ChannelMessageQueue {
    async fn publish(&self, queue: &str, message: &str) -> Result<(), QueueError> {
        self.sender
            .try_send(QueuedMessage {
                queue: queue.to_string(),
                payload: message.to_string(),
            })
            .map_err(|err| match err {
                TrySendError::Full(_) => QueueError::Full(queue.to_string()),
                TrySendError::Closed(_) => QueueError::Closed(queue.to_string()),
            })
    }
}
