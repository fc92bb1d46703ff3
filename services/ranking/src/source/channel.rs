use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{EventSource, TransportError};

/// Payloads (or injected transport failures) fed through a tokio channel.
///
/// Closed once every sender is dropped and the buffer is drained.
pub struct ChannelSource {
    rx: mpsc::Receiver<Result<String, TransportError>>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<Result<String, TransportError>>) -> Self {
        Self { rx }
    }

    /// Create a bounded channel and the source reading from it.
    pub fn channel(capacity: usize) -> (mpsc::Sender<Result<String, TransportError>>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl EventSource for ChannelSource {
    fn name(&self) -> &str {
        "channel"
    }

    async fn next_payload(&mut self) -> Result<Option<String>, TransportError> {
        match self.rx.recv().await {
            Some(item) => item.map(Some),
            None => Ok(None),
        }
    }
}
