use async_trait::async_trait;
use rdkafka::{
    consumer::{Consumer, StreamConsumer},
    message::Message,
    ClientConfig,
};
use tracing::info;

use super::{EventSource, TransportError};
use crate::config::KafkaConfig;

/// Consumer-group subscription to the orders topic.
///
/// Offsets are auto-committed, so delivery is at-least-once.
pub struct KafkaSource {
    consumer: StreamConsumer,
    label: String,
}

impl KafkaSource {
    pub fn connect(config: &KafkaConfig) -> Result<Self, TransportError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "earliest")
            .set("fetch.min.bytes", config.fetch_min_bytes.to_string())
            .set("max.partition.fetch.bytes", config.fetch_max_bytes.to_string())
            .create()
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        consumer
            .subscribe(&[config.topic.as_str()])
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        info!(
            brokers = %config.brokers,
            topic = %config.topic,
            group_id = %config.group_id,
            "Subscribed to order events"
        );

        Ok(Self {
            consumer,
            label: format!("kafka:{}", config.topic),
        })
    }
}

#[async_trait]
impl EventSource for KafkaSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn next_payload(&mut self) -> Result<Option<String>, TransportError> {
        match self.consumer.recv().await {
            // Non-UTF-8 bytes are replaced so the decoder rejects the payload.
            Ok(message) => Ok(Some(
                message
                    .payload()
                    .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                    .unwrap_or_default(),
            )),
            Err(e) => Err(TransportError::Read(e.to_string())),
        }
    }
}
