//! Service configuration
//!
//! Read from `RANKING_*` environment variables, every value defaulted.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::backoff::BackoffConfig;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Where order payloads come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// One payload per line on standard input.
    Stdin,
    /// Kafka consumer group subscription.
    Kafka,
}

impl Default for SourceKind {
    fn default() -> Self {
        if cfg!(feature = "kafka") {
            SourceKind::Kafka
        } else {
            SourceKind::Stdin
        }
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdin" => Ok(SourceKind::Stdin),
            "kafka" => Ok(SourceKind::Kafka),
            other => Err(format!("unknown source {other:?}, expected stdin or kafka")),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Stdin => write!(f, "stdin"),
            SourceKind::Kafka => write!(f, "kafka"),
        }
    }
}

/// Kafka consumer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaConfig {
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
    pub fetch_min_bytes: u32,
    pub fetch_max_bytes: u32,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: "kafka:9092".to_string(),
            topic: "orders".to_string(),
            group_id: "ranking-service".to_string(),
            fetch_min_bytes: 1_000,
            fetch_max_bytes: 1_000_000,
        }
    }
}

/// Main service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// HTTP listen address for the query API.
    pub listen_addr: SocketAddr,
    pub source: SourceKind,
    pub kafka: KafkaConfig,
    pub backoff: BackoffConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            source: SourceKind::default(),
            kafka: KafkaConfig::default(),
            backoff: BackoffConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let mut kafka = defaults.kafka;
        if let Some(brokers) = lookup("RANKING_KAFKA_BROKERS") {
            kafka.brokers = brokers;
        }
        if let Some(topic) = lookup("RANKING_KAFKA_TOPIC") {
            kafka.topic = topic;
        }
        if let Some(group_id) = lookup("RANKING_KAFKA_GROUP") {
            kafka.group_id = group_id;
        }

        let mut backoff = defaults.backoff;
        backoff.initial_ms = parse_or(&lookup, "RANKING_BACKOFF_INITIAL_MS", backoff.initial_ms)?;
        backoff.max_ms = parse_or(&lookup, "RANKING_BACKOFF_MAX_MS", backoff.max_ms)?;
        if backoff.initial_ms > backoff.max_ms {
            return Err(ConfigError::Invalid {
                var: "RANKING_BACKOFF_INITIAL_MS",
                value: backoff.initial_ms.to_string(),
                reason: format!("exceeds RANKING_BACKOFF_MAX_MS ({})", backoff.max_ms),
            });
        }

        Ok(Self {
            listen_addr: parse_or(&lookup, "RANKING_LISTEN_ADDR", defaults.listen_addr)?,
            source: parse_or(&lookup, "RANKING_SOURCE", defaults.source)?,
            kafka,
            backoff,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}
