use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;

/// The downstream message-bus contract: an opaque, thread-safe, best-effort
/// sink. The pipeline core only ever depends on this trait, not on any
/// concrete broker client — passed in as an explicit collaborator rather
/// than reached for as a singleton producer.
pub trait MessageBus: Send + Sync {
  /// Publish `payload` to `topic`/`partition`. Asynchronous and
  /// best-effort: implementations must not block the caller on network
  /// I/O, and must log rather than propagate failures.
  fn publish(&self, topic: &str, partition: i32, payload: Bytes);

  /// Called once on pipeline shutdown.
  fn flush(&self, timeout: Duration);

  /// Idempotent, thread-safe; called lazily on first publish for a symbol.
  fn create_or_get_topic(&self, name: &str);
}

#[derive(Debug, Clone)]
pub struct PublishedMessage {
  pub topic: String,
  pub partition: i32,
  pub payload: Bytes,
}

/// An in-memory bus recording every publish for tests, and usable as a
/// standalone sink when no real broker is configured.
#[derive(Default)]
pub struct InMemoryBus {
  messages: Mutex<Vec<PublishedMessage>>,
  topics: Mutex<Vec<String>>,
}

impl InMemoryBus {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn messages(&self) -> Vec<PublishedMessage> {
    self.messages.lock().expect("bus lock poisoned").clone()
  }

  pub fn topics(&self) -> Vec<String> {
    self.topics.lock().expect("bus lock poisoned").clone()
  }
}

impl MessageBus for InMemoryBus {
  fn publish(&self, topic: &str, partition: i32, payload: Bytes) {
    self.create_or_get_topic(topic);
    self.messages.lock().expect("bus lock poisoned").push(PublishedMessage {
      topic: topic.to_string(),
      partition,
      payload,
    });
  }

  fn flush(&self, _timeout: Duration) {}

  fn create_or_get_topic(&self, name: &str) {
    let mut topics = self.topics.lock().expect("bus lock poisoned");
    if !topics.iter().any(|t| t == name) {
      topics.push(name.to_string());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn records_publishes_and_topics() {
    let bus = InMemoryBus::new();
    bus.publish("AAPL", 0, Bytes::from_static(b"hello"));
    bus.publish("AAPL", 1, Bytes::from_static(b"world"));
    assert_eq!(bus.messages().len(), 2);
    assert_eq!(bus.topics(), vec!["AAPL".to_string()]);
  }
}
