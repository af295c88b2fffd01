use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::bus::MessageBus;
use crate::dispatcher::RingItem;
use crate::health::PipelineStats;
use crate::model::record::Record;
use crate::model::symbol::{Symbol, UNKNOWN_TOPIC};
use crate::ring::{Consumer, Ring};

/// Resolve `(topic, partition)` for a record: the topic is the record's wire
/// symbol if it carries one, otherwise the symbol embedded in its context
/// suffix, otherwise `"UNKNOWN"` (symbol-table miss). The partition is
/// `hash(type_tag) mod partitions`.
pub fn resolve_destination(record: &Record, partitions: u32) -> (String, i32) {
  let topic = match record.resolve_symbol() {
    Symbol::UNKNOWN_BUCKET => UNKNOWN_TOPIC.to_string(),
    sym => sym.trimmed().to_string(),
  };

  let mut hasher = DefaultHasher::new();
  record.get_type_tag().hash(&mut hasher);
  let partition = (hasher.finish() % partitions as u64) as i32;
  (topic, partition)
}

/// The single ring-consumer thread: drains the dispatch ring and routes each
/// record to the bus. Exits once it has drained a batch containing the
/// shutdown sentinel.
pub struct Publisher {
  handle: JoinHandle<()>,
}

impl Publisher {
  pub fn spawn(ring: Arc<Ring<RingItem>>, bus: Arc<dyn MessageBus>, partitions: u32, stats: Arc<PipelineStats>) -> Self {
    let handle = std::thread::Builder::new()
      .name("pitch-publisher".to_string())
      .spawn(move || run(ring, bus, partitions, &stats))
      .expect("failed to spawn publisher thread");
    Self { handle }
  }

  pub fn join(self) {
    let _ = self.handle.join();
  }
}

fn run(ring: Arc<Ring<RingItem>>, bus: Arc<dyn MessageBus>, partitions: u32, stats: &PipelineStats) {
  let mut consumer = Consumer::new(ring);
  loop {
    let mut saw_sentinel = false;
    consumer.wait_and_drain(|item| match item {
      Some(record) => {
        let (topic, partition) = resolve_destination(&record, partitions);
        bus.publish(&topic, partition, record.get_payload_bytes().clone());
        stats.records_published.fetch_add(1, Ordering::Relaxed);
      }
      None => saw_sentinel = true,
    });
    if saw_sentinel {
      bus.flush(std::time::Duration::from_millis(0));
      break;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bus::InMemoryBus;
  use crate::model::record::RecordKind;
  use bytes::Bytes;

  #[test]
  fn resolves_wire_symbol_directly() {
    let record = Record::new(
      RecordKind::AddOrder {
        order_id: 1,
        symbol: Symbol::from_str_padded("AAPL"),
        participant_id: *b"RBCT",
      },
      Bytes::new(),
    );
    let (topic, _) = resolve_destination(&record, 8);
    assert_eq!(topic, "AAPL");
  }

  #[test]
  fn resolves_suffix_symbol_when_no_wire_symbol() {
    let mut payload = vec![0u8; 43];
    payload.extend_from_slice(&Symbol::from_str_padded("AAPL").0);
    payload.extend_from_slice(&150.0f64.to_le_bytes());
    let record = Record::new(RecordKind::OrderExecuted { order_id: 1 }, Bytes::from(payload));
    let (topic, _) = resolve_destination(&record, 8);
    assert_eq!(topic, "AAPL");
  }

  #[test]
  fn falls_back_to_unknown_without_suffix() {
    let record = Record::new(RecordKind::OrderExecuted { order_id: 1 }, Bytes::from(vec![0u8; 43]));
    let (topic, _) = resolve_destination(&record, 8);
    assert_eq!(topic, "UNKNOWN");
  }

  #[test]
  fn publisher_exits_on_sentinel() {
    let ring = Arc::new(Ring::with_capacity(8));
    let bus = Arc::new(InMemoryBus::new());
    let bus_dyn: Arc<dyn MessageBus> = bus.clone();

    let seq = ring.claim_one();
    ring.write_slot(
      seq,
      Some(Record::new(
        RecordKind::AddOrder {
          order_id: 1,
          symbol: Symbol::from_str_padded("FOO"),
          participant_id: *b"RBCT",
        },
        Bytes::new(),
      )),
    );
    ring.publish(seq);
    let sentinel_seq = ring.claim_one();
    ring.write_slot(sentinel_seq, None);
    ring.publish(sentinel_seq);

    let publisher = Publisher::spawn(ring, bus_dyn, 8, Arc::new(PipelineStats::default()));
    publisher.join();
    assert_eq!(bus.messages().len(), 1);
  }
}
