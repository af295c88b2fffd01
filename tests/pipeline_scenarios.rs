//! End-to-end scenarios S1-S6 against the in-memory bus and router, run
//! without any real UDP socket.

use std::sync::Arc;
use std::thread;

use byteorder::{ByteOrder, LittleEndian};

use pitch_ingest_pipeline::decoder::split_frame;
use pitch_ingest_pipeline::errors::PitchError;
use pitch_ingest_pipeline::model::catalogue::{ADD_ORDER, DELETE_ORDER, MODIFY_ORDER, ORDER_EXECUTED, ORDER_EXECUTED_AT_PRICE};
use pitch_ingest_pipeline::model::symbol::Symbol;
use pitch_ingest_pipeline::publisher::resolve_destination;
use pitch_ingest_pipeline::router::SymbolRouter;
use pitch_ingest_pipeline::symbol_table::SymbolTable;

const HEADER_LEN: usize = 8;

fn frame(messages: &[Vec<u8>]) -> Vec<u8> {
  let body_len: usize = messages.iter().map(|m| m.len()).sum();
  let total_len = HEADER_LEN + body_len;
  let mut datagram = vec![0u8; HEADER_LEN];
  LittleEndian::write_u16(&mut datagram[0..2], total_len as u16);
  datagram[2] = messages.len() as u8;
  datagram[3] = 1;
  LittleEndian::write_u32(&mut datagram[4..8], 1);
  for m in messages {
    datagram.extend_from_slice(m);
  }
  datagram
}

fn add_order(order_id: u64, symbol: &str, raw_price: u64) -> Vec<u8> {
  let mut msg = vec![42u8, ADD_ORDER];
  msg.extend_from_slice(&0u64.to_le_bytes());
  msg.extend_from_slice(&order_id.to_le_bytes());
  msg.push(b'B');
  msg.extend_from_slice(&100u32.to_le_bytes());
  msg.extend_from_slice(&Symbol::from_str_padded(symbol).0);
  msg.extend_from_slice(&raw_price.to_le_bytes());
  msg.extend_from_slice(b"RBCT");
  msg.push(0);
  assert_eq!(msg.len(), 42);
  msg
}

fn order_executed(order_id: u64, qty: u32) -> Vec<u8> {
  let mut msg = vec![43u8, ORDER_EXECUTED];
  msg.extend_from_slice(&0u64.to_le_bytes());
  msg.extend_from_slice(&order_id.to_le_bytes());
  msg.extend_from_slice(&qty.to_le_bytes());
  msg.extend_from_slice(&0u64.to_le_bytes());
  msg.extend_from_slice(&[0u8; 13]);
  assert_eq!(msg.len(), 43);
  msg
}

fn order_executed_at_price(order_id: u64, qty: u32, raw_exec_price: u64) -> Vec<u8> {
  let mut msg = vec![52u8, ORDER_EXECUTED_AT_PRICE];
  msg.extend_from_slice(&0u64.to_le_bytes());
  msg.extend_from_slice(&order_id.to_le_bytes());
  msg.extend_from_slice(&qty.to_le_bytes());
  msg.extend_from_slice(&0u64.to_le_bytes());
  msg.extend_from_slice(&raw_exec_price.to_le_bytes());
  msg.extend_from_slice(&[0u8; 14]);
  assert_eq!(msg.len(), 52);
  msg
}

fn modify_order(order_id: u64, raw_price: u64) -> Vec<u8> {
  let mut msg = vec![31u8, MODIFY_ORDER];
  msg.extend_from_slice(&0u64.to_le_bytes());
  msg.extend_from_slice(&order_id.to_le_bytes());
  msg.extend_from_slice(&100u32.to_le_bytes());
  msg.extend_from_slice(&raw_price.to_le_bytes());
  msg.push(0);
  assert_eq!(msg.len(), 31);
  msg
}

fn delete_order(order_id: u64) -> Vec<u8> {
  let mut msg = vec![18u8, DELETE_ORDER];
  msg.extend_from_slice(&0u64.to_le_bytes());
  msg.extend_from_slice(&order_id.to_le_bytes());
  assert_eq!(msg.len(), 18);
  msg
}

/// S1 - Empty frame: declared length 16, actual 8 bytes.
#[test]
fn s1_empty_frame_yields_length_mismatch() {
  let datagram = [0x10, 0x00, 0x00, 0x01, 0x01, 0x00, 0x00, 0x00];
  let mut table = SymbolTable::new(16);
  let err = split_frame(&datagram, &mut table).unwrap_err();
  assert_eq!(err, PitchError::FrameLengthMismatch { declared: 16, actual: 8 });
}

/// S2 - Single AddOrder: one publish, symbol table updated.
#[test]
fn s2_single_add_order_publishes_once() {
  let datagram = frame(&[add_order(0x12, "AAPL", 1_500_000_000)]);
  let mut table = SymbolTable::new(16);
  let records = split_frame(&datagram, &mut table).unwrap();
  assert_eq!(records.len(), 1);

  let (topic, _) = resolve_destination(&records[0], 8);
  assert_eq!(topic, "AAPL");
  assert_eq!(records[0].get_payload_bytes().len(), 42);

  let ctx = table.lookup(0x12).unwrap();
  assert_eq!(ctx.symbol.trimmed(), "AAPL");
  assert_eq!(ctx.price, 150.0);

  assert_eq!(records[0].get_participant_id().as_deref(), Some("RBCT"));
}

/// S3 - Add then Execute: second publish carries a 57-byte context-enriched payload.
#[test]
fn s3_add_then_execute_carries_context() {
  let datagram = frame(&[add_order(0x12, "AAPL", 1_500_000_000), order_executed(0x12, 30)]);
  let mut table = SymbolTable::new(16);
  let records = split_frame(&datagram, &mut table).unwrap();
  assert_eq!(records.len(), 2);

  let (topic, _) = resolve_destination(&records[1], 8);
  assert_eq!(topic, "AAPL");
  let payload = records[1].get_payload_bytes();
  assert_eq!(payload.len(), 43 + 14);
  assert_eq!(&payload[43..49], b"AAPL  ");
  assert_eq!(f64::from_le_bytes(payload[49..57].try_into().unwrap()), 150.0);
}

/// S4 - Modify then ExecutedAtPrice: symbol table price updates, payload carries
/// both the resolved context and the wire execution price.
#[test]
fn s4_modify_then_executed_at_price() {
  let datagram = frame(&[
    add_order(0x12, "AAPL", 1_500_000_000),
    modify_order(0x12, 1_515_000_000),
    order_executed_at_price(0x12, 50, 1_515_000_000),
  ]);
  let mut table = SymbolTable::new(16);
  let records = split_frame(&datagram, &mut table).unwrap();
  assert_eq!(records.len(), 3);

  assert_eq!(table.lookup(0x12).unwrap().price, 151.5);

  let payload = records[2].get_payload_bytes();
  assert_eq!(payload.len(), 52 + 14 + 8);
  assert_eq!(f64::from_le_bytes(payload[66..74].try_into().unwrap()), 151.5);
}

/// S5 - Delete then Execute: the post-delete execute has no suffix and
/// resolves to the UNKNOWN topic.
#[test]
fn s5_delete_then_execute_resolves_unknown() {
  let datagram = frame(&[
    add_order(0x12, "AAPL", 1_500_000_000),
    delete_order(0x12),
    order_executed(0x12, 10),
  ]);
  let mut table = SymbolTable::new(16);
  let records = split_frame(&datagram, &mut table).unwrap();
  assert_eq!(records.len(), 3);
  assert!(table.lookup(0x12).is_none());

  let last = &records[2];
  assert_eq!(last.get_payload_bytes().len(), 43);
  let (topic, _) = resolve_destination(last, 8);
  assert_eq!(topic, "UNKNOWN");
}

/// Two symbols, two producer threads, each thread the sole producer for its
/// symbol: a symbol is owned by exactly one queue for its lifetime, so this
/// checks exactly one queue per symbol, per-symbol FIFO preserved end to
/// end, and the expected total publish count.
#[test]
fn s6_two_symbols_two_producers_preserve_per_symbol_order() {
  let router = Arc::new(SymbolRouter::new(8));
  const PER_THREAD: u64 = 5_000;

  let mut handles = Vec::new();
  for symbol_name in ["FOO", "BAR"] {
    let router = router.clone();
    handles.push(thread::spawn(move || {
      let symbol = Symbol::from_str_padded(symbol_name);
      for order_id in 0..PER_THREAD {
        let mut table = SymbolTable::new(4);
        let datagram = frame(&[add_order(order_id, symbol_name, 1_000_000_000)]);
        let records = split_frame(&datagram, &mut table).unwrap();
        router.push(symbol, records.into_iter().next().unwrap());
      }
    }));
  }
  for h in handles {
    h.join().unwrap();
  }

  assert_eq!(router.queue_count(), 2);

  let mut total = 0;
  for idx in 0..router.queue_count() {
    let queue = router.queue_at(idx).unwrap();
    let mut last: Option<u64> = None;
    while let Some(record) = queue.pop() {
      total += 1;
      let order_id = record.get_order_id().unwrap();
      assert!(match last {
        Some(prev) => order_id > prev,
        None => true,
      });
      last = Some(order_id);
    }
    assert_eq!(last, Some(PER_THREAD - 1));
  }
  assert_eq!(total, 2 * PER_THREAD);
}
