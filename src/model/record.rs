use bytes::Bytes;

use super::catalogue::fixed_size_for;
use super::context::CONTEXT_LEN;
use super::symbol::Symbol;

/// A decoded PITCH message record.
///
/// Modeled as a tagged sum over the catalogue plus a shared payload buffer,
/// per the polymorphism guidance: the only capability downstream stages need
/// is `type_tag`, `symbol`, `order_id`, and `payload_bytes` — deep
/// inheritance buys nothing here.
///
/// `payload` holds the original on-wire bytes, plus (for records whose wire
/// form omits symbol/price) an appended context suffix. Cloning a `Record`
/// is cheap: `Bytes` is reference-counted, so cloning shares the backing
/// allocation from decoder through to the publisher.
#[derive(Debug, Clone)]
pub struct Record {
  kind: RecordKind,
  payload: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
  AddOrder { order_id: u64, symbol: Symbol, participant_id: [u8; 4] },
  OrderExecuted { order_id: u64 },
  OrderExecutedAtPrice { order_id: u64 },
  ReduceSize { order_id: u64 },
  ModifyOrder { order_id: u64 },
  DeleteOrder { order_id: u64 },
  Trade { order_id: u64, symbol: Symbol },
  TradeBreak,
  TradingStatus { symbol: Symbol },
  UnitClear,
  EndOfSession,
  AuctionUpdate { symbol: Symbol },
  AuctionSummary { symbol: Symbol },
  CalculatedValue { symbol: Symbol },
}

impl RecordKind {
  pub fn type_tag(&self) -> u8 {
    use crate::model::catalogue::*;
    match self {
      RecordKind::AddOrder { .. } => ADD_ORDER,
      RecordKind::OrderExecuted { .. } => ORDER_EXECUTED,
      RecordKind::OrderExecutedAtPrice { .. } => ORDER_EXECUTED_AT_PRICE,
      RecordKind::ReduceSize { .. } => REDUCE_SIZE,
      RecordKind::ModifyOrder { .. } => MODIFY_ORDER,
      RecordKind::DeleteOrder { .. } => DELETE_ORDER,
      RecordKind::Trade { .. } => TRADE,
      RecordKind::TradeBreak => TRADE_BREAK,
      RecordKind::TradingStatus { .. } => TRADING_STATUS,
      RecordKind::UnitClear => UNIT_CLEAR,
      RecordKind::EndOfSession => END_OF_SESSION,
      RecordKind::AuctionUpdate { .. } => AUCTION_UPDATE,
      RecordKind::AuctionSummary { .. } => AUCTION_SUMMARY,
      RecordKind::CalculatedValue { .. } => CALCULATED_VALUE,
    }
  }

  /// The symbol carried directly on the wire by this record, if any.
  /// Records that only carry an order-id resolve their symbol from the
  /// symbol table at decode time instead (see `Record::payload_bytes`'s
  /// context suffix).
  pub fn wire_symbol(&self) -> Option<Symbol> {
    match self {
      RecordKind::AddOrder { symbol, .. }
      | RecordKind::Trade { symbol, .. }
      | RecordKind::TradingStatus { symbol }
      | RecordKind::AuctionUpdate { symbol }
      | RecordKind::AuctionSummary { symbol }
      | RecordKind::CalculatedValue { symbol } => Some(*symbol),
      _ => None,
    }
  }

  pub fn order_id(&self) -> Option<u64> {
    match self {
      RecordKind::AddOrder { order_id, .. }
      | RecordKind::OrderExecuted { order_id }
      | RecordKind::OrderExecutedAtPrice { order_id }
      | RecordKind::ReduceSize { order_id }
      | RecordKind::ModifyOrder { order_id }
      | RecordKind::DeleteOrder { order_id }
      | RecordKind::Trade { order_id, .. } => Some(*order_id),
      _ => None,
    }
  }

  /// The raw 4-byte participant-id field, for the one record kind that
  /// carries it on the wire.
  pub fn participant_id(&self) -> Option<[u8; 4]> {
    match self {
      RecordKind::AddOrder { participant_id, .. } => Some(*participant_id),
      _ => None,
    }
  }
}

impl Record {
  pub fn new(kind: RecordKind, payload: Bytes) -> Self {
    Self { kind, payload }
  }

  pub fn kind(&self) -> &RecordKind {
    &self.kind
  }

  pub fn get_type_tag(&self) -> u8 {
    self.kind.type_tag()
  }

  /// The symbol carried on the wire by this record, if any. Does not
  /// consult the symbol table — for records that only carry an order-id,
  /// the resolved symbol lives in the context suffix inside
  /// `payload_bytes`, not here.
  pub fn get_symbol(&self) -> Option<Symbol> {
    self.kind.wire_symbol()
  }

  pub fn get_order_id(&self) -> Option<u64> {
    self.kind.order_id()
  }

  /// The right-trimmed participant-id, for records that carry one.
  pub fn get_participant_id(&self) -> Option<String> {
    self.kind
      .participant_id()
      .map(|bytes| crate::decoder::fields::trim_ascii_spaces(&bytes).to_string())
  }

  pub fn get_payload_bytes(&self) -> &Bytes {
    &self.payload
  }

  /// Resolve a routing symbol for this record: the wire symbol if present,
  /// otherwise the symbol embedded in the context suffix, otherwise a
  /// sentinel bucket for symbol-table misses ("symbol = UNKNOWN").
  /// Used to pick a router queue; the publisher independently resolves the
  /// external-facing topic name from the same payload bytes.
  pub fn resolve_symbol(&self) -> Symbol {
    if let Some(sym) = self.get_symbol() {
      return sym;
    }
    if let Some(fixed_size) = fixed_size_for(self.get_type_tag()) {
      if self.payload.len() >= fixed_size + CONTEXT_LEN {
        return Symbol::from_wire(&self.payload[fixed_size..fixed_size + 6]);
      }
    }
    Symbol::UNKNOWN_BUCKET
  }
}
