use std::collections::HashMap;

use crate::model::context::SymbolContext;
use crate::model::symbol::Symbol;

/// The per-order symbol identity table: a single-threaded map from
/// order-id to the symbol/price context resolved at `AddOrder` time and kept
/// current by subsequent `ModifyOrder`/`DeleteOrder` events.
///
/// Confined to the decoder stage by construction — one table per receiver,
/// never shared across threads. `Send` is not implemented intentionally; if
/// a future caller needs to move a table between threads they should do so
/// between decode passes, not concurrently with one.
#[derive(Debug, Default)]
pub struct SymbolTable {
  entries: HashMap<u64, SymbolContext>,
}

impl SymbolTable {
  /// `reserve` is the expected symbol-universe size (default 300,000 per
  /// the default capacity policy).
  pub fn new(reserve: usize) -> Self {
    Self {
      entries: HashMap::with_capacity(reserve),
    }
  }

  /// Insert a new order. Returns `false` (table unchanged) if the order-id
  /// is already resident — add is idempotent only on first insertion.
  pub fn insert(&mut self, order_id: u64, symbol: Symbol, price: f64) -> bool {
    if self.entries.contains_key(&order_id) {
      return false;
    }
    self.entries.insert(order_id, SymbolContext::new(symbol, price));
    true
  }

  /// Replace the price for a resident order, preserving its symbol bytes
  /// byte-for-byte. Returns `false` if the order-id is non-resident.
  pub fn update_price(&mut self, order_id: u64, price: f64) -> bool {
    match self.entries.get_mut(&order_id) {
      Some(ctx) => {
        ctx.price = price;
        true
      }
      None => false,
    }
  }

  /// Remove an order. Returns `false` if it was never resident.
  pub fn erase(&mut self, order_id: u64) -> bool {
    self.entries.remove(&order_id).is_some()
  }

  /// Look up the current context for an order-id. Non-resident order-ids
  /// return `None` (the "unknown" sentinel at the call site).
  pub fn lookup(&self, order_id: u64) -> Option<SymbolContext> {
    self.entries.get(&order_id).copied()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn insert_then_lookup() {
    let mut table = SymbolTable::new(8);
    assert!(table.insert(1, Symbol::from_str_padded("AAPL"), 150.0));
    let ctx = table.lookup(1).unwrap();
    assert_eq!(ctx.symbol.trimmed(), "AAPL");
    assert_eq!(ctx.price, 150.0);
  }

  #[test]
  fn duplicate_insert_is_idempotent_noop() {
    let mut table = SymbolTable::new(8);
    assert!(table.insert(1, Symbol::from_str_padded("AAPL"), 150.0));
    assert!(!table.insert(1, Symbol::from_str_padded("MSFT"), 99.0));
    assert_eq!(table.lookup(1).unwrap().symbol.trimmed(), "AAPL");
  }

  #[test]
  fn modify_preserves_symbol() {
    let mut table = SymbolTable::new(8);
    table.insert(1, Symbol::from_str_padded("AAPL"), 150.0);
    assert!(table.update_price(1, 151.5));
    let ctx = table.lookup(1).unwrap();
    assert_eq!(ctx.symbol.trimmed(), "AAPL");
    assert_eq!(ctx.price, 151.5);
  }

  #[test]
  fn modify_miss_is_noop() {
    let mut table = SymbolTable::new(8);
    assert!(!table.update_price(42, 1.0));
  }

  #[test]
  fn erase_then_lookup_misses() {
    let mut table = SymbolTable::new(8);
    table.insert(1, Symbol::from_str_padded("AAPL"), 150.0);
    assert!(table.erase(1));
    assert!(table.lookup(1).is_none());
    assert!(!table.erase(1));
  }
}
