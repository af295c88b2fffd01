pub mod queue;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::model::record::Record;
use crate::model::symbol::Symbol;

pub use queue::Queue;

struct RouterInner {
  index_of: HashMap<Symbol, usize>,
  queues: Vec<Arc<Queue>>,
}

/// The concurrent symbol → queue router: a guarded map from symbol to queue,
/// paired with an append-only, insertion-order vector that dispatchers index
/// into by stable position.
///
/// Reads (`queue_count`, `queue_at`, and the common-case `push` where the
/// symbol already has a queue) only ever take the read lock, so dispatcher
/// and decoder threads do not contend with each other once the symbol
/// universe has warmed up. Only first-push-for-a-symbol takes the write
/// lock, and does so exactly once per symbol for the life of the pipeline.
pub struct SymbolRouter {
  inner: RwLock<RouterInner>,
  /// `None` means unbounded (the default). `Some(n)` enables drop-newest
  /// semantics once a per-symbol queue reaches `n` entries.
  max_queue_len: Option<usize>,
  dropped: AtomicU64,
}

impl SymbolRouter {
  /// `reserve` is the expected symbol-universe size, mirroring the symbol
  /// table's own capacity policy. Queues are unbounded.
  pub fn new(reserve: usize) -> Self {
    Self::with_capacity(reserve, None)
  }

  /// Like [`Self::new`], but caps each per-symbol queue at `max_len`
  /// entries. Once a queue is full, further pushes for that symbol are
  /// dropped (drop-newest) and counted in [`Self::dropped_count`].
  pub fn with_bound(reserve: usize, max_len: usize) -> Self {
    Self::with_capacity(reserve, Some(max_len))
  }

  fn with_capacity(reserve: usize, max_queue_len: Option<usize>) -> Self {
    Self {
      inner: RwLock::new(RouterInner {
        index_of: HashMap::with_capacity(reserve),
        queues: Vec::with_capacity(reserve),
      }),
      max_queue_len,
      dropped: AtomicU64::new(0),
    }
  }

  /// Enqueue `record` for `symbol`, installing a new queue on first push.
  /// Returns `false` only when the router is bounded and `symbol`'s queue
  /// is already at capacity, in which case the record is dropped and a
  /// warning is logged. Always `true` in the default unbounded
  /// configuration.
  pub fn push(&self, symbol: Symbol, record: Record) -> bool {
    // Fast path: queue already exists, no write lock needed.
    {
      let guard = self.inner.read().expect("router lock poisoned");
      if let Some(&idx) = guard.index_of.get(&symbol) {
        return self.push_bounded(&guard.queues[idx], symbol, record);
      }
    }

    // Slow path: install the queue, re-checking under the write lock in
    // case another thread won the race to create it first.
    let mut guard = self.inner.write().expect("router lock poisoned");
    let idx = if let Some(&idx) = guard.index_of.get(&symbol) {
      idx
    } else {
      guard.queues.push(Arc::new(Queue::new()));
      let idx = guard.queues.len() - 1;
      guard.index_of.insert(symbol, idx);
      idx
    };
    self.push_bounded(&guard.queues[idx], symbol, record)
  }

  fn push_bounded(&self, queue: &Queue, symbol: Symbol, record: Record) -> bool {
    if let Some(max_len) = self.max_queue_len {
      if queue.len() >= max_len {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        log::warn!("dropping record for {}: queue at capacity {max_len}", symbol.trimmed());
        return false;
      }
    }
    queue.push(record);
    true
  }

  pub fn queue_count(&self) -> usize {
    self.inner.read().expect("router lock poisoned").queues.len()
  }

  /// Total records dropped across all symbols due to a bounded queue being
  /// at capacity. Always `0` for an unbounded router.
  pub fn dropped_count(&self) -> u64 {
    self.dropped.load(Ordering::Relaxed)
  }

  /// Fetch the queue at `index` by stable insertion order. Valid for the
  /// life of the router once observed.
  pub fn queue_at(&self, index: usize) -> Option<Arc<Queue>> {
    self.inner
      .read()
      .expect("router lock poisoned")
      .queues
      .get(index)
      .cloned()
  }
}
