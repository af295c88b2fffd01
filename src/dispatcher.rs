use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::model::record::Record;
use crate::ring::Ring;
use crate::router::SymbolRouter;

/// The ring item type: `None` is the shutdown sentinel.
pub type RingItem = Option<Record>;

/// A fixed pool of `N` dispatcher threads. Thread `i` owns every
/// queue index `k` where `k % N == i` — wait-free partitioning, since the
/// index space only ever grows and ownership of an index never moves.
pub struct DispatcherPool {
  handles: Vec<JoinHandle<()>>,
  shutdown: Arc<AtomicBool>,
}

impl DispatcherPool {
  pub fn spawn(count: usize, router: Arc<SymbolRouter>, ring: Arc<Ring<RingItem>>) -> Self {
    let shutdown = Arc::new(AtomicBool::new(false));
    let handles = (0..count)
      .map(|id| {
        let router = router.clone();
        let ring = ring.clone();
        let shutdown = shutdown.clone();
        thread::Builder::new()
          .name(format!("pitch-dispatcher-{id}"))
          .spawn(move || run(id, count, &router, &ring, &shutdown))
          .expect("failed to spawn dispatcher thread")
      })
      .collect();
    Self { handles, shutdown }
  }

  /// Signal every dispatcher to exit after its current drain pass and
  /// block until all have stopped. Queue contents at shutdown time are
  /// dropped.
  pub fn stop(self) {
    self.shutdown.store(true, Ordering::Relaxed);
    for handle in self.handles {
      let _ = handle.join();
    }
  }
}

fn run(id: usize, count: usize, router: &SymbolRouter, ring: &Ring<RingItem>, shutdown: &AtomicBool) {
  while !shutdown.load(Ordering::Relaxed) {
    let n = router.queue_count();
    let mut idx = id;
    while idx < n {
      if let Some(queue) = router.queue_at(idx) {
        while let Some(record) = queue.pop() {
          let seq = ring.claim_one();
          ring.write_slot(seq, Some(record));
          ring.publish(seq);
        }
      }
      idx += count;
    }
    thread::yield_now();
  }
}
