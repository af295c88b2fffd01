use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::router::SymbolRouter;

/// Hot-path pipeline counters making up the statistics snapshot, updated with
/// relaxed atomics from the receiver/decoder/dispatcher/publisher threads
/// and read back by the health monitor and any caller of
/// [`Pipeline::stats`](crate::pipeline::Pipeline::stats).
#[derive(Debug, Default)]
pub struct PipelineStats {
  pub datagrams_received: AtomicU64,
  pub frame_errors: AtomicU64,
  pub records_decoded: AtomicU64,
  pub records_published: AtomicU64,
}

impl PipelineStats {
  pub fn snapshot(&self, router: &SymbolRouter) -> PipelineStatsSnapshot {
    PipelineStatsSnapshot {
      datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
      frame_errors: self.frame_errors.load(Ordering::Relaxed),
      records_decoded: self.records_decoded.load(Ordering::Relaxed),
      records_published: self.records_published.load(Ordering::Relaxed),
      symbols_routed: router.queue_count(),
    }
  }
}

/// A point-in-time copy of [`PipelineStats`], suitable for logging or
/// returning to a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStatsSnapshot {
  pub datagrams_received: u64,
  pub frame_errors: u64,
  pub records_decoded: u64,
  pub records_published: u64,
  pub symbols_routed: usize,
}

/// Background thread that periodically logs a stats snapshot: ticks on an
/// interval, logs a summary line, and can be stopped from outside.
pub struct HealthMonitor {
  handle: JoinHandle<()>,
  shutdown: Arc<AtomicBool>,
}

impl HealthMonitor {
  pub fn spawn(interval: Duration, stats: Arc<PipelineStats>, router: Arc<SymbolRouter>) -> Self {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_thread = shutdown.clone();
    let handle = thread::Builder::new()
      .name("pitch-health-monitor".to_string())
      .spawn(move || run(interval, &stats, &router, &shutdown_thread))
      .expect("failed to spawn health monitor thread");
    Self { handle, shutdown }
  }

  pub fn stop(self) {
    self.shutdown.store(true, Ordering::Relaxed);
    let _ = self.handle.join();
  }
}

fn run(interval: Duration, stats: &PipelineStats, router: &SymbolRouter, shutdown: &AtomicBool) {
  // Sleep in short slices so shutdown is observed promptly even when
  // `interval` is long.
  const POLL: Duration = Duration::from_millis(100);
  let mut waited = Duration::ZERO;
  while !shutdown.load(Ordering::Relaxed) {
    if waited >= interval {
      let snapshot = stats.snapshot(router);
      log::info!(
        "pipeline health: datagrams={} decoded={} published={} frame_errors={} symbols={}",
        snapshot.datagrams_received,
        snapshot.records_decoded,
        snapshot.records_published,
        snapshot.frame_errors,
        snapshot.symbols_routed,
      );
      if snapshot.frame_errors > 0 {
        log::warn!("pipeline has seen {} frame-level decode errors", snapshot.frame_errors);
      }
      waited = Duration::ZERO;
    }
    thread::sleep(POLL);
    waited += POLL;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn snapshot_reflects_counters() {
    let stats = PipelineStats::default();
    stats.datagrams_received.fetch_add(3, Ordering::Relaxed);
    stats.records_decoded.fetch_add(5, Ordering::Relaxed);
    let router = SymbolRouter::new(4);
    let snapshot = stats.snapshot(&router);
    assert_eq!(snapshot.datagrams_received, 3);
    assert_eq!(snapshot.records_decoded, 5);
    assert_eq!(snapshot.symbols_routed, 0);
  }

  #[test]
  fn monitor_starts_and_stops_cleanly() {
    let stats = Arc::new(PipelineStats::default());
    let router = Arc::new(SymbolRouter::new(4));
    let monitor = HealthMonitor::spawn(Duration::from_secs(60), stats, router);
    monitor.stop();
  }
}
