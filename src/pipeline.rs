use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::bus::MessageBus;
use crate::config::PipelineConfig;
use crate::decoder::split_frame;
use crate::dispatcher::{DispatcherPool, RingItem};
use crate::health::{HealthMonitor, PipelineStats, PipelineStatsSnapshot};
use crate::receiver::{DatagramCallback, UdpReceiver};
use crate::ring::Ring;
use crate::router::SymbolRouter;
use crate::symbol_table::SymbolTable;

/// The assembled pipeline: owns every thread handle and the shared
/// structures they coordinate through. Built via [`PipelineBuilder`],
/// started and stopped as a unit.
pub struct Pipeline {
  config: PipelineConfig,
  bus: Arc<dyn MessageBus>,
  router: Arc<SymbolRouter>,
  ring: Arc<Ring<RingItem>>,
  stats: Arc<PipelineStats>,
  receivers: Vec<UdpReceiver>,
  dispatchers: Option<DispatcherPool>,
  publisher: Option<crate::publisher::Publisher>,
  health: Option<HealthMonitor>,
}

/// Fluent builder over [`Pipeline`]: each setter mutates an inner config and
/// returns `Self`.
#[derive(Default)]
pub struct PipelineBuilder {
  config: PipelineConfig,
  bus: Option<Arc<dyn MessageBus>>,
}

impl PipelineBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn config(mut self, config: PipelineConfig) -> Self {
    self.config = config;
    self
  }

  pub fn bus(mut self, bus: Arc<dyn MessageBus>) -> Self {
    self.bus = Some(bus);
    self
  }

  /// # Panics
  /// Panics if no bus was configured — the pipeline has no default sink.
  pub fn build(self) -> Pipeline {
    let bus = self.bus.expect("PipelineBuilder requires a message bus");
    let router = Arc::new(SymbolRouter::new(self.config.symbol_router_reserve));
    let ring = Arc::new(Ring::with_capacity(self.config.ring_capacity));
    Pipeline {
      config: self.config,
      bus,
      router,
      ring,
      stats: Arc::new(PipelineStats::default()),
      receivers: Vec::new(),
      dispatchers: None,
      publisher: None,
      health: None,
    }
  }
}

impl Pipeline {
  /// Spawn every thread (receivers, dispatchers, publisher, health
  /// monitor) and return once all are running.
  pub fn start(&mut self) {
    let dispatcher_count = self.config.resolved_dispatcher_threads();
    self.dispatchers = Some(DispatcherPool::spawn(dispatcher_count, self.router.clone(), self.ring.clone()));
    self.publisher = Some(crate::publisher::Publisher::spawn(
      self.ring.clone(),
      self.bus.clone(),
      self.config.partitions_per_topic,
      self.stats.clone(),
    ));
    self.health = Some(HealthMonitor::spawn(
      self.config.health_check_interval,
      self.stats.clone(),
      self.router.clone(),
    ));

    for receiver_config in &self.config.udp_receivers {
      let router = self.router.clone();
      let stats = self.stats.clone();
      let reserve = self.config.symbol_table_reserve;
      // Each receiver owns its own decoder state: one symbol table per
      // receiver thread, confined to that thread's decode path.
      let table = Mutex::new(SymbolTable::new(reserve));
      let callback: DatagramCallback = Arc::new(move |datagram: &[u8]| {
        stats.datagrams_received.fetch_add(1, Ordering::Relaxed);
        let mut table = table.lock().expect("symbol table lock poisoned");
        match split_frame(datagram, &mut table) {
          Ok(records) => {
            for record in records {
              stats.records_decoded.fetch_add(1, Ordering::Relaxed);
              let symbol = record.resolve_symbol();
              router.push(symbol, record);
            }
          }
          Err(e) => {
            stats.frame_errors.fetch_add(1, Ordering::Relaxed);
            log::error!("dropping datagram: {e}");
          }
        }
      });

      match UdpReceiver::start(
        &receiver_config.bind_ip,
        receiver_config.bind_port,
        receiver_config.cpu_affinity_core,
        receiver_config.realtime_priority,
        callback,
      ) {
        Ok(receiver) => self.receivers.push(receiver),
        Err(e) => log::error!(
          "failed to start receiver on {}:{}: {e}",
          receiver_config.bind_ip,
          receiver_config.bind_port
        ),
      }
    }
  }

  /// Stop every thread in dependency order: receivers, then dispatchers,
  /// then publisher, then health monitor.
  pub fn stop(mut self) {
    for receiver in self.receivers.drain(..) {
      receiver.stop();
    }
    if let Some(dispatchers) = self.dispatchers.take() {
      dispatchers.stop();
    }
    let sentinel_seq = self.ring.claim_one();
    self.ring.write_slot(sentinel_seq, None);
    self.ring.publish(sentinel_seq);
    if let Some(publisher) = self.publisher.take() {
      publisher.join();
    }
    if let Some(health) = self.health.take() {
      health.stop();
    }
  }

  pub fn stats(&self) -> PipelineStatsSnapshot {
    self.stats.snapshot(&self.router)
  }

  pub fn router(&self) -> &Arc<SymbolRouter> {
    &self.router
  }
}
