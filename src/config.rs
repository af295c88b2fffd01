use std::time::Duration;

/// One UDP receiver binding.
#[derive(Debug, Clone)]
pub struct UdpReceiverConfig {
  pub bind_ip: String,
  pub bind_port: u16,
  /// `-1` means no CPU pinning.
  pub cpu_affinity_core: i32,
  /// `0` means default (non-realtime) scheduling.
  pub realtime_priority: i32,
}

impl Default for UdpReceiverConfig {
  fn default() -> Self {
    Self {
      bind_ip: "0.0.0.0".to_string(),
      bind_port: 0,
      cpu_affinity_core: -1,
      realtime_priority: 0,
    }
  }
}

/// Downstream bus tuning knobs. The pipeline core does not interpret most of
/// these beyond `topics` and `buffering_max_messages` — the rest are passed
/// through to whichever real bus adapter a caller plugs in behind
/// [`crate::bus::MessageBus`].
#[derive(Debug, Clone, Default)]
pub struct BusConfig {
  pub bootstrap_servers: String,
  pub compression: String,
  pub acks: String,
  pub buffering_max_messages: usize,
  pub batch_num_messages: usize,
  pub linger_ms: u64,
  pub topics: Vec<String>,
}

/// The configuration value object: a plain struct with a `Default` impl.
/// File-format loading is left to the caller; construct one directly or
/// via [`PipelineConfigBuilder`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
  pub udp_receivers: Vec<UdpReceiverConfig>,
  pub bus: BusConfig,
  /// Power of two; default 4096.
  pub ring_capacity: usize,
  pub symbol_table_reserve: usize,
  pub symbol_router_reserve: usize,
  pub partitions_per_topic: u32,
  /// `0` means "use available parallelism".
  pub dispatcher_threads: usize,
  pub health_check_interval: Duration,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      udp_receivers: Vec::new(),
      bus: BusConfig::default(),
      ring_capacity: 4096,
      symbol_table_reserve: 300_000,
      symbol_router_reserve: 300_000,
      partitions_per_topic: 8,
      dispatcher_threads: 0,
      health_check_interval: Duration::from_secs(30),
    }
  }
}

impl PipelineConfig {
  /// Resolve `dispatcher_threads`, defaulting to the host's available
  /// parallelism when unset.
  pub fn resolved_dispatcher_threads(&self) -> usize {
    if self.dispatcher_threads > 0 {
      self.dispatcher_threads
    } else {
      std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    }
  }
}

/// Fluent builder over [`PipelineConfig`]: each setter mutates an inner
/// config and returns `Self`.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
  config: PipelineConfig,
}

impl PipelineConfigBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_udp_receiver(mut self, receiver: UdpReceiverConfig) -> Self {
    self.config.udp_receivers.push(receiver);
    self
  }

  pub fn bus(mut self, bus: BusConfig) -> Self {
    self.config.bus = bus;
    self
  }

  pub fn ring_capacity(mut self, capacity: usize) -> Self {
    self.config.ring_capacity = capacity;
    self
  }

  pub fn symbol_table_reserve(mut self, reserve: usize) -> Self {
    self.config.symbol_table_reserve = reserve;
    self
  }

  pub fn symbol_router_reserve(mut self, reserve: usize) -> Self {
    self.config.symbol_router_reserve = reserve;
    self
  }

  pub fn partitions_per_topic(mut self, partitions: u32) -> Self {
    self.config.partitions_per_topic = partitions;
    self
  }

  pub fn dispatcher_threads(mut self, threads: usize) -> Self {
    self.config.dispatcher_threads = threads;
    self
  }

  pub fn health_check_interval(mut self, interval: Duration) -> Self {
    self.config.health_check_interval = interval;
    self
  }

  pub fn build(self) -> PipelineConfig {
    self.config
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_match_documented_values() {
    let config = PipelineConfig::default();
    assert_eq!(config.ring_capacity, 4096);
    assert_eq!(config.symbol_table_reserve, 300_000);
    assert_eq!(config.partitions_per_topic, 8);
  }

  #[test]
  fn builder_overrides_defaults() {
    let config = PipelineConfigBuilder::new()
      .ring_capacity(1024)
      .partitions_per_topic(4)
      .build();
    assert_eq!(config.ring_capacity, 1024);
    assert_eq!(config.partitions_per_topic, 4);
  }
}
