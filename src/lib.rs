#![allow(clippy::cognitive_complexity, clippy::large_enum_variant)]
#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]

//! # pitch-ingest-pipeline
//!
//! A high-throughput market-data ingestion pipeline for the CBOE PITCH
//! binary exchange protocol: UDP datagrams in, decoded and per-symbol
//! fanned-out records out, published to a downstream message bus.
//!
//! ## Pipeline stages
//!
//! ```text
//! UDP datagram -> [decoder + symbol_table] -> [router] -> [dispatchers] -> [ring] -> [publisher] -> bus
//! ```
//!
//! - [`decoder`] splits a Sequenced Unit Header frame into typed records,
//!   consulting a per-receiver [`symbol_table::SymbolTable`] to resolve
//!   order-id back-references.
//! - [`router`] fans decoded records out to one lock-free queue per symbol.
//! - [`dispatcher`] runs a fixed pool of threads that drain those queues and
//!   publish into the [`ring`], a bounded disruptor-style MPSC ring buffer.
//! - [`publisher`] is the ring's single consumer: it resolves a
//!   `(topic, partition)` for each record and forwards it to a
//!   [`bus::MessageBus`].
//!
//! [`receiver`], [`config`], [`pipeline`], and [`health`] are the ambient
//! stack that wires the above into a runnable, observable service.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use pitch_ingest_pipeline::bus::InMemoryBus;
//! use pitch_ingest_pipeline::config::{PipelineConfigBuilder, UdpReceiverConfig};
//! use pitch_ingest_pipeline::pipeline::PipelineBuilder;
//! use std::sync::Arc;
//!
//! let config = PipelineConfigBuilder::new()
//!   .add_udp_receiver(UdpReceiverConfig {
//!     bind_ip: "0.0.0.0".to_string(),
//!     bind_port: 30_001,
//!     cpu_affinity_core: -1,
//!     realtime_priority: 0,
//!   })
//!   .build();
//!
//! let mut pipeline = PipelineBuilder::new()
//!   .config(config)
//!   .bus(Arc::new(InMemoryBus::new()))
//!   .build();
//!
//! pipeline.start();
//! // ... run until shutdown ...
//! pipeline.stop();
//! ```

pub mod bus;
pub mod config;
pub mod decoder;
pub mod dispatcher;
pub mod errors;
pub mod health;
pub mod model;
pub mod pipeline;
pub mod publisher;
pub mod receiver;
pub mod ring;
pub mod router;
pub mod symbol_table;

pub use bus::MessageBus;
pub use config::PipelineConfig;
pub use errors::PitchError;
pub use model::{Record, RecordKind, Symbol, SymbolContext};
pub use pipeline::{Pipeline, PipelineBuilder};
