use crossbeam_queue::SegQueue;

use crate::model::record::Record;

/// The lock-free per-symbol FIFO. `SegQueue` is crossbeam's unbounded
/// Michael-Scott style MPSC/MPMC queue — this pipeline only ever has
/// multiple producers (decoders pushing from many receiver threads) and a
/// single logical consumer (the dispatcher that owns this symbol's index),
/// so it is used here in its MPSC role, the same role
/// `moodycamel::ConcurrentQueue` plays in the original per-symbol router.
pub type Queue = SegQueue<Record>;
