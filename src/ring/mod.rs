//! The bounded, multi-producer/single-consumer dispatch ring.
//!
//! Structurally this is an LMAX-Disruptor-style ring: a fixed power-of-two
//! array of slots, a shared atomic "claim" cursor producers advance with
//! `fetch_add`, and a per-slot atomic "published" marker the single consumer
//! polls. Each producer claims a *globally* unique sequence number via
//! `fetch_add` rather than assuming it is the sole writer of the cursor, so
//! any number of dispatcher threads can publish into it concurrently.
//!
//! Wait strategy is busy-spin on both sides — acceptable because this
//! pipeline is throughput-oriented and its threads are expected to be pinned
//! to dedicated cores.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

/// A bounded MPSC disruptor ring of capacity `R` (must be a power of two).
pub struct Ring<T> {
  buffer: UnsafeCell<Box<[MaybeUninit<T>]>>,
  mask: u64,
  capacity: u64,
  /// Next sequence number available to claim. Producers `fetch_add` this.
  claim: CachePadded<AtomicU64>,
  /// Highest sequence the consumer has fully released. Producers must not
  /// claim a sequence more than `capacity` ahead of this.
  released: CachePadded<AtomicU64>,
  /// Per-slot published marker: slot `i` holds the sequence number last
  /// published into it, or `-1` if never published / already consumed.
  published: Box<[CachePadded<AtomicI64>]>,
}

unsafe impl<T: Send> Send for Ring<T> {}
unsafe impl<T: Send> Sync for Ring<T> {}

impl<T> Ring<T> {
  /// # Panics
  /// Panics if `capacity` is zero or not a power of two.
  pub fn with_capacity(capacity: usize) -> Self {
    assert!(capacity > 0 && capacity.is_power_of_two(), "ring capacity must be a power of two");
    let mut buf = Vec::with_capacity(capacity);
    buf.resize_with(capacity, MaybeUninit::uninit);
    let mut published = Vec::with_capacity(capacity);
    published.resize_with(capacity, || CachePadded::new(AtomicI64::new(-1)));
    Self {
      buffer: UnsafeCell::new(buf.into_boxed_slice()),
      mask: capacity as u64 - 1,
      capacity: capacity as u64,
      claim: CachePadded::new(AtomicU64::new(0)),
      released: CachePadded::new(AtomicU64::new(0)),
      published: published.into_boxed_slice(),
    }
  }

  pub fn capacity(&self) -> u64 {
    self.capacity
  }

  /// Atomically allocate the next sequence number, spinning if the
  /// consumer has not yet released the slot this sequence would reuse.
  pub fn claim_one(&self) -> u64 {
    let seq = self.claim.fetch_add(1, Ordering::Relaxed);
    while seq - self.released.load(Ordering::Acquire) >= self.capacity {
      std::hint::spin_loop();
    }
    seq
  }

  /// Move `value` into the slot claimed by `seq`. Safe because the
  /// claim/release protocol guarantees exclusive access: no other producer
  /// holds `seq`, and the consumer has already released any prior
  /// occupant of this slot.
  pub fn write_slot(&self, seq: u64, value: T) {
    let idx = (seq & self.mask) as usize;
    unsafe {
      let slot = &mut (*self.buffer.get())[idx];
      slot.write(value);
    }
  }

  /// Make `seq`'s slot visible to the consumer.
  pub fn publish(&self, seq: u64) {
    let idx = (seq & self.mask) as usize;
    self.published[idx].store(seq as i64, Ordering::Release);
  }

  fn is_published(&self, seq: u64) -> bool {
    let idx = (seq & self.mask) as usize;
    self.published[idx].load(Ordering::Acquire) == seq as i64
  }

  /// Take ownership of the value published at `seq` out of the ring. Must
  /// only be called by the single consumer, and only after confirming via
  /// `is_published` that `seq` is ready.
  unsafe fn take_slot(&self, seq: u64) -> T {
    let idx = (seq & self.mask) as usize;
    let slot = &mut (*self.buffer.get())[idx];
    std::mem::replace(slot, MaybeUninit::uninit()).assume_init()
  }

  /// Release `seq`'s slot back to producers after the consumer has
  /// finished with the value it held.
  fn release_through(&self, seq: u64) {
    self.released.store(seq + 1, Ordering::Release);
  }
}

impl<T> Drop for Ring<T> {
  fn drop(&mut self) {
    // Drop any values that were published but never consumed, so a ring
    // torn down mid-flight does not leak their resources.
    let released = self.released.load(Ordering::Acquire);
    let claimed = self.claim.load(Ordering::Acquire);
    for seq in released..claimed {
      if self.is_published(seq) {
        unsafe {
          drop(self.take_slot(seq));
        }
      }
    }
  }
}

/// The single consumer side of a [`Ring`]: owns the "next sequence to read"
/// cursor, which belongs to exactly one thread and therefore needs no
/// synchronization of its own.
pub struct Consumer<T> {
  ring: std::sync::Arc<Ring<T>>,
  next_to_read: u64,
}

impl<T> Consumer<T> {
  pub fn new(ring: std::sync::Arc<Ring<T>>) -> Self {
    Self { ring, next_to_read: 0 }
  }

  /// Busy-spin until `next_to_read` is published, then invoke `handler`
  /// for it and every subsequently published contiguous sequence, finally
  /// releasing the whole contiguous run back to producers at once.
  pub fn wait_and_drain<F: FnMut(T)>(&mut self, mut handler: F) {
    while !self.ring.is_published(self.next_to_read) {
      std::hint::spin_loop();
    }
    let mut highest = self.next_to_read;
    loop {
      let value = unsafe { self.ring.take_slot(highest) };
      handler(value);
      let next = highest + 1;
      if self.ring.is_published(next) {
        highest = next;
      } else {
        break;
      }
    }
    self.ring.release_through(highest);
    self.next_to_read = highest + 1;
  }
}
