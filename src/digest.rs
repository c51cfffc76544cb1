//! Digest accumulators and the pool that recycles them.

use parking_lot::Mutex;
use sha2::digest::{Digest, FixedOutputReset, Output};

/// A digest accumulator usable by the tree. `D::new()` is the factory that yields independent instances.
pub trait Accumulator: Digest + FixedOutputReset + Send + 'static {}

impl<D: Digest + FixedOutputReset + Send + 'static> Accumulator for D {}

/// Fixed-length digest produced by the accumulator `D`.
pub type Hash<D> = Output<D>;

/// Bounded pool of idle accumulators.
///
/// Every accumulator handed out by [`HasherPool::with`] is reset before it goes back to the pool, so a caller never
/// observes bytes written by a previous user.
pub struct HasherPool<D: Accumulator> {
  idle: Mutex<Vec<D>>,
  capacity: usize,
}

impl<D: Accumulator> HasherPool<D> {
  pub fn new(capacity: usize) -> Self {
    Self { idle: Mutex::new(Vec::with_capacity(capacity)), capacity }
  }

  /// Run `f` with exclusive access to an accumulator taken from the pool (or freshly created).
  pub fn with<R, F: FnOnce(&mut D) -> R>(&self, f: F) -> R {
    let popped = self.idle.lock().pop();
    let mut hasher = popped.unwrap_or_else(D::new);
    let out = f(&mut hasher);
    Digest::reset(&mut hasher);
    let mut idle = self.idle.lock();
    if idle.len() < self.capacity {
      idle.push(hasher);
    }
    out
  }

  /// Digest of a single byte sequence.
  pub fn digest(&self, data: &[u8]) -> Hash<D> {
    self.with(|hasher| {
      Digest::update(hasher, data);
      hasher.finalize_reset()
    })
  }

  pub fn idle(&self) -> usize {
    self.idle.lock().len()
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }
}
