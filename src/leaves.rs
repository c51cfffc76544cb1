//! Bulk hashing of leaf values.

use std::mem;
use std::ops::Range;

use log::debug;
use sha2::digest::Digest;

use crate::config::TreeConfig;
use crate::digest::{Accumulator, Hash, HasherPool};

/// Split `len` items into `workers` contiguous batches. Every batch holds `len / workers` items except the last,
/// which also takes the remainder.
pub fn batches(len: usize, workers: usize) -> Vec<Range<usize>> {
  let workers = workers.clamp(1, len.max(1));
  let size = len / workers;
  (0..workers).map(|i| i * size..if i + 1 == workers { len } else { (i + 1) * size }).collect()
}

/// Digest every item with a fresh accumulator state. The output order matches the input order.
///
/// Large inputs are fanned out over the rayon pool, one pooled accumulator per batch. A panic inside any batch
/// aborts the whole call.
pub fn hash_leaves<D, T>(items: &[T], pool: &HasherPool<D>, config: &TreeConfig) -> Vec<Hash<D>>
where
  D: Accumulator,
  T: AsRef<[u8]> + Sync,
{
  let workers = config.workers();
  let mut out = vec![Hash::<D>::default(); items.len()];
  if items.len() < config.parallel_threshold || workers <= 1 {
    hash_batch(items, &mut out, pool);
    return out;
  }

  let ranges = batches(items.len(), workers);
  debug!("hashing {} leaves in {} batches", items.len(), ranges.len());
  rayon::scope(|s| {
    let mut rest: &mut [Hash<D>] = &mut out;
    for range in ranges {
      let (slots, tail) = mem::take(&mut rest).split_at_mut(range.len());
      rest = tail;
      let batch = &items[range];
      s.spawn(move |_| hash_batch(batch, slots, pool));
    }
  });
  out
}

fn hash_batch<D, T>(items: &[T], slots: &mut [Hash<D>], pool: &HasherPool<D>)
where
  D: Accumulator,
  T: AsRef<[u8]>,
{
  debug_assert_eq!(items.len(), slots.len());
  pool.with(|hasher| {
    for (slot, item) in slots.iter_mut().zip(items) {
      Digest::update(hasher, item.as_ref());
      *slot = hasher.finalize_reset();
    }
  });
}
