//! Tuning knobs for tree construction.

pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1024;
pub const DEFAULT_POOL_CAPACITY: usize = 16;

/// How a level with an odd number of nodes treats its trailing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OddNodePolicy {
  /// Carry the node to the next level unchanged.
  #[default]
  Promote,
  /// Give the node a one-child parent whose hash is the digest of the child's hash.
  HashSingle,
}

impl OddNodePolicy {
  pub fn to_byte(self) -> u8 {
    match self {
      OddNodePolicy::Promote => 0,
      OddNodePolicy::HashSingle => 1,
    }
  }

  pub fn from_byte(b: u8) -> Option<Self> {
    match b {
      0 => Some(OddNodePolicy::Promote),
      1 => Some(OddNodePolicy::HashSingle),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
  /// Inputs with fewer items than this are hashed on the calling thread.
  pub parallel_threshold: usize,
  /// Number of leaf-hashing batches; 0 uses the size of the rayon pool.
  pub workers: usize,
  /// Maximum number of idle accumulators kept for reuse.
  pub pool_capacity: usize,
  pub odd_node: OddNodePolicy,
}

impl TreeConfig {
  pub fn workers(&self) -> usize {
    if self.workers == 0 { rayon::current_num_threads().max(1) } else { self.workers }
  }

  pub fn with_odd_node(self, odd_node: OddNodePolicy) -> Self {
    Self { odd_node, ..self }
  }
}

impl Default for TreeConfig {
  fn default() -> Self {
    TreeConfig {
      parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
      workers: 0,
      pool_capacity: DEFAULT_POOL_CAPACITY,
      odd_node: OddNodePolicy::Promote,
    }
  }
}
