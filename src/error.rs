use thiserror::Error;

pub type Result<T> = std::result::Result<T, MerkleError>;

#[derive(Debug, Error)]
pub enum MerkleError {
  #[error("cannot create a tree with no leaves")]
  NoLeaves,

  #[error("index {index} out of bounds for {len} leaves")]
  IndexOutOfBounds { index: usize, len: usize },

  #[error("value not found in the tree")]
  NoSuchValue,

  /// The root recomputed from a proof differs from the expected one.
  #[error("proof verification failed: expected root {}, computed {}", hex::encode(expected), hex::encode(computed))]
  ProofVerificationFailed { expected: Vec<u8>, computed: Vec<u8> },

  #[error("the tree has no root")]
  EmptyTree,

  #[error("malformed proof: {0}")]
  MalformedProof(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}
