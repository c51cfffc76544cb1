//! Binary Merkle tree over an ordered sequence of byte values.
//!
//! A [`BinaryHashTree`] summarizes its leaves into a single root hash, issues inclusion [`Proof`]s for individual
//! leaves and verifies them against a root alone. Leaves can be appended, replaced and removed after construction.
//! The digest algorithm is a type parameter: any RustCrypto [`Digest`](sha2::digest::Digest) with a resettable
//! fixed output works, [`sha2::Sha256`] being the default.
//!
//! ```
//! use merkle_tree::{BinaryHashTree, HashTree};
//!
//! let values = vec![b"yolo".to_vec(), b"diftp".to_vec(), b"ngmi".to_vec()];
//! let tree: BinaryHashTree = BinaryHashTree::new(values).unwrap();
//! let proof = tree.generate_proof_for(b"diftp").unwrap();
//! proof.verify(b"diftp", tree.root_hash().unwrap()).unwrap();
//! ```

pub mod config;
pub mod digest;
pub mod error;
pub mod hashtree;
pub mod leaves;
pub mod proof;

pub use config::{OddNodePolicy, TreeConfig};
pub use digest::{Accumulator, Hash, HasherPool};
pub use error::{MerkleError, Result};
pub use hashtree::HashTree;
pub use hashtree::binary::BinaryHashTree;
pub use proof::Proof;

pub fn splitmix64(x: u64) -> u64 {
  let mut z = x.wrapping_add(0x9e3779b97f4a7c15);
  z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
  z ^ (z >> 31)
}

/// `n` distinct 8-byte values derived from `splitmix64`.
pub fn splitmix_values(n: usize) -> Vec<Vec<u8>> {
  (0..n as u64).map(|i| splitmix64(i).to_le_bytes().to_vec()).collect()
}
