//! Inclusion proofs and their verification.

use std::fmt;
use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use sha2::digest::{Digest, Output, OutputSizeUser};

use crate::config::OddNodePolicy;
use crate::digest::{Accumulator, Hash};
use crate::error::{MerkleError, Result};

/// Sibling hashes from a leaf up to the root, plus the position of the leaf.
///
/// A proof is a snapshot: it stays valid for the root it was issued against, independently of the tree that issued
/// it. Levels where the climbed node had no sibling contribute no hash; the verifier infers them from `leaf_count`.
pub struct Proof<D: Accumulator> {
  hashes: Vec<Hash<D>>,
  index: usize,
  leaf_count: usize,
  odd_node: OddNodePolicy,
}

impl<D: Accumulator> Proof<D> {
  pub fn new(hashes: Vec<Hash<D>>, index: usize, leaf_count: usize, odd_node: OddNodePolicy) -> Self {
    Proof { hashes, index, leaf_count, odd_node }
  }

  pub fn hashes(&self) -> &[Hash<D>] {
    &self.hashes
  }

  pub fn index(&self) -> usize {
    self.index
  }

  pub fn leaf_count(&self) -> usize {
    self.leaf_count
  }

  pub fn odd_node(&self) -> OddNodePolicy {
    self.odd_node
  }

  /// Recompute the root from `value` and the sibling hashes.
  pub fn compute_root(&self, value: &[u8]) -> Result<Hash<D>> {
    if self.index >= self.leaf_count {
      return Err(MerkleError::MalformedProof(format!("index {} beyond {} leaves", self.index, self.leaf_count)));
    }
    let mut hasher = D::new();
    Digest::update(&mut hasher, value);
    let mut current = hasher.finalize_reset();

    let mut siblings = self.hashes.iter();
    let mut consumed = 0;
    let mut index = self.index;
    let mut width = self.leaf_count;
    while width > 1 {
      if index == width - 1 && width % 2 == 1 {
        if self.odd_node == OddNodePolicy::HashSingle {
          Digest::update(&mut hasher, &current);
          current = hasher.finalize_reset();
        }
      } else {
        let sibling =
          siblings.next().ok_or_else(|| MerkleError::MalformedProof(format!("missing sibling at width {width}")))?;
        consumed += 1;
        current = if index % 2 == 0 { combine::<D>(&current, sibling) } else { combine::<D>(sibling, &current) };
      }
      index /= 2;
      width = width.div_ceil(2);
    }
    if siblings.next().is_some() {
      let message = format!("{} sibling hashes for {consumed} levels", self.hashes.len());
      return Err(MerkleError::MalformedProof(message));
    }
    Ok(current)
  }

  /// Check that this proof binds `value` to `root`.
  pub fn verify(&self, value: &[u8], root: &[u8]) -> Result<()> {
    let computed = self.compute_root(value)?;
    if computed.as_slice() == root {
      Ok(())
    } else {
      Err(MerkleError::ProofVerificationFailed { expected: root.to_vec(), computed: computed.to_vec() })
    }
  }

  /// Serialize as `index, leaf_count, policy, count, hashes...` in little endian.
  pub fn write<W: Write>(&self, w: &mut W) -> Result<usize> {
    w.write_u64::<LittleEndian>(self.index as u64)?;
    w.write_u64::<LittleEndian>(self.leaf_count as u64)?;
    w.write_u8(self.odd_node.to_byte())?;
    w.write_u32::<LittleEndian>(self.hashes.len() as u32)?;
    for hash in self.hashes.iter() {
      w.write_all(hash)?;
    }
    Ok(8 + 8 + 1 + 4 + self.hashes.len() * <D as OutputSizeUser>::output_size())
  }

  pub fn read<R: Read>(r: &mut R) -> Result<Self> {
    let index = r.read_u64::<LittleEndian>()? as usize;
    let leaf_count = r.read_u64::<LittleEndian>()? as usize;
    let policy = r.read_u8()?;
    let odd_node =
      OddNodePolicy::from_byte(policy).ok_or_else(|| MerkleError::MalformedProof(format!("unknown policy {policy}")))?;
    if index >= leaf_count {
      return Err(MerkleError::MalformedProof(format!("index {index} beyond {leaf_count} leaves")));
    }
    let count = r.read_u32::<LittleEndian>()? as usize;
    if count > usize::BITS as usize {
      return Err(MerkleError::MalformedProof(format!("{count} sibling hashes")));
    }
    let mut hashes = Vec::with_capacity(count);
    for _ in 0..count {
      let mut hash = Hash::<D>::default();
      r.read_exact(&mut hash)?;
      hashes.push(hash);
    }
    Ok(Proof { hashes, index, leaf_count, odd_node })
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    let mut buffer = Vec::new();
    self.write(&mut buffer).expect("writing into a Vec cannot fail");
    buffer
  }
}

/// Digest of `left` followed by `right`, with a fresh accumulator.
pub fn combine<D: Accumulator>(left: &[u8], right: &[u8]) -> Output<D> {
  let mut hasher = D::new();
  Digest::update(&mut hasher, left);
  Digest::update(&mut hasher, right);
  hasher.finalize()
}

impl<D: Accumulator> Clone for Proof<D> {
  fn clone(&self) -> Self {
    Proof { hashes: self.hashes.clone(), index: self.index, leaf_count: self.leaf_count, odd_node: self.odd_node }
  }
}

impl<D: Accumulator> PartialEq for Proof<D> {
  fn eq(&self, other: &Self) -> bool {
    self.index == other.index
      && self.leaf_count == other.leaf_count
      && self.odd_node == other.odd_node
      && self.hashes == other.hashes
  }
}

impl<D: Accumulator> Eq for Proof<D> {}

impl<D: Accumulator> fmt::Debug for Proof<D> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Proof")
      .field("hashes", &self.hashes.iter().map(hex::encode).collect::<Vec<_>>())
      .field("index", &self.index)
      .field("leaf_count", &self.leaf_count)
      .field("odd_node", &self.odd_node)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use sha2::Sha256;
  use std::io::Cursor;

  fn sha(data: &[u8]) -> Hash<Sha256> {
    Sha256::digest(data)
  }

  #[test]
  fn combine_is_ordered() {
    let (yolo, diftp) = (sha(b"yolo"), sha(b"diftp"));
    assert_eq!(
      "a95e7824ca69532428f3050ea7ac90b6ceb8af5b2bc51660f7bf13d64c74e76b",
      hex::encode(combine::<Sha256>(&yolo, &diftp))
    );
    assert_eq!(
      "6d1a5ee206c0e2b5d4a69176d1873f6b84a51a593f36e92feaab586c2646e22e",
      hex::encode(combine::<Sha256>(&diftp, &yolo))
    );
  }

  #[test]
  fn verification_does_not_touch_the_proof() {
    let root = combine::<Sha256>(&sha(b"yolo"), &sha(b"diftp"));
    let proof = Proof::<Sha256>::new(vec![sha(b"yolo")], 1, 2, OddNodePolicy::Promote);
    let snapshot = proof.clone();
    for _ in 0..3 {
      proof.verify(b"diftp", &root).unwrap();
    }
    assert_eq!(snapshot, proof);
  }

  #[test]
  fn single_leaf_proof_has_no_siblings() {
    let proof = Proof::<Sha256>::new(Vec::new(), 0, 1, OddNodePolicy::Promote);
    proof.verify(b"yolo", &sha(b"yolo")).unwrap();
    assert!(matches!(proof.verify(b"nope", &sha(b"yolo")), Err(MerkleError::ProofVerificationFailed { .. })));
  }

  #[test]
  fn shape_mismatch_is_malformed() {
    let extra = Proof::<Sha256>::new(vec![sha(b"a"), sha(b"b"), sha(b"c")], 2, 3, OddNodePolicy::Promote);
    match extra.compute_root(b"x") {
      Err(MerkleError::MalformedProof(message)) => assert_eq!("3 sibling hashes for 1 levels", message),
      other => panic!("unexpected {other:?}"),
    }
    let missing = Proof::<Sha256>::new(vec![sha(b"a")], 0, 4, OddNodePolicy::Promote);
    assert!(matches!(missing.compute_root(b"x"), Err(MerkleError::MalformedProof(_))));
    let outside = Proof::<Sha256>::new(Vec::new(), 1, 1, OddNodePolicy::Promote);
    assert!(matches!(outside.compute_root(b"x"), Err(MerkleError::MalformedProof(_))));
  }

  #[test]
  fn failure_reports_both_roots() {
    let proof = Proof::<Sha256>::new(Vec::new(), 0, 1, OddNodePolicy::Promote);
    let err = proof.verify(b"diftp", &sha(b"yolo")).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("311fe3feed16b9cd8df0f8b1517be5cb86048707df4889ba8dc37d4d68866d02"), "{message}");
    assert!(message.contains("4541f9abff1560090c8554f6336c039c7eba3da710aa83b07452ad1161c9abcd"), "{message}");
  }

  #[test]
  fn codec() {
    let proof = Proof::<Sha256>::new(vec![sha(b"d"), sha(b"ab")], 2, 5, OddNodePolicy::HashSingle);
    let bytes = proof.to_bytes();
    assert_eq!(8 + 8 + 1 + 4 + 2 * 32, bytes.len());
    assert_eq!(proof, Proof::read(&mut Cursor::new(&bytes)).unwrap());

    let truncated = &bytes[..bytes.len() - 1];
    assert!(matches!(Proof::<Sha256>::read(&mut Cursor::new(truncated)), Err(MerkleError::Io(_))));

    let mut bad_policy = bytes.clone();
    bad_policy[16] = 7;
    assert!(matches!(Proof::<Sha256>::read(&mut Cursor::new(&bad_policy)), Err(MerkleError::MalformedProof(_))));

    let mut bad_index = bytes.clone();
    bad_index[0] = 9;
    assert!(matches!(Proof::<Sha256>::read(&mut Cursor::new(&bad_index)), Err(MerkleError::MalformedProof(_))));
  }
}
