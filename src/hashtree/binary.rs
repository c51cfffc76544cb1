use std::mem;

use log::{debug, trace};
use sha2::Sha256;
use sha2::digest::Digest;

use crate::config::{OddNodePolicy, TreeConfig};
use crate::digest::{Accumulator, Hash, HasherPool};
use crate::error::{MerkleError, Result};
use crate::hashtree::HashTree;
use crate::leaves::hash_leaves;
use crate::proof::Proof;

/// Position of a node in the tree's arena.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
  Leaf { data: Vec<u8> },
  /// `right` is `None` only for the one-child parents of [`OddNodePolicy::HashSingle`].
  Branch { left: NodeId, right: Option<NodeId> },
}

struct Node<D: Accumulator> {
  hash: Hash<D>,
  parent: Option<NodeId>,
  kind: NodeKind,
}

impl<D: Accumulator> Node<D> {
  fn new_leaf(hash: Hash<D>, data: Vec<u8>) -> Self {
    Node { hash, parent: None, kind: NodeKind::Leaf { data } }
  }

  fn data(&self) -> Option<&[u8]> {
    match &self.kind {
      NodeKind::Leaf { data } => Some(data),
      NodeKind::Branch { .. } => None,
    }
  }
}

/// In-memory binary hash tree over an ordered sequence of byte values.
///
/// Nodes are kept in an arena. The first `size()` slots are the leaves in index order; the branches built on top of
/// them follow. Children are owned through indices and every node keeps the index of its parent, so a walk from a
/// leaf to the root costs `O(height)`.
///
/// The tree is not synchronized; callers sharing it across threads must wrap it in a lock.
pub struct BinaryHashTree<D: Accumulator = Sha256> {
  nodes: Vec<Node<D>>,
  size: usize,
  root: Option<NodeId>,
  pool: HasherPool<D>,
  config: TreeConfig,
}

impl<D: Accumulator> BinaryHashTree<D> {
  /// Build a tree over `values` with the default configuration.
  pub fn new(values: Vec<Vec<u8>>) -> Result<Self> {
    Self::with_config(values, TreeConfig::default())
  }

  pub fn with_config(values: Vec<Vec<u8>>, config: TreeConfig) -> Result<Self> {
    if values.is_empty() {
      return Err(MerkleError::NoLeaves);
    }
    let pool = HasherPool::new(config.pool_capacity);
    let hashes = hash_leaves(&values, &pool, &config);
    let nodes = values.into_iter().zip(hashes).map(|(data, hash)| Node::new_leaf(hash, data)).collect::<Vec<_>>();
    let size = nodes.len();
    let mut tree = BinaryHashTree { nodes, size, root: None, pool, config };
    tree.rebuild();
    Ok(tree)
  }

  pub fn config(&self) -> &TreeConfig {
    &self.config
  }

  /// Digest of `left` followed by `right`.
  pub fn combine(&self, left: &[u8], right: &[u8]) -> Hash<D> {
    self.pool.with(|hasher| {
      Digest::update(hasher, left);
      Digest::update(hasher, right);
      hasher.finalize_reset()
    })
  }

  pub fn leaf_hash(&self, index: usize) -> Option<&Hash<D>> {
    if index < self.size { Some(&self.nodes[index].hash) } else { None }
  }

  /// Number of levels above the leaves; 0 for a single leaf or an empty tree.
  pub fn height(&self) -> usize {
    let mut height = 0;
    if self.size > 0 {
      let mut current = 0;
      while let Some(parent) = self.nodes[current].parent {
        height += 1;
        current = parent;
      }
    }
    height
  }

  /// Leaf values in index order.
  pub fn values(&self) -> impl Iterator<Item = &[u8]> {
    self.nodes[..self.size].iter().filter_map(Node::data)
  }

  fn check(&self, index: usize) -> Result<()> {
    if index < self.size { Ok(()) } else { Err(MerkleError::IndexOutOfBounds { index, len: self.size }) }
  }

  /// Discard every branch and pair the leaves again bottom-up.
  fn rebuild(&mut self) {
    self.nodes.truncate(self.size);
    for node in self.nodes.iter_mut() {
      node.parent = None;
    }
    if self.size == 0 {
      self.root = None;
      return;
    }

    let mut level = (0..self.size).collect::<Vec<NodeId>>();
    while level.len() > 1 {
      let mut next = Vec::with_capacity(level.len().div_ceil(2));
      for pair in level.chunks(2) {
        let id = match *pair {
          [left, right] => {
            let hash = self.combine(&self.nodes[left].hash, &self.nodes[right].hash);
            self.push_branch(hash, left, Some(right))
          }
          [single] => match self.config.odd_node {
            OddNodePolicy::Promote => single,
            OddNodePolicy::HashSingle => {
              let hash = self.pool.digest(&self.nodes[single].hash);
              self.push_branch(hash, single, None)
            }
          },
          _ => unreachable!(),
        };
        next.push(id);
      }
      level = next;
    }
    self.root = Some(level[0]);
    debug!("built tree: {} leaves, {} nodes, height {}", self.size, self.nodes.len(), self.height());
  }

  fn push_branch(&mut self, hash: Hash<D>, left: NodeId, right: Option<NodeId>) -> NodeId {
    let id = self.nodes.len();
    self.nodes[left].parent = Some(id);
    if let Some(right) = right {
      self.nodes[right].parent = Some(id);
    }
    self.nodes.push(Node { hash, parent: None, kind: NodeKind::Branch { left, right } });
    id
  }

  /// Recompute the hashes on the path from `current` to the root.
  fn refresh_ancestors(&mut self, mut current: NodeId) {
    while let Some(parent) = self.nodes[current].parent {
      let hash = match self.nodes[parent].kind {
        NodeKind::Branch { left, right: Some(right) } => self.combine(&self.nodes[left].hash, &self.nodes[right].hash),
        NodeKind::Branch { left, right: None } => self.pool.digest(&self.nodes[left].hash),
        NodeKind::Leaf { .. } => unreachable!(),
      };
      self.nodes[parent].hash = hash;
      current = parent;
    }
  }
}

impl<D: Accumulator> HashTree for BinaryHashTree<D> {
  type Hash = Hash<D>;
  type Proof = Proof<D>;
  type Error = MerkleError;

  fn append(&mut self, data: Vec<u8>) -> Result<usize> {
    let hash = self.pool.digest(&data);
    self.nodes.truncate(self.size);
    self.nodes.push(Node::new_leaf(hash, data));
    self.size += 1;
    self.rebuild();
    trace!("append: leaf {}", self.size - 1);
    Ok(self.size - 1)
  }

  fn get(&self, index: usize) -> Option<&[u8]> {
    if index < self.size { self.nodes[index].data() } else { None }
  }

  fn size(&self) -> usize {
    self.size
  }

  fn root_hash(&self) -> Option<&Hash<D>> {
    self.root.map(|root| &self.nodes[root].hash)
  }

  fn update(&mut self, index: usize, data: Vec<u8>) -> Result<Vec<u8>> {
    self.check(index)?;
    let hash = self.pool.digest(&data);
    let leaf = &mut self.nodes[index];
    leaf.hash = hash;
    let old = match &mut leaf.kind {
      NodeKind::Leaf { data: current } => mem::replace(current, data),
      NodeKind::Branch { .. } => unreachable!(),
    };
    self.refresh_ancestors(index);
    trace!("update: leaf {index}");
    Ok(old)
  }

  fn remove(&mut self, index: usize) -> Result<Vec<u8>> {
    self.check(index)?;
    self.nodes.truncate(self.size);
    let removed = self.nodes.remove(index);
    self.size -= 1;
    self.rebuild();
    trace!("remove: leaf {index}, {} left", self.size);
    match removed.kind {
      NodeKind::Leaf { data } => Ok(data),
      NodeKind::Branch { .. } => unreachable!(),
    }
  }

  fn generate_proof(&self, index: usize) -> Result<Proof<D>> {
    self.check(index)?;
    let mut hashes = Vec::with_capacity(self.height());
    let mut current = index;
    while let Some(parent) = self.nodes[current].parent {
      if let NodeKind::Branch { left, right: Some(right) } = self.nodes[parent].kind {
        let sibling = if left == current { right } else { left };
        hashes.push(self.nodes[sibling].hash.clone());
      }
      current = parent;
    }
    trace!("proof: leaf {index}, {} siblings", hashes.len());
    Ok(Proof::new(hashes, index, self.size, self.config.odd_node))
  }

  fn generate_proof_for(&self, data: &[u8]) -> Result<Proof<D>> {
    let index = self.values().position(|value| value == data).ok_or(MerkleError::NoSuchValue)?;
    self.generate_proof(index)
  }

  fn verify_path(&self, proof: &Proof<D>, data: &[u8]) -> Result<()> {
    let root = self.root_hash().ok_or(MerkleError::EmptyTree)?;
    proof.verify(data, root)
  }
}
