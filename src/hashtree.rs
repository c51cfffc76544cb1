pub mod binary;

/// Core hash tree abstraction
pub trait HashTree {
  type Hash;
  type Proof;
  type Error;

  /// Append a new data item to the tree and return its index
  fn append(&mut self, data: Vec<u8>) -> Result<usize, Self::Error>;

  /// Retrieve data by index
  fn get(&self, index: usize) -> Option<&[u8]>;

  /// Get the current size (number of leaf nodes)
  fn size(&self) -> usize;

  /// Get the root hash, `None` once every leaf has been removed
  fn root_hash(&self) -> Option<&Self::Hash>;

  /// Replace the data at `index` and return the previous data
  fn update(&mut self, index: usize, data: Vec<u8>) -> Result<Vec<u8>, Self::Error>;

  /// Remove the data at `index`; later leaves shift down by one
  fn remove(&mut self, index: usize) -> Result<Vec<u8>, Self::Error>;

  /// Generate proof path for given index
  fn generate_proof(&self, index: usize) -> Result<Self::Proof, Self::Error>;

  /// Generate proof path for the first leaf holding `data`
  fn generate_proof_for(&self, data: &[u8]) -> Result<Self::Proof, Self::Error>;

  /// Verify a path from leaf to the current root
  fn verify_path(&self, proof: &Self::Proof, data: &[u8]) -> Result<(), Self::Error>;
}
