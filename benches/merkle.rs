use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use merkle_tree::{BinaryHashTree, HashTree, TreeConfig, splitmix_values};
use sha2::Sha256;
use std::hint::black_box;

const SIZES: [usize; 3] = [1024, 16 * 1024, 128 * 1024];

fn bench_build(c: &mut Criterion) {
  let mut group = c.benchmark_group("build");
  let sequential = TreeConfig { parallel_threshold: usize::MAX, ..Default::default() };
  let parallel = TreeConfig { parallel_threshold: 1, ..Default::default() };
  for n in SIZES {
    let values = splitmix_values(n);
    for (name, config) in [("sequential", sequential), ("parallel", parallel)] {
      group.bench_with_input(BenchmarkId::new(name, n), &values, |b, values| {
        b.iter_batched(
          || values.clone(),
          |values| BinaryHashTree::<Sha256>::with_config(values, config).unwrap(),
          BatchSize::LargeInput,
        )
      });
    }
  }
  group.finish();
}

fn bench_update(c: &mut Criterion) {
  let mut group = c.benchmark_group("update");
  for n in SIZES {
    let mut tree = BinaryHashTree::<Sha256>::new(splitmix_values(n)).unwrap();
    let mut i = 0;
    group.bench_function(BenchmarkId::from_parameter(n), |b| {
      b.iter(|| {
        i = (i + 7919) % n;
        tree.update(i, black_box(i.to_le_bytes().to_vec())).unwrap()
      })
    });
  }
  group.finish();
}

fn bench_proof(c: &mut Criterion) {
  let mut group = c.benchmark_group("proof");
  for n in SIZES {
    let values = splitmix_values(n);
    let tree = BinaryHashTree::<Sha256>::new(values.clone()).unwrap();
    let index = n / 3;
    let proof = tree.generate_proof(index).unwrap();
    let root = tree.root_hash().unwrap().clone();
    group.bench_function(BenchmarkId::new("generate", n), |b| b.iter(|| tree.generate_proof(black_box(index)).unwrap()));
    group.bench_function(BenchmarkId::new("verify", n), |b| {
      b.iter(|| proof.verify(black_box(values[index].as_slice()), &root).unwrap())
    });
  }
  group.finish();
}

criterion_group!(benches, bench_build, bench_update, bench_proof);
criterion_main!(benches);
