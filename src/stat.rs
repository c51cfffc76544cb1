use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Result, Write};
use std::path::Path;
use std::time::Duration;

/// Summary of one series of timings, in microseconds.
#[derive(Debug, Clone)]
pub struct Stat {
  pub count: usize,
  pub mean: f64,
  pub median: f64,
  pub std_dev: f64,
  pub min: f64,
  pub max: f64,
}

impl Stat {
  pub fn from_samples(samples: &[f64]) -> Stat {
    if samples.is_empty() {
      return Stat { count: 0, mean: f64::NAN, median: f64::NAN, std_dev: f64::NAN, min: f64::NAN, max: f64::NAN };
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let mid = count / 2;
    let median = if count % 2 == 0 { (sorted[mid - 1] + sorted[mid]) / 2.0 } else { sorted[mid] };
    let variance = sorted.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / count as f64;
    Stat { count, mean, median, std_dev: variance.sqrt(), min: sorted[0], max: sorted[count - 1] }
  }
}

impl Display for Stat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    // 2σ as a percentage of the mean
    let two_sigma = if self.mean > 0.0 { 200.0 * self.std_dev / self.mean } else { 0.0 };
    write!(f, "{:.1}µs ±{:.1}% [{:.1}|{:.1}|{:.1}]", self.mean, two_sigma, self.min, self.median, self.max)
  }
}

/// Timings grouped by input size.
pub struct Report<X: Display + Copy + Ord> {
  samples: BTreeMap<X, Vec<f64>>,
}

impl<X: Display + Copy + Ord> Default for Report<X> {
  fn default() -> Self {
    Self::new()
  }
}

impl<X: Display + Copy + Ord> Report<X> {
  pub fn new() -> Self {
    Report { samples: BTreeMap::new() }
  }

  pub fn add(&mut self, x: X, elapsed: Duration) {
    self.samples.entry(x).or_default().push(elapsed.as_nanos() as f64 / 1000.0);
  }

  pub fn single(&self, x: X) -> Stat {
    Stat::from_samples(self.samples.get(&x).map(Vec::as_slice).unwrap_or_default())
  }

  pub fn save_to_csv(&self, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "N,COUNT,MEAN,MEDIAN,STDDEV,MIN,MAX")?;
    for (x, samples) in self.samples.iter() {
      let s = Stat::from_samples(samples);
      writeln!(writer, "\"{x}\",{},{:.3},{:.3},{:.3},{:.3},{:.3}", s.count, s.mean, s.median, s.std_dev, s.min, s.max)?;
    }
    writer.flush()
  }
}
