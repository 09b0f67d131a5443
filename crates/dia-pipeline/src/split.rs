//! Deterministic train/test splitting.
//!
//! Identical input length, ratio and seed always produce identical index
//! partitions, so fitted statistics — and therefore whole experiments —
//! are reproducible.

use crate::error::Result;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle `0..n_rows` with a seeded generator and carve off
/// `ceil(n_rows * test_size)` rows for the test partition.
///
/// Returns `(train, test)` index vectors; together they cover every row
/// exactly once.
pub fn train_test_indices(n_rows: usize, test_size: f64, seed: u64) -> (Vec<u32>, Vec<u32>) {
    let mut indices: Vec<u32> = (0..n_rows as u32).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n_rows as f64) * test_size).ceil() as usize;
    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();
    (train, test)
}

/// Materialize the rows of `df` selected by `indices`, in order.
pub fn take_rows(df: &DataFrame, indices: &[u32]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec("rows".into(), indices.to_vec());
    Ok(df.take(&idx)?)
}

/// Materialize the target cells selected by `indices`, in order.
pub fn take_target(target: &[bool], indices: &[u32]) -> Vec<bool> {
    indices.iter().map(|&i| target[i as usize]).collect()
}
