//! Gather and scatter along the cell axis

use crate::{Result, TopoError};
use ndarray::{Array2, ArrayView2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Reduction applied to the messages arriving at one target cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Sum of incoming messages
    Sum,
    /// Sum divided by the number of incoming messages
    Mean,
}

/// Select rows of `x`, one output row per entry of `index`
pub fn gather_rows(x: ArrayView2<f32>, index: &[usize]) -> Result<Array2<f32>> {
    let bound = x.nrows();
    if let Some(&i) = index.iter().find(|&&i| i >= bound) {
        return Err(TopoError::IndexOutOfBounds { index: i, bound });
    }
    Ok(x.select(Axis(0), index))
}

/// Reduce rows of `src` that share the same entry in `index`.
///
/// Row `k` of `src` contributes to output row `index[k]`. The output has
/// `dim_size` rows; rows nothing contributes to are zero, under both
/// reductions. Each output row is reduced in ascending row order of `src`, so
/// the result does not depend on thread scheduling.
pub fn scatter(
    src: ArrayView2<f32>,
    index: &[usize],
    dim_size: usize,
    aggr: Aggregation,
) -> Result<Array2<f32>> {
    if src.nrows() != index.len() {
        return Err(TopoError::DimensionMismatch {
            context: "scatter index",
            expected: src.nrows(),
            found: index.len(),
        });
    }
    if let Some(&i) = index.iter().find(|&&i| i >= dim_size) {
        return Err(TopoError::IndexOutOfBounds { index: i, bound: dim_size });
    }

    let channels = src.ncols();
    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); dim_size];
    for (k, &i) in index.iter().enumerate() {
        buckets[i].push(k);
    }

    let rows: Vec<Vec<f32>> = buckets
        .par_iter()
        .map(|edges| {
            let mut acc = vec![0.0_f32; channels];
            for &k in edges {
                for (a, &v) in acc.iter_mut().zip(src.row(k).iter()) {
                    *a += v;
                }
            }
            if aggr == Aggregation::Mean && !edges.is_empty() {
                let count = edges.len() as f32;
                acc.iter_mut().for_each(|a| *a /= count);
            }
            acc
        })
        .collect();

    let flat: Vec<f32> = rows.into_iter().flatten().collect();
    Ok(Array2::from_shape_vec((dim_size, channels), flat)?)
}
