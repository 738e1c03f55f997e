//! Coordinate-format sparse neighborhood matrix

use crate::{Result, TopoError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Sparse `[num_targets, num_sources]` matrix in coordinate (COO) form.
///
/// Entry `k` says that source cell `cols[k]` sends to target cell `rows[k]`
/// with weight `values[k]`. Duplicate coordinates are allowed until the
/// matrix is coalesced.
///
/// Deserialized matrices are validated like [`new`](Self::new) and start out
/// uncoalesced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNeighborhood")]
pub struct SparseNeighborhood {
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f32>,
    shape: (usize, usize),
    #[serde(skip)]
    coalesced: bool,
}

#[derive(Deserialize)]
struct RawNeighborhood {
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f32>,
    shape: (usize, usize),
}

impl TryFrom<RawNeighborhood> for SparseNeighborhood {
    type Error = TopoError;

    fn try_from(raw: RawNeighborhood) -> Result<Self> {
        SparseNeighborhood::new(raw.rows, raw.cols, raw.values, raw.shape)
    }
}

impl SparseNeighborhood {
    /// Create from parallel coordinate arrays and an explicit dense shape
    pub fn new(
        rows: Vec<usize>,
        cols: Vec<usize>,
        values: Vec<f32>,
        shape: (usize, usize),
    ) -> Result<Self> {
        if rows.len() != cols.len() || rows.len() != values.len() {
            return Err(TopoError::LengthMismatch(format!(
                "{} rows, {} cols, {} values",
                rows.len(),
                cols.len(),
                values.len()
            )));
        }

        if let Some(&index) = rows.iter().find(|&&r| r >= shape.0) {
            return Err(TopoError::IndexOutOfBounds { index, bound: shape.0 });
        }
        if let Some(&index) = cols.iter().find(|&&c| c >= shape.1) {
            return Err(TopoError::IndexOutOfBounds { index, bound: shape.1 });
        }

        Ok(SparseNeighborhood {
            rows,
            cols,
            values,
            shape,
            coalesced: false,
        })
    }

    /// Create from `(row, col, value)` triplets
    pub fn from_triplets(
        triplets: impl IntoIterator<Item = (usize, usize, f32)>,
        shape: (usize, usize),
    ) -> Result<Self> {
        let mut rows = Vec::new();
        let mut cols = Vec::new();
        let mut values = Vec::new();
        for (r, c, v) in triplets {
            rows.push(r);
            cols.push(c);
            values.push(v);
        }
        Self::new(rows, cols, values, shape)
    }

    /// Keep every nonzero entry of a dense matrix, in row-major order.
    ///
    /// The result is already coalesced.
    pub fn from_dense(dense: &Array2<f32>) -> Self {
        let mut rows = Vec::new();
        let mut cols = Vec::new();
        let mut values = Vec::new();

        for ((r, c), &v) in dense.indexed_iter() {
            if v != 0.0 {
                rows.push(r);
                cols.push(c);
                values.push(v);
            }
        }

        SparseNeighborhood {
            rows,
            cols,
            values,
            shape: dense.dim(),
            coalesced: true,
        }
    }

    /// Sort entries by `(row, col)` and sum the values of duplicate coordinates
    pub fn coalesce(&self) -> Self {
        if self.coalesced {
            return self.clone();
        }

        let mut order: Vec<usize> = (0..self.nnz()).collect();
        order.sort_by_key(|&k| (self.rows[k], self.cols[k]));

        let mut rows: Vec<usize> = Vec::with_capacity(order.len());
        let mut cols: Vec<usize> = Vec::with_capacity(order.len());
        let mut values: Vec<f32> = Vec::with_capacity(order.len());

        for k in order {
            let (r, c, v) = (self.rows[k], self.cols[k], self.values[k]);
            match (rows.last(), cols.last()) {
                (Some(&lr), Some(&lc)) if lr == r && lc == c => {
                    if let Some(last) = values.last_mut() {
                        *last += v;
                    }
                }
                _ => {
                    rows.push(r);
                    cols.push(c);
                    values.push(v);
                }
            }
        }

        SparseNeighborhood {
            rows,
            cols,
            values,
            shape: self.shape,
            coalesced: true,
        }
    }

    /// Whether entries are sorted and free of duplicates
    pub fn is_coalesced(&self) -> bool {
        self.coalesced
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Dense shape `(num_targets, num_sources)`
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Number of target cells (rows)
    pub fn num_targets(&self) -> usize {
        self.shape.0
    }

    /// Number of source cells (columns)
    pub fn num_sources(&self) -> usize {
        self.shape.1
    }

    /// Row and column index arrays
    pub fn indices(&self) -> (&[usize], &[usize]) {
        (&self.rows, &self.cols)
    }

    /// Stored values, in the current entry order
    pub fn values(&self) -> Array1<f32> {
        Array1::from(self.values.clone())
    }

    /// Swap the roles of targets and sources.
    ///
    /// The transpose of a boundary matrix is the coboundary matrix.
    pub fn transpose(&self) -> Self {
        SparseNeighborhood {
            rows: self.cols.clone(),
            cols: self.rows.clone(),
            values: self.values.clone(),
            shape: (self.shape.1, self.shape.0),
            coalesced: false,
        }
    }

    /// Build the dense matrix, summing duplicate coordinates
    pub fn to_dense(&self) -> Array2<f32> {
        let mut dense = Array2::zeros(self.shape);

        for ((&r, &c), &v) in self.rows.iter().zip(&self.cols).zip(&self.values) {
            dense[[r, c]] += v;
        }

        dense
    }
}
