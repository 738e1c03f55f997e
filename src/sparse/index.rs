//! Per-edge index vectors extracted from a coalesced neighborhood

use super::SparseNeighborhood;
use crate::{Result, TopoError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Target and source cell of every nonzero neighborhood entry.
///
/// Edge `k` carries a message from source cell `source_index_j[k]` to target
/// cell `target_index_i[k]`, weighted by `values[k]`. The three vectors have
/// equal length and every index lies inside the shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawIndex")]
pub struct NeighborhoodIndex {
    target_index_i: Vec<usize>,
    source_index_j: Vec<usize>,
    values: Array1<f32>,
    num_targets: usize,
    num_sources: usize,
}

/// Unchecked serialized form
#[derive(Deserialize)]
struct RawIndex {
    target_index_i: Vec<usize>,
    source_index_j: Vec<usize>,
    values: Array1<f32>,
    num_targets: usize,
    num_sources: usize,
}

impl TryFrom<RawIndex> for NeighborhoodIndex {
    type Error = TopoError;

    fn try_from(raw: RawIndex) -> Result<Self> {
        NeighborhoodIndex::with_values(
            raw.target_index_i,
            raw.source_index_j,
            raw.values,
            (raw.num_targets, raw.num_sources),
        )
    }
}

impl NeighborhoodIndex {
    /// Create from explicit index vectors with unit edge weights
    pub fn new(
        target_index_i: Vec<usize>,
        source_index_j: Vec<usize>,
        shape: (usize, usize),
    ) -> Result<Self> {
        let values = Array1::ones(target_index_i.len());
        Self::with_values(target_index_i, source_index_j, values, shape)
    }

    /// Create from explicit index vectors and edge weights
    pub fn with_values(
        target_index_i: Vec<usize>,
        source_index_j: Vec<usize>,
        values: Array1<f32>,
        shape: (usize, usize),
    ) -> Result<Self> {
        if target_index_i.len() != source_index_j.len() || target_index_i.len() != values.len() {
            return Err(TopoError::LengthMismatch(format!(
                "{} targets, {} sources, {} values",
                target_index_i.len(),
                source_index_j.len(),
                values.len()
            )));
        }
        check_bounds(&target_index_i, shape.0)?;
        check_bounds(&source_index_j, shape.1)?;

        Ok(NeighborhoodIndex {
            target_index_i,
            source_index_j,
            values,
            num_targets: shape.0,
            num_sources: shape.1,
        })
    }

    /// Coalesce the neighborhood and read its coordinates
    pub fn from_neighborhood(neighborhood: &SparseNeighborhood) -> Self {
        let coalesced = neighborhood.coalesce();
        let (rows, cols) = coalesced.indices();

        NeighborhoodIndex {
            target_index_i: rows.to_vec(),
            source_index_j: cols.to_vec(),
            values: coalesced.values(),
            num_targets: coalesced.num_targets(),
            num_sources: coalesced.num_sources(),
        }
    }

    /// Target cell of each edge (row index)
    pub fn target_index_i(&self) -> &[usize] {
        &self.target_index_i
    }

    /// Source cell of each edge (column index)
    pub fn source_index_j(&self) -> &[usize] {
        &self.source_index_j
    }

    /// Edge weights, aligned with the index vectors
    pub fn values(&self) -> &Array1<f32> {
        &self.values
    }

    /// Number of target cells
    pub fn num_targets(&self) -> usize {
        self.num_targets
    }

    /// Number of source cells
    pub fn num_sources(&self) -> usize {
        self.num_sources
    }

    /// Number of edges
    pub fn num_edges(&self) -> usize {
        self.target_index_i.len()
    }
}

fn check_bounds(index: &[usize], bound: usize) -> Result<()> {
    match index.iter().find(|&&i| i >= bound) {
        Some(&index) => Err(TopoError::IndexOutOfBounds { index, bound }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_neighborhood_is_coalesced() {
        let n = SparseNeighborhood::new(
            vec![2, 0, 0, 2],
            vec![1, 1, 0, 1],
            vec![1.0, 2.0, 3.0, 4.0],
            (3, 2),
        )
        .unwrap();
        let index = NeighborhoodIndex::from_neighborhood(&n);

        assert_eq!(index.target_index_i(), &[0, 0, 2]);
        assert_eq!(index.source_index_j(), &[0, 1, 1]);
        assert_eq!(index.values(), &array![3.0, 2.0, 5.0]);
        assert_eq!(index.num_edges(), 3);
        assert_eq!((index.num_targets(), index.num_sources()), (3, 2));
    }

    #[test]
    fn test_new_rejects_bad_indices() {
        assert!(NeighborhoodIndex::new(vec![0, 1], vec![0], (2, 2)).is_err());
        assert!(matches!(
            NeighborhoodIndex::new(vec![0, 4], vec![0, 1], (2, 2)),
            Err(TopoError::IndexOutOfBounds { index: 4, bound: 2 })
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        let index = NeighborhoodIndex::new(vec![1, 0], vec![0, 1], (2, 2)).unwrap();
        let json = serde_json::to_string(&index).unwrap();
        let back: NeighborhoodIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, index);

        // Two edges but three weights
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["values"] = serde_json::from_str(r#"{"v":1,"dim":[3],"data":[1.0,1.0,1.0]}"#).unwrap();
        assert!(serde_json::from_value::<NeighborhoodIndex>(value).is_err());

        // Target outside the shape
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["target_index_i"] = serde_json::json!([1, 7]);
        assert!(serde_json::from_value::<NeighborhoodIndex>(value).is_err());
    }
}
