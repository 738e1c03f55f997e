//! Sparse neighborhood structures for topological domains
//!
//! A neighborhood relates `num_targets` cells to `num_sources` cells, e.g. the
//! boundary matrix from edges to nodes or the upper adjacency of faces.

mod coo;
mod index;

pub use coo::SparseNeighborhood;
pub use index::NeighborhoodIndex;
