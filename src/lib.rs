//! # topo-mp: message passing on topological domains
//!
//! Building blocks for topological deep learning. Features live on the cells
//! of a cell complex, simplicial complex or hypergraph, and neighborhoods
//! (adjacency, boundary, coboundary, incidence) are sparse matrices relating
//! target cells to source cells.
//!
//! ## Features
//!
//! - **Sparse neighborhoods**: coordinate-format matrices with coalescing
//! - **Message passing**: gather, message, weight and aggregate over any neighborhood
//! - **Initialization**: Xavier uniform / normal weight schemes
//! - **Layers**: a weighted convolution and a cell-complex network layer

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Sparse neighborhood matrices and their coalesced index form
pub mod sparse;

/// The message passing primitive, its initialization and aggregation
pub mod base;

/// Neural network layers built on the message passing primitive
pub mod nn;

/// Utility functions and helpers
pub mod utils;

// Re-export commonly used types
pub use base::{
    Aggregation, Identity, Initialization, Message, MessagePassing, MessagePassingConfig,
};
pub use nn::{Conv, ConvCxnLayer};
pub use sparse::{NeighborhoodIndex, SparseNeighborhood};

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum TopoError {
    /// Unknown or unusable weight initialization scheme
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Two shapes that must agree do not
    #[error("Dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Where the mismatch was detected
        context: &'static str,
        /// Size required by the operation
        expected: usize,
        /// Size actually supplied
        found: usize,
    },

    /// Index state was read before `propagate` populated it
    #[error("Missing index state: {0} is not set, call propagate first")]
    MissingIndexState(&'static str),

    /// A weighted message was requested from a layer without a weight
    #[error("Missing weight: the layer has no learnable weight")]
    MissingWeight,

    /// A coordinate lies outside the matrix shape
    #[error("Index {index} out of bounds for dimension of size {bound}")]
    IndexOutOfBounds {
        /// Offending index
        index: usize,
        /// Size of the dimension
        bound: usize,
    },

    /// Parallel coordinate arrays have different lengths
    #[error("Length mismatch: {0}")]
    LengthMismatch(String),

    /// ndarray reshaping error
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the library
pub type Result<T> = std::result::Result<T, TopoError>;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        base::{Aggregation, Identity, Initialization, Message, MessagePassing, MessagePassingConfig},
        nn::{Conv, ConvCxnLayer},
        sparse::{NeighborhoodIndex, SparseNeighborhood},
        Result, TopoError,
    };
}
