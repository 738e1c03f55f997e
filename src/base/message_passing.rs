//! The message passing primitive shared by all topological layers

use super::init::make_rng;
use super::scatter::{gather_rows, scatter};
use super::{Aggregation, Identity, Message, MessagePassingConfig};
use crate::sparse::{NeighborhoodIndex, SparseNeighborhood};
use crate::{Result, TopoError};
use ndarray::{Array2, Array3, Axis};
use rand::rngs::StdRng;

/// Gather, message, weight and aggregate over a sparse neighborhood.
///
/// For a neighborhood `N` of shape `[num_targets, num_sources]` and features
/// `x` of shape `[num_sources, channels]`, the output row of target `i` is
///
/// ```text
/// out_i = AGG_{j : N[i, j] != 0} N[i, j] * message(x)_j
/// ```
///
/// where `AGG` is a sum, or a mean when `aggr_norm` is set.
///
/// `propagate` records the coalesced target and source index vectors of the
/// last neighborhood it saw; `get_x_i`, `sparsify_message` and `aggregate`
/// read that state. [`MessagePassing::propagate_with_index`] is the stateless
/// form taking the index explicitly.
#[derive(Clone, Debug)]
pub struct MessagePassing<M: Message = Identity> {
    config: MessagePassingConfig,
    weight: Option<Array2<f32>>,
    index: Option<NeighborhoodIndex>,
    message_fn: M,
    rng: StdRng,
}

impl MessagePassing<Identity> {
    /// Primitive with the identity message
    pub fn new(config: MessagePassingConfig) -> Self {
        Self::with_message(config, Identity)
    }
}

impl Default for MessagePassing<Identity> {
    fn default() -> Self {
        Self::new(MessagePassingConfig::default())
    }
}

impl<M: Message> MessagePassing<M> {
    /// Primitive calling `message_fn` to build messages
    pub fn with_message(config: MessagePassingConfig, message_fn: M) -> Self {
        let rng = make_rng(config.seed);
        MessagePassing {
            config,
            weight: None,
            index: None,
            message_fn,
            rng,
        }
    }

    /// Attach a learnable weight of shape `[in_channels, out_channels]`
    pub fn with_weight(mut self, weight: Array2<f32>) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &MessagePassingConfig {
        &self.config
    }

    /// Learnable weight, if any
    pub fn weight(&self) -> Option<&Array2<f32>> {
        self.weight.as_ref()
    }

    /// Replace the learnable weight
    pub fn set_weight(&mut self, weight: Array2<f32>) {
        self.weight = Some(weight);
    }

    /// Change the initialization scheme used by the next `reset_parameters`.
    ///
    /// The name is not checked here.
    pub fn set_initialization(&mut self, name: &str) {
        self.config.initialization = name.to_string();
    }

    /// Switch between sum and mean aggregation
    pub fn set_aggr_norm(&mut self, aggr_norm: bool) {
        self.config.aggr_norm = aggr_norm;
    }

    /// Aggregation currently in effect
    pub fn aggregation(&self) -> Aggregation {
        self.config.aggregation()
    }

    /// Index state recorded by the last `propagate`
    pub fn index(&self) -> Option<&NeighborhoodIndex> {
        self.index.as_ref()
    }

    /// Install index state directly
    pub fn set_index(&mut self, index: NeighborhoodIndex) {
        self.index = Some(index);
    }

    /// Target cell of every edge from the last `propagate`
    pub fn target_index_i(&self) -> Option<&[usize]> {
        self.index.as_ref().map(|idx| idx.target_index_i())
    }

    /// Source cell of every edge from the last `propagate`
    pub fn source_index_j(&self) -> Option<&[usize]> {
        self.index.as_ref().map(|idx| idx.source_index_j())
    }

    /// Re-initialize the weight in place with the configured scheme.
    ///
    /// Fails with [`TopoError::Initialization`] for an unknown scheme, before
    /// the weight is touched. Without a weight this only validates the scheme.
    pub fn reset_parameters(&mut self, gain: f32) -> Result<()> {
        let scheme = self.config.parsed_initialization()?;
        if let Some(weight) = self.weight.as_mut() {
            scheme.fill(weight, gain, &mut self.rng)?;
        }
        Ok(())
    }

    /// Per-cell messages, `[num_source, out_channels]`
    pub fn message(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        self.message_fn.message(x, self.weight.as_ref())
    }

    /// Coalesce `neighborhood`, record its index vectors and aggregate the
    /// weighted messages onto the target cells.
    ///
    /// Returns `[num_targets, out_channels]`.
    pub fn propagate(&mut self, x: &Array2<f32>, neighborhood: &SparseNeighborhood) -> Result<Array2<f32>> {
        check_sources(x, neighborhood.num_sources())?;

        let index = NeighborhoodIndex::from_neighborhood(neighborhood);
        self.index = Some(index.clone());
        self.propagate_with_index(x, &index)
    }

    /// Stateless propagation over an already extracted index
    pub fn propagate_with_index(&self, x: &Array2<f32>, index: &NeighborhoodIndex) -> Result<Array2<f32>> {
        check_sources(x, index.num_sources())?;

        let x_message = self.message(x)?;
        check_sources(&x_message, index.num_sources())?;

        let x_edges = gather_rows(x_message.view(), index.source_index_j())?;
        let values = index.values();
        if values.len() != x_edges.nrows() {
            return Err(TopoError::LengthMismatch(format!(
                "{} edges, {} values",
                x_edges.nrows(),
                values.len()
            )));
        }
        let weighted = x_edges * &values.view().insert_axis(Axis(1));
        let out = scatter(weighted.view(), index.target_index_i(), index.num_targets(), self.aggregation())?;

        if self.config.verbose {
            println!(
                "propagate: {} edges, {} -> {} cells, {} channels, {:?}",
                index.num_edges(),
                index.num_sources(),
                index.num_targets(),
                out.ncols(),
                self.aggregation()
            );
        }

        Ok(out)
    }

    /// Rows of `x` at the target cell of every edge, `[num_edges, channels]`
    pub fn get_x_i(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        let target = self
            .target_index_i()
            .ok_or(TopoError::MissingIndexState("target_index_i"))?;
        gather_rows(x.view(), target)
    }

    /// [`get_x_i`](Self::get_x_i) applied to every matrix of a batch `[batch, cells, channels]`
    pub fn get_x_i_batched(&self, x: &Array3<f32>) -> Result<Array3<f32>> {
        let target = self
            .target_index_i()
            .ok_or(TopoError::MissingIndexState("target_index_i"))?;
        let cells = x.len_of(Axis(1));
        if let Some(&index) = target.iter().find(|&&i| i >= cells) {
            return Err(TopoError::IndexOutOfBounds { index, bound: cells });
        }
        Ok(x.select(Axis(1), target))
    }

    /// Repeat each source row once per edge it sends along, `[num_edges, channels]`
    pub fn sparsify_message(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        let source = self
            .source_index_j()
            .ok_or(TopoError::MissingIndexState("source_index_j"))?;
        gather_rows(x.view(), source)
    }

    /// Reduce per-edge messages onto their target cells, `[num_targets, channels]`
    pub fn aggregate(&self, x_message: &Array2<f32>) -> Result<Array2<f32>> {
        let index = self
            .index
            .as_ref()
            .ok_or(TopoError::MissingIndexState("target_index_i"))?;
        scatter(x_message.view(), index.target_index_i(), index.num_targets(), self.aggregation())
    }

    /// Forward pass; the same as [`propagate`](Self::propagate)
    pub fn forward(&mut self, x: &Array2<f32>, neighborhood: &SparseNeighborhood) -> Result<Array2<f32>> {
        self.propagate(x, neighborhood)
    }
}

fn check_sources(x: &Array2<f32>, num_sources: usize) -> Result<()> {
    if x.nrows() != num_sources {
        return Err(TopoError::DimensionMismatch {
            context: "neighborhood source cells",
            expected: num_sources,
            found: x.nrows(),
        });
    }
    Ok(())
}
