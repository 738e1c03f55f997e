//! Weighted convolution over a neighborhood

use crate::base::{Linear, MessagePassing, MessagePassingConfig};
use crate::sparse::SparseNeighborhood;
use crate::{Result, TopoError};
use ndarray::Array2;

/// Convolution `N · x · W` between two ranks of a complex.
///
/// Messages are the source features multiplied by a learnable weight of shape
/// `[in_channels, out_channels]`; they are then weighted by the neighborhood
/// and aggregated onto the target cells.
#[derive(Clone, Debug)]
pub struct Conv {
    inner: MessagePassing<Linear>,
    in_channels: usize,
    out_channels: usize,
}

impl Conv {
    /// Create a convolution and initialize its weight
    pub fn new(in_channels: usize, out_channels: usize, config: MessagePassingConfig) -> Result<Self> {
        let gain = config.initialization_gain;
        let mut inner = MessagePassing::with_message(config, Linear)
            .with_weight(Array2::zeros((in_channels, out_channels)));
        inner.reset_parameters(gain)?;

        Ok(Conv {
            inner,
            in_channels,
            out_channels,
        })
    }

    /// Input feature dimension
    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    /// Output feature dimension
    pub fn out_channels(&self) -> usize {
        self.out_channels
    }

    /// Learnable weight `[in_channels, out_channels]`
    pub fn weight(&self) -> Option<&Array2<f32>> {
        self.inner.weight()
    }

    /// Draw a new weight with the configured scheme and gain
    pub fn reset_parameters(&mut self) -> Result<()> {
        let gain = self.inner.config().initialization_gain;
        self.inner.reset_parameters(gain)
    }

    /// Convolve source features onto target cells, `[num_targets, out_channels]`
    pub fn forward(&mut self, x: &Array2<f32>, neighborhood: &SparseNeighborhood) -> Result<Array2<f32>> {
        if x.ncols() != self.in_channels {
            return Err(TopoError::DimensionMismatch {
                context: "conv input channels",
                expected: self.in_channels,
                found: x.ncols(),
            });
        }
        self.inner.forward(x, neighborhood)
    }
}
