//! Convolutional cell complex network layer

use super::Conv;
use crate::base::init::make_rng;
use crate::base::{Initialization, MessagePassingConfig};
use crate::sparse::SparseNeighborhood;
use crate::{Result, TopoError};
use ndarray::{concatenate, Array1, Array2, Axis};
use rand::rngs::StdRng;

/// Cell complex layer producing class scores from node and edge features.
///
/// Node features are convolved over the node adjacency; the two edge feature
/// sets are convolved onto the faces through the edge-to-face incidence and
/// summed. Both results pass through a ReLU, are mean-pooled over cells, and
/// the pooled vectors are concatenated and projected onto `num_classes`.
#[derive(Clone, Debug)]
pub struct ConvCxnLayer {
    conv_0_to_0: Conv,
    conv_1_to_2: Conv,
    conv_1_to_2_b: Conv,
    readout: Array2<f32>,
    initialization: Initialization,
    gain: f32,
    rng: StdRng,
    channels: usize,
    num_classes: usize,
}

impl ConvCxnLayer {
    /// Create a layer with `channels` features per cell
    pub fn new(channels: usize, num_classes: usize, config: MessagePassingConfig) -> Result<Self> {
        let conv_0_to_0 = Conv::new(channels, channels, config.derive(1))?;
        let conv_1_to_2 = Conv::new(channels, channels, config.derive(2))?;
        let conv_1_to_2_b = Conv::new(channels, channels, config.derive(3))?;

        let initialization = config.parsed_initialization()?;
        let gain = config.initialization_gain;
        let mut rng = make_rng(config.derive(4).seed);
        let mut readout = Array2::zeros((2 * channels, num_classes));
        initialization.fill(&mut readout, gain, &mut rng)?;

        Ok(ConvCxnLayer {
            conv_0_to_0,
            conv_1_to_2,
            conv_1_to_2_b,
            readout,
            initialization,
            gain,
            rng,
            channels,
            num_classes,
        })
    }

    /// Re-draw the weights of every convolution and of the readout
    pub fn reset_parameters(&mut self) -> Result<()> {
        self.conv_0_to_0.reset_parameters()?;
        self.conv_1_to_2.reset_parameters()?;
        self.conv_1_to_2_b.reset_parameters()?;
        self.initialization.fill(&mut self.readout, self.gain, &mut self.rng)
    }

    /// Readout projection, `[2 * channels, num_classes]`
    pub fn readout(&self) -> &Array2<f32> {
        &self.readout
    }

    /// Feature dimension of every cell
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of output classes
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Class scores, `[num_classes]`.
    ///
    /// Shapes: `x_0` is `[n_0, channels]`, `x_a_1` and `x_b_1` are
    /// `[n_1, channels]`, `neighborhood_0_to_0` is `[n_0, n_0]` and
    /// `neighborhood_1_to_2` is `[n_2, n_1]`.
    pub fn forward(
        &mut self,
        x_0: &Array2<f32>,
        x_a_1: &Array2<f32>,
        x_b_1: &Array2<f32>,
        neighborhood_0_to_0: &SparseNeighborhood,
        neighborhood_1_to_2: &SparseNeighborhood,
    ) -> Result<Array1<f32>> {
        if x_a_1.dim() != x_b_1.dim() {
            return Err(TopoError::DimensionMismatch {
                context: "edge feature sets",
                expected: x_a_1.nrows(),
                found: x_b_1.nrows(),
            });
        }

        let h_0 = relu(self.conv_0_to_0.forward(x_0, neighborhood_0_to_0)?);
        let h_2 = relu(
            self.conv_1_to_2.forward(x_a_1, neighborhood_1_to_2)?
                + self.conv_1_to_2_b.forward(x_b_1, neighborhood_1_to_2)?,
        );

        let pooled = concatenate(Axis(0), &[mean_pool(&h_0).view(), mean_pool(&h_2).view()])?;
        Ok(pooled.dot(&self.readout))
    }
}

fn relu(x: Array2<f32>) -> Array2<f32> {
    x.mapv_into(|v| v.max(0.0))
}

/// Row mean; zero vector for a rank with no cells
fn mean_pool(h: &Array2<f32>) -> Array1<f32> {
    h.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(h.ncols()))
}
