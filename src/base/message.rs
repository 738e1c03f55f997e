//! Message functions applied to cell features before aggregation

use crate::{Result, TopoError};
use ndarray::Array2;

/// Transformation of per-cell features into per-cell messages.
///
/// Takes `[num_source, in_channels]` and returns `[num_source, out_channels]`.
/// The layer's weight, if any, is passed in. The default is the identity.
pub trait Message {
    /// Compute messages for every source cell
    fn message(&self, x: &Array2<f32>, weight: Option<&Array2<f32>>) -> Result<Array2<f32>> {
        let _ = weight;
        Ok(x.clone())
    }
}

/// Passes features through unchanged
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Identity;

impl Message for Identity {}

/// Multiplies features by the layer weight, `x · W`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Linear;

impl Message for Linear {
    fn message(&self, x: &Array2<f32>, weight: Option<&Array2<f32>>) -> Result<Array2<f32>> {
        let weight = weight.ok_or(TopoError::MissingWeight)?;
        if x.ncols() != weight.nrows() {
            return Err(TopoError::DimensionMismatch {
                context: "message weight",
                expected: weight.nrows(),
                found: x.ncols(),
            });
        }
        Ok(x.dot(weight))
    }
}

/// Message given by a plain function of the features
#[derive(Clone, Copy, Debug)]
pub struct FnMessage<F>(pub F);

impl<F> Message for FnMessage<F>
where
    F: Fn(&Array2<f32>) -> Array2<f32>,
{
    fn message(&self, x: &Array2<f32>, _weight: Option<&Array2<f32>>) -> Result<Array2<f32>> {
        Ok((self.0)(x))
    }
}
