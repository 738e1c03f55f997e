//! Weight initialization schemes.
//!
//! Both schemes follow Glorot & Bengio (2010) and scale the sampling range by
//! the layer's fan-in and fan-out:
//!
//! - Xavier uniform: U(-a, a) with a = gain * sqrt(6 / (fan_in + fan_out))
//! - Xavier normal: N(0, std) with std = gain * sqrt(2 / (fan_in + fan_out))
//!
//! For a weight of shape `[in_channels, out_channels]` the fans are the two
//! dimensions; only their sum matters.

use crate::{Result, TopoError};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recognized weight initialization schemes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initialization {
    /// Uniform Glorot initialization
    XavierUniform,
    /// Normal Glorot initialization
    XavierNormal,
}

impl Initialization {
    /// Canonical name, as accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            Initialization::XavierUniform => "xavier_uniform",
            Initialization::XavierNormal => "xavier_normal",
        }
    }

    /// Half-width of the uniform range, or the standard deviation of the normal
    pub fn scale(&self, fan_in: usize, fan_out: usize, gain: f32) -> f32 {
        let fan_sum = (fan_in + fan_out).max(1) as f32;
        match self {
            Initialization::XavierUniform => gain.abs() * (6.0 / fan_sum).sqrt(),
            Initialization::XavierNormal => gain.abs() * (2.0 / fan_sum).sqrt(),
        }
    }

    /// Overwrite every entry of `weight` with a fresh sample.
    ///
    /// The shape of `weight` is preserved.
    pub fn fill<R: Rng + ?Sized>(&self, weight: &mut Array2<f32>, gain: f32, rng: &mut R) -> Result<()> {
        if !gain.is_finite() {
            return Err(TopoError::Initialization(format!("gain must be finite, got {}", gain)));
        }
        if weight.is_empty() {
            return Ok(());
        }

        let (fan_in, fan_out) = weight.dim();
        let scale = self.scale(fan_in, fan_out, gain);
        // Uniform requires (high - low) / (1 - EPSILON) to be finite
        if !(2.0 * scale / (1.0 - f32::EPSILON)).is_finite() {
            return Err(TopoError::Initialization(format!(
                "gain {} gives a sampling range that overflows f32",
                gain
            )));
        }

        match self {
            Initialization::XavierUniform => {
                let dist = Uniform::new_inclusive(-scale, scale);
                weight.mapv_inplace(|_| dist.sample(rng));
            }
            Initialization::XavierNormal => {
                let dist = Normal::new(0.0_f32, scale)
                    .map_err(|e| TopoError::Initialization(e.to_string()))?;
                weight.mapv_inplace(|_| dist.sample(rng));
            }
        }

        Ok(())
    }
}

impl FromStr for Initialization {
    type Err = TopoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "xavier_uniform" => Ok(Initialization::XavierUniform),
            "xavier_normal" => Ok(Initialization::XavierNormal),
            other => Err(TopoError::Initialization(format!(
                "unknown scheme '{}', expected 'xavier_uniform' or 'xavier_normal'",
                other
            ))),
        }
    }
}

impl fmt::Display for Initialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seeded generator, or one drawn from system entropy
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Xavier uniform weight of the given `[fan_in, fan_out]` shape
pub fn xavier_uniform<R: Rng + ?Sized>(shape: (usize, usize), gain: f32, rng: &mut R) -> Result<Array2<f32>> {
    let mut weight = Array2::zeros(shape);
    Initialization::XavierUniform.fill(&mut weight, gain, rng)?;
    Ok(weight)
}

/// Xavier normal weight of the given `[fan_in, fan_out]` shape
pub fn xavier_normal<R: Rng + ?Sized>(shape: (usize, usize), gain: f32, rng: &mut R) -> Result<Array2<f32>> {
    let mut weight = Array2::zeros(shape);
    Initialization::XavierNormal.fill(&mut weight, gain, rng)?;
    Ok(weight)
}
