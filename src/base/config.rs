//! Configuration shared by message passing layers

use super::{Aggregation, Initialization};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Options controlling initialization and aggregation of a message passing layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagePassingConfig {
    /// Weight initialization scheme, `"xavier_uniform"` or `"xavier_normal"`.
    ///
    /// Kept as a name so that an unknown scheme is reported when the weights
    /// are (re)initialized.
    pub initialization: String,
    /// Scale factor applied to the initialization range
    pub initialization_gain: f32,
    /// Average incoming messages instead of summing them
    pub aggr_norm: bool,
    /// Random seed for reproducible initialization
    pub seed: Option<u64>,
    /// Print a line per propagation
    pub verbose: bool,
}

impl Default for MessagePassingConfig {
    fn default() -> Self {
        MessagePassingConfig {
            initialization: Initialization::XavierUniform.as_str().to_string(),
            initialization_gain: 1.0,
            aggr_norm: false,
            seed: None,
            verbose: false,
        }
    }
}

impl MessagePassingConfig {
    /// Set the initialization scheme by name
    pub fn with_initialization(mut self, name: &str) -> Self {
        self.initialization = name.to_string();
        self
    }

    /// Set the initialization gain
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.initialization_gain = gain;
        self
    }

    /// Enable or disable mean aggregation
    pub fn with_aggr_norm(mut self, aggr_norm: bool) -> Self {
        self.aggr_norm = aggr_norm;
        self
    }

    /// Fix the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable per-call diagnostics
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Parse the configured initialization scheme
    pub fn parsed_initialization(&self) -> Result<Initialization> {
        self.initialization.parse()
    }

    /// Aggregation implied by `aggr_norm`
    pub fn aggregation(&self) -> Aggregation {
        if self.aggr_norm {
            Aggregation::Mean
        } else {
            Aggregation::Sum
        }
    }

    /// Copy of this config whose seed is shifted by `offset`.
    ///
    /// Sub-layers of a composite layer use distinct offsets so that seeded
    /// weights differ between them.
    pub fn derive(&self, offset: u64) -> Self {
        let mut config = self.clone();
        config.seed = self.seed.map(|s| s.wrapping_add(offset));
        config
    }
}
