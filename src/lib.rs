//! # RBM (Restricted Boltzmann Machines)
//!
//! A Restricted Boltzmann Machine with binary units, trained by contrastive
//! divergence (CD-15) with block Gibbs sampling.
//!
//! ## Overview
//!
//! The network is a bipartite graph of visible and hidden units. Training
//! alternates between sampling hidden units from data and reconstructing the
//! visible layer from those samples, then moves the weights toward the data
//! statistics and away from the reconstruction statistics:
//!
//! ```text
//! ΔW = α (dataᵀ · P(h|data) − v⁻ᵀ · P(h|v⁻))
//! ```
//!
//! ## Structure
//!
//! - [`core`] — Network parameters, Gibbs passes, gradient, random sources
//! - [`training`] — Scratch buffers, epoch loop, schedule, event sinks
//! - [`data`] — Binary dataset parsing and generation
//! - [`display`] — Fixed/scientific rendering of matrices and traces
//! - [`utils`] — Logistic function and small math helpers

pub mod core;
pub mod data;
pub mod display;
pub mod training;
pub mod utils;

pub use crate::core::random::{FixedSequence, RandomSource, SeededSource};
pub use crate::core::{BiasInit, NetworkConfig, RBMError, RBMResult, Status, RBM};
pub use display::Notation;
pub use training::{
    EpochMetrics, EventSink, JsonlSink, MemorySink, NullSink, TrainEvent, TrainingReport,
    TrainingScratch, GIBBS_STEPS,
};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Network and initialization settings.
///
/// Used by [`RBM::from_config`]; loadable from JSON with missing fields
/// taking their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hidden: usize,
    pub visible: usize,
    pub learning_rate: f64,
    pub std_dev: f64,
    pub bias_init: BiasInit,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hidden: 2,
            visible: 6,
            learning_rate: 0.1,
            std_dev: crate::core::DEFAULT_STD_DEV,
            bias_init: BiasInit::ZeroBias,
        }
    }
}

/// A config with every field optional, used to layer file values under
/// command-line flags.
///
/// Fields left as `None` fall through to the layer below; see [`merge`] and
/// [`resolve`].
///
/// [`merge`]: PartialConfig::merge
/// [`resolve`]: PartialConfig::resolve
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialConfig {
    pub hidden: Option<usize>,
    pub visible: Option<usize>,
    pub learning_rate: Option<f64>,
    pub std_dev: Option<f64>,
    pub bias_init: Option<BiasInit>,
}

impl PartialConfig {
    /// Read a JSON config file. Absent fields stay `None`.
    ///
    /// # Errors
    /// - `InvalidConfig` if the file cannot be read or parsed
    pub fn from_json_file(path: &Path) -> RBMResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            RBMError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn from_json_str(json: &str) -> RBMResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| RBMError::InvalidConfig(format!("failed to parse config: {e}")))
    }

    /// Overlay `over` on `self`; fields set in `over` win.
    pub fn merge(self, over: PartialConfig) -> PartialConfig {
        PartialConfig {
            hidden: over.hidden.or(self.hidden),
            visible: over.visible.or(self.visible),
            learning_rate: over.learning_rate.or(self.learning_rate),
            std_dev: over.std_dev.or(self.std_dev),
            bias_init: over.bias_init.or(self.bias_init),
        }
    }

    /// Fill unset fields from [`Config::default`], except `visible`, which
    /// falls back to the dataset width.
    pub fn resolve(self, data_width: usize) -> Config {
        let defaults = Config::default();
        Config {
            hidden: self.hidden.unwrap_or(defaults.hidden),
            visible: self.visible.unwrap_or(data_width),
            learning_rate: self.learning_rate.unwrap_or(defaults.learning_rate),
            std_dev: self.std_dev.unwrap_or(defaults.std_dev),
            bias_init: self.bias_init.unwrap_or(defaults.bias_init),
        }
    }
}
