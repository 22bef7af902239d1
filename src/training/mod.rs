//! Training loop pieces: per-run scratch, the CD-k epoch, the learning-rate
//! schedule, and run metrics.
//!
//! ## One epoch
//!
//! ```text
//! repeat GIBBS_STEPS times (each pass overwrites the last):
//!     h⁺ = σ(data · W)            sample s ~ Bernoulli(h⁺)
//!     v⁻ = σ(s · Wᵀ)              h⁻ = σ(v⁻ · W)
//! α   = schedule(epoch)
//! W  += α (dataᵀ h⁺ − v⁻ᵀ h⁻)
//! err = Σ (data − v⁻)²
//! ```

pub mod events;

use crate::core::gibbs::{
    compute_probs, force_visible_bias, negative_hidden_activations, negative_visible_activations,
    positive_hidden_activations, sample_hidden_states,
};
use crate::core::gradient::{
    apply_weight_update, negative_associations, positive_associations, reconstruction_error,
};
use crate::core::matrix::zeros;
use crate::core::random::RandomSource;
use crate::core::{RBMError, RBMResult};
use ndarray::{s, Array2};
use std::time::Duration;

pub use events::{EventSink, JsonlSink, MemorySink, NullSink, TrainEvent};

/// Gibbs alternations per epoch (CD-15).
pub const GIBBS_STEPS: usize = 15;

/// Learning rate once `epoch ≥ 0.75 · epochs`.
pub const LATE_LEARNING_RATE: f64 = 0.32;

/// Learning rate of the second schedule branch. The branch sits behind the
/// 0.75 test and never fires.
pub const FINAL_LEARNING_RATE: f64 = 0.42;

/// Learning rate to use for `epoch` of `epochs`, given the rate in effect.
pub fn scheduled_learning_rate(epoch: usize, epochs: usize, current: f64) -> f64 {
    let epoch = epoch as f64;
    let epochs = epochs as f64;
    if epoch >= 0.75 * epochs {
        LATE_LEARNING_RATE
    } else if epoch >= 0.95 * epochs {
        FINAL_LEARNING_RATE
    } else {
        current
    }
}

/// Every derived matrix of one training run.
///
/// Allocated once per `train` call from the stored dataset, overwritten in
/// place every Gibbs pass. Nothing here is meaningful across epochs.
#[derive(Debug, Clone)]
pub struct TrainingScratch {
    /// Dataset with the bias column prepended, shape (R, V+1)
    pub data: Array2<f64>,
    pub pos_hidden_activations: Array2<f64>,
    pub pos_hidden_probs: Array2<f64>,
    /// Sampled binary hidden states, shape (R, H+1)
    pub pos_hidden_states: Array2<f64>,
    pub neg_visible_activations: Array2<f64>,
    pub neg_visible_probs: Array2<f64>,
    pub neg_hidden_activations: Array2<f64>,
    pub neg_hidden_probs: Array2<f64>,
    /// dataᵀ · pos_hidden_probs, shape (V+1, H+1)
    pub pos_associations: Array2<f64>,
    /// neg_visible_probsᵀ · neg_hidden_probs, shape (V+1, H+1)
    pub neg_associations: Array2<f64>,
}

impl TrainingScratch {
    /// Augment `dataset` (R × V) with a constant-1 bias column and allocate
    /// the remaining matrices for `hidden` hidden units.
    ///
    /// # Errors
    /// - `DimensionMismatch` if `dataset` does not have `visible` columns
    pub fn new(dataset: &Array2<f64>, visible: usize, hidden: usize) -> RBMResult<Self> {
        if dataset.ncols() != visible {
            return Err(RBMError::DimensionMismatch(format!(
                "dataset has {} columns, network has {} visible units",
                dataset.ncols(),
                visible
            )));
        }
        let rows = dataset.nrows();

        let mut data = Array2::ones((rows, visible + 1));
        data.slice_mut(s![.., 1..]).assign(dataset);

        Ok(Self {
            data,
            pos_hidden_activations: zeros(rows, hidden + 1),
            pos_hidden_probs: zeros(rows, hidden + 1),
            pos_hidden_states: zeros(rows, hidden + 1),
            neg_visible_activations: zeros(rows, visible + 1),
            neg_visible_probs: zeros(rows, visible + 1),
            neg_hidden_activations: zeros(rows, hidden + 1),
            neg_hidden_probs: zeros(rows, hidden + 1),
            pos_associations: zeros(visible + 1, hidden + 1),
            neg_associations: zeros(visible + 1, hidden + 1),
        })
    }

    /// Number of training rows.
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// (name, rows, cols) of every scratch matrix, for lifecycle logging.
    pub fn shapes(&self) -> Vec<(&'static str, usize, usize)> {
        let entries: [(&'static str, &Array2<f64>); 10] = [
            ("data_with_bias", &self.data),
            ("pos_hidden_activations", &self.pos_hidden_activations),
            ("pos_hidden_probs", &self.pos_hidden_probs),
            ("pos_hidden_states", &self.pos_hidden_states),
            ("neg_visible_activations", &self.neg_visible_activations),
            ("neg_visible_probs", &self.neg_visible_probs),
            ("neg_hidden_activations", &self.neg_hidden_activations),
            ("neg_hidden_probs", &self.neg_hidden_probs),
            ("pos_associations", &self.pos_associations),
            ("neg_associations", &self.neg_associations),
        ];
        entries
            .iter()
            .map(|(name, m)| (*name, m.nrows(), m.ncols()))
            .collect()
    }
}

/// Run one Gibbs alternation: positive hidden pass, sample, reconstruct,
/// negative hidden pass.
pub fn gibbs_step(
    weights: &Array2<f64>,
    scratch: &mut TrainingScratch,
    rng: &mut dyn RandomSource,
) -> RBMResult<()> {
    positive_hidden_activations(&scratch.data, weights, &mut scratch.pos_hidden_activations)?;
    compute_probs(&scratch.pos_hidden_activations, &mut scratch.pos_hidden_probs)?;
    sample_hidden_states(&scratch.pos_hidden_probs, rng, &mut scratch.pos_hidden_states)?;

    // The logistic below rewrites column 0 as well.
    force_visible_bias(&mut scratch.neg_visible_probs);
    negative_visible_activations(
        &scratch.pos_hidden_states,
        weights,
        &mut scratch.neg_visible_activations,
    )?;
    compute_probs(&scratch.neg_visible_activations, &mut scratch.neg_visible_probs)?;

    negative_hidden_activations(
        &scratch.neg_visible_probs,
        weights,
        &mut scratch.neg_hidden_activations,
    )?;
    compute_probs(&scratch.neg_hidden_activations, &mut scratch.neg_hidden_probs)?;
    Ok(())
}

/// Run `steps` Gibbs alternations; only the last one survives in `scratch`.
pub fn gibbs_chain(
    weights: &Array2<f64>,
    scratch: &mut TrainingScratch,
    rng: &mut dyn RandomSource,
    steps: usize,
) -> RBMResult<()> {
    for _ in 0..steps {
        gibbs_step(weights, scratch, rng)?;
    }
    Ok(())
}

/// Gradient step for the state left in `scratch` by the chain; returns the
/// epoch's reconstruction error.
pub fn contrastive_update(
    weights: &mut Array2<f64>,
    scratch: &mut TrainingScratch,
    alpha: f64,
) -> RBMResult<f64> {
    positive_associations(&scratch.data, &scratch.pos_hidden_probs, &mut scratch.pos_associations)?;
    negative_associations(
        &scratch.neg_visible_probs,
        &scratch.neg_hidden_probs,
        &mut scratch.neg_associations,
    )?;
    apply_weight_update(weights, &scratch.pos_associations, &scratch.neg_associations, alpha)?;
    reconstruction_error(&scratch.data, &scratch.neg_visible_probs)
}

/// Metrics for a single epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochMetrics {
    pub epoch: usize,
    /// Learning rate used for this epoch's update
    pub learning_rate: f64,
    /// Total squared reconstruction error
    pub error: f64,
}

/// Train one epoch: CD-k chain, schedule, update, error.
pub fn train_epoch(
    weights: &mut Array2<f64>,
    scratch: &mut TrainingScratch,
    rng: &mut dyn RandomSource,
    epoch: usize,
    epochs: usize,
    learning_rate: f64,
) -> RBMResult<EpochMetrics> {
    gibbs_chain(weights, scratch, rng, GIBBS_STEPS)?;
    let learning_rate = scheduled_learning_rate(epoch, epochs, learning_rate);
    let error = contrastive_update(weights, scratch, learning_rate)?;
    Ok(EpochMetrics {
        epoch,
        learning_rate,
        error,
    })
}

/// Summary of a finished `train` call.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub epochs: usize,
    /// Per-epoch reconstruction error, same as the network's error trace
    pub errors: Vec<f64>,
    /// Learning rate in effect after the last epoch
    pub final_learning_rate: f64,
    pub elapsed: Duration,
}

impl TrainingReport {
    /// Error of the last epoch.
    pub fn final_error(&self) -> Option<f64> {
        self.errors.last().copied()
    }

    /// Mean error across all epochs.
    pub fn mean_error(&self) -> Option<f64> {
        crate::utils::mean(&self.errors)
    }
}
