//! Block Gibbs passes: activations, logistic probabilities, and Bernoulli
//! sampling of the hidden layer.
//!
//! ## Shapes
//!
//! ```text
//! data, neg visible probs   R × (V+1)
//! weights                   (V+1) × (H+1)
//! hidden probs / states     R × (H+1)
//! ```
//!
//! Column 0 of every visible matrix and row 0 of the weights belong to the
//! bias unit.

use super::matrix::{fill, mat_mul_into, mat_mul_transposed_into};
use super::random::RandomSource;
use super::{RBMError, RBMResult};
use crate::utils::logistic_in_place;
use ndarray::{s, Array2};

/// Positive phase: `out[r][h] = Σ_v data[r][v] · w[v][h]`.
pub fn positive_hidden_activations(
    data: &Array2<f64>,
    weights: &Array2<f64>,
    out: &mut Array2<f64>,
) -> RBMResult<()> {
    mat_mul_into(data, weights, out)
}

/// Reconstruction: `out[r][v] = Σ_h state[r][h] · w[v][h]`.
pub fn negative_visible_activations(
    hidden_states: &Array2<f64>,
    weights: &Array2<f64>,
    out: &mut Array2<f64>,
) -> RBMResult<()> {
    mat_mul_transposed_into(hidden_states, weights, out)
}

/// Negative phase: same product as the positive pass, driven by the
/// reconstructed visible probabilities.
pub fn negative_hidden_activations(
    neg_visible_probs: &Array2<f64>,
    weights: &Array2<f64>,
    out: &mut Array2<f64>,
) -> RBMResult<()> {
    mat_mul_into(neg_visible_probs, weights, out)
}

/// `probs = logistic(activations)`, element-wise.
pub fn compute_probs(activations: &Array2<f64>, probs: &mut Array2<f64>) -> RBMResult<()> {
    if activations.dim() != probs.dim() {
        return Err(RBMError::DimensionMismatch(format!(
            "activations are {:?}, probabilities are {:?}",
            activations.dim(),
            probs.dim()
        )));
    }
    probs.assign(activations);
    logistic_in_place(probs);
    Ok(())
}

/// Clamp the bias column (column 0) of a visible matrix to 1.
pub fn force_visible_bias(probs: &mut Array2<f64>) {
    if probs.ncols() > 0 {
        fill(&mut probs.slice_mut(s![.., ..1]), 1.0);
    }
}

/// Bernoulli-sample hidden states: `out[r][h] = 1` iff `probs[r][h] > u`,
/// with one fresh draw `u ~ U(0,1)` per cell in row-major order.
pub fn sample_hidden_states(
    probs: &Array2<f64>,
    rng: &mut dyn RandomSource,
    out: &mut Array2<f64>,
) -> RBMResult<()> {
    if probs.dim() != out.dim() {
        return Err(RBMError::DimensionMismatch(format!(
            "probabilities are {:?}, states are {:?}",
            probs.dim(),
            out.dim()
        )));
    }
    for (state, &p) in out.iter_mut().zip(probs.iter()) {
        *state = if p > rng.uniform(0.0, 1.0) { 1.0 } else { 0.0 };
    }
    Ok(())
}
