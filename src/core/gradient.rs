//! Contrastive-divergence gradient: associations, the weight update, and the
//! reconstruction error.
//!
//! ```text
//! pos = dataᵀ · pos_hidden_probs          (V+1) × (H+1)
//! neg = neg_visible_probsᵀ · neg_hidden_probs
//! W  += α (pos − neg)
//! ```

use super::matrix::transposed_mat_mul_into;
use super::{RBMError, RBMResult};
use ndarray::{Array2, Zip};

/// `out[v][h] = Σ_r data[r][v] · pos_hidden_probs[r][h]`
pub fn positive_associations(
    data: &Array2<f64>,
    pos_hidden_probs: &Array2<f64>,
    out: &mut Array2<f64>,
) -> RBMResult<()> {
    transposed_mat_mul_into(data, pos_hidden_probs, out)
}

/// `out[v][h] = Σ_r neg_visible_probs[r][v] · neg_hidden_probs[r][h]`
pub fn negative_associations(
    neg_visible_probs: &Array2<f64>,
    neg_hidden_probs: &Array2<f64>,
    out: &mut Array2<f64>,
) -> RBMResult<()> {
    transposed_mat_mul_into(neg_visible_probs, neg_hidden_probs, out)
}

/// `w[v][h] += alpha · (pos[v][h] − neg[v][h])` over every cell, bias row and
/// column included.
pub fn apply_weight_update(
    weights: &mut Array2<f64>,
    pos: &Array2<f64>,
    neg: &Array2<f64>,
    alpha: f64,
) -> RBMResult<()> {
    if weights.dim() != pos.dim() || weights.dim() != neg.dim() {
        return Err(RBMError::DimensionMismatch(format!(
            "weights {:?}, positive associations {:?}, negative associations {:?}",
            weights.dim(),
            pos.dim(),
            neg.dim()
        )));
    }
    Zip::from(weights)
        .and(pos)
        .and(neg)
        .for_each(|w, &p, &n| *w += alpha * (p - n));
    Ok(())
}

/// Total squared reconstruction error `Σ_{r,v} (data[r][v] − probs[r][v])²`
/// over the augmented matrix, bias column included.
pub fn reconstruction_error(data: &Array2<f64>, neg_visible_probs: &Array2<f64>) -> RBMResult<f64> {
    if data.dim() != neg_visible_probs.dim() {
        return Err(RBMError::DimensionMismatch(format!(
            "data is {:?}, reconstruction is {:?}",
            data.dim(),
            neg_visible_probs.dim()
        )));
    }
    Ok(data
        .iter()
        .zip(neg_visible_probs.iter())
        .map(|(&d, &p)| (d - p) * (d - p))
        .sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_positive_associations_outer_product_sum() {
        let data = array![[1.0, 1.0, 0.0], [1.0, 0.0, 1.0]];
        let probs = array![[0.5, 0.25], [0.5, 0.75]];
        let mut out = Array2::zeros((3, 2));
        positive_associations(&data, &probs, &mut out).unwrap();
        assert_eq!(out, array![[1.0, 1.0], [0.5, 0.25], [0.5, 0.75]]);
    }

    #[test]
    fn test_update_touches_bias_cells() {
        let mut w = Array2::zeros((2, 2));
        let pos = array![[1.0, 1.0], [1.0, 1.0]];
        let neg = array![[0.5, 0.5], [0.5, 0.5]];
        apply_weight_update(&mut w, &pos, &neg, 0.1).unwrap();
        for &v in w.iter() {
            assert_abs_diff_eq!(v, 0.05, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_update_rejects_shape_mismatch() {
        let mut w = Array2::zeros((2, 2));
        let before = w.clone();
        let pos = Array2::zeros((2, 3));
        let neg = Array2::zeros((2, 2));
        assert!(apply_weight_update(&mut w, &pos, &neg, 0.1).is_err());
        assert_eq!(w, before);
    }

    #[test]
    fn test_reconstruction_error() {
        let data = array![[1.0, 1.0, 0.0]];
        let probs = array![[0.5, 0.5, 0.5]];
        assert_abs_diff_eq!(reconstruction_error(&data, &probs).unwrap(), 0.75, epsilon = 1e-12);
        assert_eq!(reconstruction_error(&data, &data).unwrap(), 0.0);
    }
}
