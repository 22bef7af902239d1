//! Math utilities: the logistic unit function and small statistics helpers.

use ndarray::{ArrayBase, DataMut, Dimension};

/// Logistic sigmoid: `1 / (1 + e^-x)`.
#[inline]
pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Replace every element of `m` by its logistic probability.
pub fn logistic_in_place<S, D>(m: &mut ArrayBase<S, D>)
where
    S: DataMut<Elem = f64>,
    D: Dimension,
{
    m.mapv_inplace(logistic);
}

/// Mean of a slice, `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
