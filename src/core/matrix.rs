//! Dense matrix primitives shared by every Gibbs pass.
//!
//! All products write into caller-owned buffers so that the training scratch
//! is allocated once per run and reused every epoch.

use super::{RBMError, RBMResult};
use ndarray::linalg::general_mat_mul;
use ndarray::{Array2, ArrayBase, ArrayView2, Data, DataMut, Ix2};

/// Allocate a zero-filled `rows × cols` matrix.
pub fn zeros(rows: usize, cols: usize) -> Array2<f64> {
    Array2::zeros((rows, cols))
}

/// Overwrite every cell of `m` with `value`.
pub fn fill<S>(m: &mut ArrayBase<S, Ix2>, value: f64)
where
    S: DataMut<Elem = f64>,
{
    m.fill(value);
}

/// `out = a · b`
///
/// # Errors
/// - `DimensionMismatch` if `a.ncols() != b.nrows()` or `out` is not
///   `a.nrows() × b.ncols()`
pub fn mat_mul_into<S1, S2, S3>(
    a: &ArrayBase<S1, Ix2>,
    b: &ArrayBase<S2, Ix2>,
    out: &mut ArrayBase<S3, Ix2>,
) -> RBMResult<()>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    S3: DataMut<Elem = f64>,
{
    check_product(a.view(), b.view(), out.dim(), "a · b")?;
    general_mat_mul(1.0, a, b, 0.0, out);
    Ok(())
}

/// `out = a · bᵀ`
pub fn mat_mul_transposed_into<S1, S2, S3>(
    a: &ArrayBase<S1, Ix2>,
    b: &ArrayBase<S2, Ix2>,
    out: &mut ArrayBase<S3, Ix2>,
) -> RBMResult<()>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    S3: DataMut<Elem = f64>,
{
    let bt = b.t();
    check_product(a.view(), bt, out.dim(), "a · bᵀ")?;
    general_mat_mul(1.0, a, &bt, 0.0, out);
    Ok(())
}

/// `out = aᵀ · b`
pub fn transposed_mat_mul_into<S1, S2, S3>(
    a: &ArrayBase<S1, Ix2>,
    b: &ArrayBase<S2, Ix2>,
    out: &mut ArrayBase<S3, Ix2>,
) -> RBMResult<()>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    S3: DataMut<Elem = f64>,
{
    let at = a.t();
    check_product(at, b.view(), out.dim(), "aᵀ · b")?;
    general_mat_mul(1.0, &at, b, 0.0, out);
    Ok(())
}

fn check_product(
    a: ArrayView2<'_, f64>,
    b: ArrayView2<'_, f64>,
    out: (usize, usize),
    op: &str,
) -> RBMResult<()> {
    if a.ncols() != b.nrows() {
        return Err(RBMError::DimensionMismatch(format!(
            "{op}: inner dimensions differ ({}x{} by {}x{})",
            a.nrows(),
            a.ncols(),
            b.nrows(),
            b.ncols()
        )));
    }
    if out != (a.nrows(), b.ncols()) {
        return Err(RBMError::DimensionMismatch(format!(
            "{op}: output is {}x{}, expected {}x{}",
            out.0,
            out.1,
            a.nrows(),
            b.ncols()
        )));
    }
    Ok(())
}
