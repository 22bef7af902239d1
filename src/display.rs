//! Text rendering of matrices and error traces.

use crate::core::{RBMError, RBMResult};
use ndarray::{ArrayBase, Data, Ix2};
use std::str::FromStr;

/// Number notation for rendered values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Notation {
    #[default]
    FixedPoint,
    Scientific,
}

impl FromStr for Notation {
    type Err = RBMError;

    fn from_str(s: &str) -> RBMResult<Self> {
        match s {
            "fixed" => Ok(Notation::FixedPoint),
            "scientific" => Ok(Notation::Scientific),
            other => Err(RBMError::InvalidOption(format!(
                "unknown notation '{other}' (expected 'fixed' or 'scientific')"
            ))),
        }
    }
}

fn format_value(value: f64, precision: usize, notation: Notation) -> String {
    match notation {
        Notation::FixedPoint => format!("{:.*}", precision, value),
        Notation::Scientific => format!("{:.*e}", precision, value),
    }
}

fn check_precision(precision: usize) -> RBMResult<()> {
    if precision == 0 {
        return Err(RBMError::InvalidOption(
            "precision must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// One line per row, cells separated by two spaces.
///
/// # Errors
/// - `InvalidOption` if `precision` is zero
pub fn format_matrix<S>(
    matrix: &ArrayBase<S, Ix2>,
    precision: usize,
    notation: Notation,
) -> RBMResult<String>
where
    S: Data<Elem = f64>,
{
    check_precision(precision)?;
    let mut out = String::new();
    for row in matrix.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|&v| format_value(v, precision, notation))
            .collect();
        out.push_str(&cells.join("  "));
        out.push('\n');
    }
    Ok(out)
}

/// One value per line.
pub fn format_trace(trace: &[f64], precision: usize, notation: Notation) -> RBMResult<String> {
    check_precision(precision)?;
    let mut out = String::new();
    for &v in trace {
        out.push_str(&format_value(v, precision, notation));
        out.push('\n');
    }
    Ok(out)
}
