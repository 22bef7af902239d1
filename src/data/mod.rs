//! Binary dataset loading.
//!
//! Text format: one row per line, cells `0` or `1`, optionally separated by
//! whitespace or commas. Blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! # six visible units
//! 111000
//! 1 0 1 0 0 0
//! ```

use crate::core::{RBMError, RBMResult};
use ndarray::Array2;
use ndarray_rand::rand_distr::Bernoulli;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

/// Parse binary rows from text.
///
/// # Errors
/// - `InvalidData` on an unexpected character, ragged rows, or no rows
pub fn parse_binary_rows(text: &str) -> RBMResult<Array2<u8>> {
    let mut rows: Vec<Vec<u8>> = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut row = Vec::with_capacity(line.len());
        for c in line.chars() {
            match c {
                '0' => row.push(0),
                '1' => row.push(1),
                ',' => {}
                c if c.is_whitespace() => {}
                other => {
                    return Err(RBMError::InvalidData(format!(
                        "line {}: unexpected character '{}'",
                        line_no + 1,
                        other
                    )))
                }
            }
        }

        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(RBMError::InvalidData(format!(
                    "line {}: {} cells, previous rows have {}",
                    line_no + 1,
                    row.len(),
                    first.len()
                )));
            }
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(RBMError::InvalidData("no data rows found".to_string()));
    }

    let nrows = rows.len();
    let ncols = rows[0].len();
    let flat: Vec<u8> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| RBMError::InvalidData(format!("failed to build dataset: {e}")))
}

/// Read and parse a dataset file.
pub fn load_dataset(path: &Path) -> RBMResult<Array2<u8>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        RBMError::InvalidData(format!("failed to read {}: {e}", path.display()))
    })?;
    parse_binary_rows(&text)
}

/// The six 6-unit training rows of the classic toy problem: two clusters
/// of co-occurring features.
///
/// Rows follow the reference trainer's built-in data (`111000` first).
pub fn example_dataset() -> Array2<u8> {
    ndarray::arr2(&[
        [1, 1, 1, 0, 0, 0],
        [1, 0, 1, 0, 0, 0],
        [1, 1, 1, 0, 0, 0],
        [0, 0, 1, 1, 1, 0],
        [0, 0, 1, 1, 0, 0],
        [0, 0, 1, 1, 1, 0],
    ])
}

/// Random binary rows where each cell is 1 with probability `density`.
///
/// # Errors
/// - `InvalidConfig` if `density` is outside `[0, 1]`
pub fn synthetic_dataset(rows: usize, cols: usize, density: f64, seed: u64) -> RBMResult<Array2<u8>> {
    let dist = Bernoulli::new(density)
        .map_err(|e| RBMError::InvalidConfig(format!("density {density}: {e}")))?;
    let mut rng = StdRng::seed_from_u64(seed);
    let bits: Array2<bool> = Array2::random_using((rows, cols), dist, &mut rng);
    Ok(bits.mapv(u8::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compact_and_separated() {
        let text = "# header\n110\n\n1, 0, 1\n0 0 1\n";
        let data = parse_binary_rows(text).unwrap();
        assert_eq!(data, ndarray::arr2(&[[1, 1, 0], [1, 0, 1], [0, 0, 1]]));
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        assert!(matches!(
            parse_binary_rows("101\n10\n"),
            Err(RBMError::InvalidData(_))
        ));
    }

    #[test]
    fn test_parse_rejects_other_digits() {
        assert!(parse_binary_rows("102\n").is_err());
        assert!(parse_binary_rows("# only a comment\n").is_err());
    }

    #[test]
    fn test_example_dataset_shape() {
        let data = example_dataset();
        assert_eq!(data.dim(), (6, 6));
        // third feature is on in every row
        assert!(data.column(2).iter().all(|&v| v == 1));
        assert_eq!(data.row(0).to_vec(), vec![1, 1, 1, 0, 0, 0]);
        assert_eq!(data.row(4).to_vec(), vec![0, 0, 1, 1, 0, 0]);
    }

    #[test]
    fn test_synthetic_dataset_is_binary_and_seeded() {
        let a = synthetic_dataset(20, 8, 0.3, 5).unwrap();
        let b = synthetic_dataset(20, 8, 0.3, 5).unwrap();
        assert_eq!(a, b);
        assert!(a.iter().all(|&v| v <= 1));
        assert!(synthetic_dataset(2, 2, 1.5, 0).is_err());
    }

    #[test]
    fn test_load_dataset_missing_file() {
        let err = load_dataset(Path::new("/nonexistent/rbm/data.txt")).unwrap_err();
        assert!(matches!(err, RBMError::InvalidData(_)));
    }
}
