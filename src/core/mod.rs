//! Core RBM implementation.
//!
//! This module owns the network parameters and the training lifecycle:
//! - Configuration (visible/hidden counts, learning rate) and validation
//! - Weight and bias initialization with a bias row/column convention
//! - Dataset ingestion and bias augmentation
//! - The contrastive-divergence training driver
//!
//! ## Weight Layout
//!
//! ```text
//!          bias   h1   h2  ...  hH
//! bias  [  0     b_h1 b_h2 ...      ]
//! v1    [  b_v1  w11  w12  ...      ]
//! ...
//! vV    [  b_vV  wV1  ...           ]
//! ```
//!
//! Row 0 and column 0 hold the bias terms; the visible bias unit is the
//! constant-1 column prepended to every data row.

pub mod gibbs;
pub mod gradient;
pub mod matrix;
pub mod random;

use crate::training::{
    train_epoch, EventSink, NullSink, TrainEvent, TrainingReport, TrainingScratch,
};
use ndarray::{s, Array2};
use random::{RandomSource, SeededSource};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// Error type for RBM operations.
#[derive(Debug, Clone, PartialEq)]
pub enum RBMError {
    /// Unit counts, learning rate, or epoch count out of range
    InvalidConfig(String),
    /// Operation needs a configured network
    NotConfigured(String),
    /// Training attempted before weights or data are present
    NotReady(String),
    /// Matrix or dataset shape disagrees with the network
    DimensionMismatch(String),
    /// Unrecognized option keyword or display argument
    InvalidOption(String),
    /// Dataset text or file could not be read
    InvalidData(String),
}

impl fmt::Display for RBMError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RBMError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            RBMError::NotConfigured(msg) => write!(f, "Network not configured: {}", msg),
            RBMError::NotReady(msg) => write!(f, "Network not ready: {}", msg),
            RBMError::DimensionMismatch(msg) => write!(f, "Dimension mismatch: {}", msg),
            RBMError::InvalidOption(msg) => write!(f, "Invalid option: {}", msg),
            RBMError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
        }
    }
}

impl Error for RBMError {}

pub type RBMResult<T> = Result<T, RBMError>;

/// Bias initialization strategy.
///
/// Both strategies leave the bias row and column at zero; `RandomBias` is
/// kept as a recorded flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BiasInit {
    #[default]
    #[serde(rename = "zeros")]
    ZeroBias,
    #[serde(rename = "random")]
    RandomBias,
}

impl BiasInit {
    pub fn name(&self) -> &'static str {
        match self {
            BiasInit::ZeroBias => "zeros",
            BiasInit::RandomBias => "random",
        }
    }
}

impl FromStr for BiasInit {
    type Err = RBMError;

    fn from_str(s: &str) -> RBMResult<Self> {
        match s {
            "zeros" => Ok(BiasInit::ZeroBias),
            "random" => Ok(BiasInit::RandomBias),
            other => Err(RBMError::InvalidOption(format!(
                "unknown bias initialization '{other}' (expected 'zeros' or 'random')"
            ))),
        }
    }
}

/// Fixed network shape and base learning rate, set by [`RBM::initialize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkConfig {
    pub visible: usize,
    pub hidden: usize,
    pub learning_rate: f64,
}

impl NetworkConfig {
    /// Shape of the weight matrix: (V+1, H+1).
    pub fn weight_shape(&self) -> (usize, usize) {
        (self.visible + 1, self.hidden + 1)
    }
}

/// Lifecycle of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Unconfigured,
    Configured,
    /// Scratch allocated, about to run the first epoch
    Ready,
    Training { epoch: usize },
    Done,
}

/// Default standard deviation for weight initialization.
pub const DEFAULT_STD_DEV: f64 = 0.01;

/// A Restricted Boltzmann Machine with binary visible and hidden units.
///
/// # Lifecycle
///
/// `initialize` → `initialize_weights` (and optionally `init_bias`) →
/// `load_data` → `train`. Every step validates its input and returns an
/// error without touching existing state when validation fails.
pub struct RBM {
    config: Option<NetworkConfig>,
    std_dev: f64,
    bias_init: BiasInit,
    /// Shape (V+1, H+1); row 0 and column 0 are biases
    weights: Option<Array2<f64>>,
    /// Binary training rows without the bias column, shape (R, V)
    dataset: Option<Array2<f64>>,
    /// Reconstruction error per epoch of the latest run
    errors: Vec<f64>,
    scratch: Option<TrainingScratch>,
    /// Rate in effect for the latest run (changed by the schedule)
    learning_rate: f64,
    status: Status,
    rng: Box<dyn RandomSource>,
    sink: Box<dyn EventSink>,
}

impl fmt::Debug for RBM {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RBM")
            .field("config", &self.config)
            .field("status", &self.status)
            .field("std_dev", &self.std_dev)
            .field("bias_init", &self.bias_init)
            .field(
                "weights",
                &self.weights.as_ref().map(|w| format!("<{}x{} matrix>", w.nrows(), w.ncols())),
            )
            .field(
                "dataset",
                &self.dataset.as_ref().map(|d| format!("<{}x{} matrix>", d.nrows(), d.ncols())),
            )
            .field("epochs_recorded", &self.errors.len())
            .field("rng", &format!("<{} source>", self.rng.name()))
            .finish()
    }
}

impl Default for RBM {
    fn default() -> Self {
        Self::new()
    }
}

impl RBM {
    /// Create an unconfigured network seeded from the wall clock.
    pub fn new() -> Self {
        Self::with_source(Box::new(SeededSource::from_time()))
    }

    /// Create an unconfigured network drawing from `rng`.
    pub fn with_source(rng: Box<dyn RandomSource>) -> Self {
        Self {
            config: None,
            std_dev: DEFAULT_STD_DEV,
            bias_init: BiasInit::default(),
            weights: None,
            dataset: None,
            errors: Vec::new(),
            scratch: None,
            learning_rate: 0.0,
            status: Status::Unconfigured,
            rng,
            sink: Box::new(NullSink),
        }
    }

    /// Build a network from a [`Config`](crate::Config): configure, set the
    /// bias strategy, and initialize weights.
    pub fn from_config(config: &crate::Config, rng: Box<dyn RandomSource>) -> RBMResult<Self> {
        let mut rbm = Self::with_source(rng);
        rbm.configure(config)?;
        Ok(rbm)
    }

    /// Run `initialize`, `init_bias` and `initialize_weights` from `config`.
    pub fn configure(&mut self, config: &crate::Config) -> RBMResult<()> {
        self.initialize(config.hidden, config.visible, config.learning_rate)?;
        self.init_bias(config.bias_init)?;
        self.initialize_weights(config.std_dev)
    }

    /// Attach an event sink (builder form).
    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the event sink.
    pub fn set_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sink = sink;
    }

    /// Fix the network shape and base learning rate.
    ///
    /// Re-initializing discards weights, data, and any previous run.
    ///
    /// # Errors
    /// - `InvalidConfig` if `hidden` or `visible` is zero or `alpha` is not finite
    pub fn initialize(&mut self, hidden: usize, visible: usize, alpha: f64) -> RBMResult<()> {
        if hidden == 0 || visible == 0 {
            return Err(RBMError::InvalidConfig(format!(
                "unit counts must be positive (hidden={hidden}, visible={visible})"
            )));
        }
        if !alpha.is_finite() {
            return Err(RBMError::InvalidConfig(format!(
                "learning rate must be finite, got {alpha}"
            )));
        }

        self.config = Some(NetworkConfig {
            visible,
            hidden,
            learning_rate: alpha,
        });
        self.learning_rate = alpha;
        self.weights = None;
        self.dataset = None;
        self.errors.clear();
        self.scratch = None;
        self.status = Status::Configured;

        self.sink.record(&TrainEvent::Configured {
            hidden,
            visible,
            learning_rate: alpha,
        });
        Ok(())
    }

    /// Allocate the (V+1)×(H+1) weight matrix.
    ///
    /// Interior cells get `std_dev * U(0,1)`, drawn in row-major order; the
    /// bias row and column start at zero.
    ///
    /// # Errors
    /// - `NotConfigured` before a successful `initialize`
    /// - `InvalidConfig` if `std_dev` is not finite
    pub fn initialize_weights(&mut self, std_dev: f64) -> RBMResult<()> {
        let config = self.require_config("initialize_weights")?;
        if !std_dev.is_finite() {
            return Err(RBMError::InvalidConfig(format!(
                "weight standard deviation must be finite, got {std_dev}"
            )));
        }

        let (rows, cols) = config.weight_shape();
        let mut weights = Array2::zeros((rows, cols));
        for i in 1..rows {
            for j in 1..cols {
                weights[[i, j]] = std_dev * self.rng.uniform(0.0, 1.0);
            }
        }

        self.std_dev = std_dev;
        self.weights = Some(weights);
        self.sink.record(&TrainEvent::WeightsInitialized {
            rows,
            cols,
            std_dev,
        });
        Ok(())
    }

    /// Record the bias initialization strategy.
    ///
    /// # Errors
    /// - `NotConfigured` before a successful `initialize`
    pub fn init_bias(&mut self, strategy: BiasInit) -> RBMResult<()> {
        self.require_config("init_bias")?;
        self.bias_init = strategy;
        self.sink.record(&TrainEvent::BiasInitialized {
            strategy: strategy.name().to_string(),
        });
        Ok(())
    }

    /// Replace the weights with a known matrix.
    ///
    /// # Errors
    /// - `NotConfigured` before a successful `initialize`
    /// - `DimensionMismatch` unless `weights` is (V+1)×(H+1)
    pub fn set_weights(&mut self, weights: Array2<f64>) -> RBMResult<()> {
        let config = self.require_config("set_weights")?;
        if weights.dim() != config.weight_shape() {
            return Err(RBMError::DimensionMismatch(format!(
                "weights are {:?}, expected {:?}",
                weights.dim(),
                config.weight_shape()
            )));
        }
        self.weights = Some(weights);
        Ok(())
    }

    /// Copy the first `row_count` rows of `rows` into the dataset.
    ///
    /// Any non-zero cell counts as 1. A rejected call keeps the previously
    /// stored dataset.
    ///
    /// # Errors
    /// - `NotConfigured` before a successful `initialize`
    /// - `DimensionMismatch` if `rows` does not have V columns, `row_count`
    ///   is zero, or `row_count` exceeds the rows provided
    pub fn load_data(&mut self, rows: &Array2<u8>, row_count: usize) -> RBMResult<()> {
        let config = self.require_config("load_data")?;

        if rows.ncols() != config.visible {
            self.sink.record(&TrainEvent::DataRejected {
                expected_cols: config.visible,
                found_cols: rows.ncols(),
            });
            return Err(RBMError::DimensionMismatch(format!(
                "input has {} columns, network has {} visible units",
                rows.ncols(),
                config.visible
            )));
        }
        if row_count == 0 || row_count > rows.nrows() {
            return Err(RBMError::DimensionMismatch(format!(
                "requested {} rows from an input of {}",
                row_count,
                rows.nrows()
            )));
        }

        let dataset = rows
            .slice(s![..row_count, ..])
            .mapv(|v| if v != 0 { 1.0 } else { 0.0 });
        self.dataset = Some(dataset);
        self.sink.record(&TrainEvent::DataLoaded {
            rows: row_count,
            cols: config.visible,
        });
        Ok(())
    }

    /// Train with CD-15 for `epochs` epochs.
    ///
    /// # Algorithm
    ///
    /// The stored dataset is bias-augmented into fresh scratch, then for each
    /// epoch: 15 Gibbs alternations, the learning-rate schedule, one weight
    /// update from the final alternation, and one error-trace entry. See
    /// [`crate::training`] for the per-epoch steps.
    ///
    /// `_method` is reserved and currently ignored.
    ///
    /// # Errors
    /// - `NotConfigured` before a successful `initialize`
    /// - `InvalidConfig` if `epochs` is zero
    /// - `NotReady` if weights or data are missing
    /// - `DimensionMismatch` if the dataset width is not V
    pub fn train(&mut self, epochs: usize, _method: bool) -> RBMResult<TrainingReport> {
        let config = self.require_config("train")?;
        if epochs == 0 {
            return Err(RBMError::InvalidConfig(
                "epoch count must be positive".to_string(),
            ));
        }
        if self.weights.is_none() {
            return Err(RBMError::NotReady(
                "weights have not been initialized".to_string(),
            ));
        }
        let dataset = self
            .dataset
            .as_ref()
            .ok_or_else(|| RBMError::NotReady("no training data loaded".to_string()))?;
        let mut scratch = TrainingScratch::new(dataset, config.visible, config.hidden)?;

        self.sink.record(&TrainEvent::TrainingStarted {
            epochs,
            rows: scratch.rows(),
            cols: scratch.data.ncols(),
        });
        for (name, rows, cols) in scratch.shapes() {
            self.sink.record(&TrainEvent::MatrixAllocated {
                name: name.to_string(),
                rows,
                cols,
            });
        }

        self.errors = vec![0.0; epochs];
        self.learning_rate = config.learning_rate;
        self.status = Status::Ready;
        let start = Instant::now();

        let result = self.run_epochs(&mut scratch, epochs);
        self.scratch = Some(scratch);
        result?;

        let elapsed = start.elapsed();
        self.status = Status::Done;
        self.sink.record(&TrainEvent::TrainingCompleted {
            epochs,
            elapsed_ms: elapsed.as_millis() as u64,
        });

        Ok(TrainingReport {
            epochs,
            errors: self.errors.clone(),
            final_learning_rate: self.learning_rate,
            elapsed,
        })
    }

    fn run_epochs(&mut self, scratch: &mut TrainingScratch, epochs: usize) -> RBMResult<()> {
        let weights = self
            .weights
            .as_mut()
            .ok_or_else(|| RBMError::NotReady("weights have not been initialized".to_string()))?;

        for epoch in 0..epochs {
            self.status = Status::Training { epoch };
            self.sink.record(&TrainEvent::EpochStarted { epoch });

            let metrics = train_epoch(
                weights,
                scratch,
                self.rng.as_mut(),
                epoch,
                epochs,
                self.learning_rate,
            )?;
            self.learning_rate = metrics.learning_rate;
            self.errors[epoch] = metrics.error;

            self.sink.record(&TrainEvent::EpochCompleted {
                epoch,
                learning_rate: metrics.learning_rate,
                error: metrics.error,
            });
        }
        Ok(())
    }

    fn require_config(&self, op: &str) -> RBMResult<NetworkConfig> {
        self.config.ok_or_else(|| {
            RBMError::NotConfigured(format!("{op} called before initialize"))
        })
    }

    /// Network shape and base learning rate, once configured.
    pub fn config(&self) -> Option<&NetworkConfig> {
        self.config.as_ref()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Weight matrix including bias row and column.
    pub fn weights(&self) -> Option<&Array2<f64>> {
        self.weights.as_ref()
    }

    /// Stored dataset without the bias column.
    pub fn dataset(&self) -> Option<&Array2<f64>> {
        self.dataset.as_ref()
    }

    /// Reconstruction error per epoch of the latest run.
    pub fn error_trace(&self) -> &[f64] {
        &self.errors
    }

    /// Matrices left by the final Gibbs alternation of the latest run.
    pub fn scratch(&self) -> Option<&TrainingScratch> {
        self.scratch.as_ref()
    }

    /// Learning rate in effect (after any schedule change).
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Standard deviation of the last weight initialization.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    pub fn bias_init(&self) -> BiasInit {
        self.bias_init
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::MemorySink;
    use ndarray::array;
    use super::random::FixedSequence;

    fn fixed_rbm() -> RBM {
        RBM::with_source(Box::new(FixedSequence::new(vec![0.5])))
    }

    #[test]
    fn test_initialize_rejects_zero_units() {
        let mut rbm = fixed_rbm();
        assert!(matches!(rbm.initialize(0, 3, 0.1), Err(RBMError::InvalidConfig(_))));
        assert!(matches!(rbm.initialize(2, 0, 0.1), Err(RBMError::InvalidConfig(_))));
        assert!(!rbm.is_configured());
        assert_eq!(rbm.status(), Status::Unconfigured);
    }

    #[test]
    fn test_initialize_rejects_non_finite_rate() {
        let mut rbm = fixed_rbm();
        assert!(rbm.initialize(2, 3, f64::NAN).is_err());
        assert!(!rbm.is_configured());
    }

    #[test]
    fn test_weights_before_initialize() {
        let mut rbm = fixed_rbm();
        assert!(matches!(
            rbm.initialize_weights(0.1),
            Err(RBMError::NotConfigured(_))
        ));
        assert!(matches!(
            rbm.init_bias(BiasInit::ZeroBias),
            Err(RBMError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_weight_shape_and_bias_zeros() {
        let mut rbm = fixed_rbm();
        rbm.initialize(3, 4, 0.1).unwrap();
        rbm.initialize_weights(0.2).unwrap();
        let w = rbm.weights().unwrap();
        assert_eq!(w.dim(), (5, 4));
        assert!(w.row(0).iter().all(|&v| v == 0.0));
        assert!(w.column(0).iter().all(|&v| v == 0.0));
        // Every interior cell is 0.2 * 0.5
        assert!(w.slice(s![1.., 1..]).iter().all(|&v| (v - 0.1).abs() < 1e-12));
        assert_eq!(rbm.std_dev(), 0.2);
    }

    #[test]
    fn test_bias_init_parsing() {
        assert_eq!("zeros".parse::<BiasInit>().unwrap(), BiasInit::ZeroBias);
        assert_eq!("random".parse::<BiasInit>().unwrap(), BiasInit::RandomBias);
        assert!(matches!(
            "gaussian".parse::<BiasInit>(),
            Err(RBMError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_random_bias_matches_zero_bias() {
        let mut a = fixed_rbm();
        a.initialize(2, 2, 0.1).unwrap();
        a.initialize_weights(0.1).unwrap();
        a.init_bias(BiasInit::RandomBias).unwrap();

        let mut b = fixed_rbm();
        b.initialize(2, 2, 0.1).unwrap();
        b.initialize_weights(0.1).unwrap();
        b.init_bias(BiasInit::ZeroBias).unwrap();

        assert_eq!(a.weights(), b.weights());
        assert_eq!(a.bias_init(), BiasInit::RandomBias);
    }

    #[test]
    fn test_set_weights_checks_shape() {
        let mut rbm = fixed_rbm();
        rbm.initialize(1, 2, 0.1).unwrap();
        assert!(rbm.set_weights(Array2::zeros((2, 2))).is_err());
        assert!(rbm.set_weights(Array2::zeros((3, 2))).is_ok());
    }

    #[test]
    fn test_load_data_copies_requested_rows() {
        let mut rbm = fixed_rbm();
        rbm.initialize(1, 3, 0.1).unwrap();
        let rows = array![[1u8, 0, 1], [0, 2, 0], [1, 1, 1]];
        rbm.load_data(&rows, 2).unwrap();
        assert_eq!(rbm.dataset().unwrap(), &array![[1.0, 0.0, 1.0], [0.0, 1.0, 0.0]]);
    }

    #[test]
    fn test_load_data_rejects_bad_row_count() {
        let mut rbm = fixed_rbm();
        rbm.initialize(1, 2, 0.1).unwrap();
        let rows = array![[1u8, 0]];
        assert!(rbm.load_data(&rows, 0).is_err());
        assert!(rbm.load_data(&rows, 2).is_err());
        assert!(rbm.dataset().is_none());
    }

    #[test]
    fn test_train_requires_weights_and_data() {
        let mut rbm = fixed_rbm();
        assert!(matches!(rbm.train(1, false), Err(RBMError::NotConfigured(_))));

        rbm.initialize(1, 2, 0.1).unwrap();
        assert!(matches!(rbm.train(1, false), Err(RBMError::NotReady(_))));

        rbm.initialize_weights(0.1).unwrap();
        assert!(matches!(rbm.train(1, false), Err(RBMError::NotReady(_))));

        rbm.load_data(&array![[1u8, 0]], 1).unwrap();
        assert!(matches!(rbm.train(0, false), Err(RBMError::InvalidConfig(_))));
        assert_eq!(rbm.status(), Status::Configured);

        assert!(rbm.train(1, false).is_ok());
        assert_eq!(rbm.status(), Status::Done);
    }

    #[test]
    fn test_events_cover_lifecycle() {
        let sink = MemorySink::new();
        let mut rbm = fixed_rbm().with_sink(Box::new(sink.clone()));
        rbm.initialize(1, 2, 0.1).unwrap();
        rbm.initialize_weights(0.1).unwrap();
        rbm.load_data(&array![[1u8, 0]], 1).unwrap();
        rbm.train(2, false).unwrap();

        let events = sink.events();
        assert!(matches!(events[0], TrainEvent::Configured { hidden: 1, visible: 2, .. }));
        let epochs_done = events
            .iter()
            .filter(|e| matches!(e, TrainEvent::EpochCompleted { .. }))
            .count();
        assert_eq!(epochs_done, 2);
        let allocated = events
            .iter()
            .filter(|e| matches!(e, TrainEvent::MatrixAllocated { .. }))
            .count();
        assert_eq!(allocated, 10);
        assert!(matches!(
            events.last(),
            Some(TrainEvent::TrainingCompleted { epochs: 2, .. })
        ));
    }

    #[test]
    fn test_debug_does_not_dump_matrices() {
        let mut rbm = fixed_rbm();
        rbm.initialize(2, 2, 0.1).unwrap();
        rbm.initialize_weights(0.1).unwrap();
        let dbg = format!("{:?}", rbm);
        assert!(dbg.contains("<3x3 matrix>"));
        assert!(dbg.contains("<fixed source>"));
    }
}
