//! End-to-end training tests on the toy six-unit dataset.
//!
//! These tests verify:
//! - The error trace has one non-negative entry per epoch
//! - Identical seeds reproduce identical traces and weights
//! - The learning-rate schedule switches to 0.32 at three quarters and never
//!   reaches the 0.42 branch
//! - A second `train` call starts over from fresh scratch

use rbm::data::example_dataset;
use rbm::training::{FINAL_LEARNING_RATE, LATE_LEARNING_RATE};
use rbm::{Config, MemorySink, SeededSource, Status, TrainEvent, RBM};

fn toy_network(seed: u64) -> RBM {
    let config = Config {
        hidden: 2,
        visible: 6,
        learning_rate: 0.1,
        std_dev: 0.1,
        ..Config::default()
    };
    let mut rbm = RBM::from_config(&config, Box::new(SeededSource::new(seed)))
        .expect("Failed to create network");
    let data = example_dataset();
    rbm.load_data(&data, data.nrows()).expect("load_data failed");
    rbm
}

fn epoch_rates(events: &[TrainEvent]) -> Vec<f64> {
    events
        .iter()
        .filter_map(|e| match e {
            TrainEvent::EpochCompleted { learning_rate, .. } => Some(*learning_rate),
            _ => None,
        })
        .collect()
}

#[test]
fn test_trace_length_and_sign() {
    let mut rbm = toy_network(42);
    let report = rbm.train(10, false).expect("train failed");

    assert_eq!(report.errors.len(), 10);
    assert_eq!(report.final_error(), rbm.error_trace().last().copied());
    assert!(report.mean_error().is_some_and(|m| m >= 0.0));
    assert_eq!(rbm.error_trace().len(), 10);
    for (epoch, &err) in rbm.error_trace().iter().enumerate() {
        assert!(err.is_finite(), "epoch {epoch}: error {err}");
        assert!(err >= 0.0, "epoch {epoch}: error {err}");
    }
    assert_eq!(rbm.status(), Status::Done);
}

#[test]
fn test_same_seed_reproduces_trace() {
    let mut a = toy_network(7);
    let mut b = toy_network(7);
    a.train(10, false).expect("train failed");
    b.train(10, false).expect("train failed");

    assert_eq!(a.error_trace(), b.error_trace());
    assert_eq!(a.weights(), b.weights());
}

#[test]
fn test_error_bounded_by_matrix_size() {
    // Each squared cell error is at most 1, so the total is at most R * (V+1).
    let mut rbm = toy_network(3);
    rbm.train(20, false).expect("train failed");
    for &err in rbm.error_trace() {
        assert!(err <= 6.0 * 7.0);
    }
}

#[test]
fn test_schedule_during_training() {
    let sink = MemorySink::new();
    let mut rbm = toy_network(11).with_sink(Box::new(sink.clone()));
    rbm.train(100, false).expect("train failed");

    let rates = epoch_rates(&sink.events());
    assert_eq!(rates.len(), 100);
    assert_eq!(rates[0], 0.1);
    assert_eq!(rates[74], 0.1);
    assert_eq!(rates[75], LATE_LEARNING_RATE);
    assert_eq!(rates[80], 0.32);
    assert!(rates.iter().all(|&r| r != FINAL_LEARNING_RATE));
    assert_eq!(rbm.learning_rate(), LATE_LEARNING_RATE);
}

#[test]
fn test_second_run_restarts() {
    let sink = MemorySink::new();
    let mut rbm = toy_network(5).with_sink(Box::new(sink.clone()));
    rbm.train(5, false).expect("first run failed");
    assert_eq!(rbm.learning_rate(), LATE_LEARNING_RATE);

    rbm.train(3, false).expect("second run failed");
    assert_eq!(rbm.error_trace().len(), 3);

    let rates = epoch_rates(&sink.events());
    assert_eq!(rates.len(), 8);
    // Second run begins at the configured rate again
    assert_eq!(rates[5], 0.1);

    let scratch = rbm.scratch().expect("scratch missing");
    assert_eq!(scratch.data.dim(), (6, 7));
    assert!(scratch.data.column(0).iter().all(|&v| v == 1.0));
}

#[test]
fn test_probabilities_stay_in_unit_interval() {
    let mut rbm = toy_network(9);
    rbm.train(10, false).expect("train failed");
    let scratch = rbm.scratch().expect("scratch missing");

    for m in [
        &scratch.pos_hidden_probs,
        &scratch.neg_visible_probs,
        &scratch.neg_hidden_probs,
    ] {
        assert!(m.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }
    assert!(scratch
        .pos_hidden_states
        .iter()
        .all(|&s| s == 0.0 || s == 1.0));
    assert_eq!(scratch.pos_associations.dim(), (7, 3));
    assert_eq!(scratch.neg_associations.dim(), (7, 3));
}
