use ndarray::Array1;
use rand::Rng;

use crate::encoder::FEATURE_LEN;
use crate::experience::ExperienceBuffer;
use crate::policy::PolicyEngine;
use crate::trainer::{
    discounted_returns, normalize_returns, EpisodeTrainer, RewardWeightedRegression,
    TargetBuilder, GAMMA, MIN_TRAIN_SAMPLES,
};

fn filled_buffer(n: usize) -> ExperienceBuffer {
    let mut rng = rand::thread_rng();
    let mut buffer = ExperienceBuffer::new();
    for i in 0..n {
        let state = Array1::from_shape_fn(FEATURE_LEN, |_| rng.gen_range(-1.0..1.0));
        let action = [i % 2 == 0, i % 3 == 0, false, true];
        buffer.push_transition(state, action);
        buffer.push_reward(if i % 4 == 0 { 1.0 } else { -0.1 });
    }
    buffer
}

#[test]
fn test_discounted_returns_backward_recursion() {
    let returns = discounted_returns(&[1.0, 0.0, -1.0], GAMMA);
    assert!((returns[2] + 1.0).abs() < 1e-6);
    assert!((returns[1] + 0.95).abs() < 1e-6);
    assert!((returns[0] - 0.0975).abs() < 1e-6);
}

#[test]
fn test_discounted_returns_empty() {
    assert!(discounted_returns(&[], GAMMA).is_empty());
}

#[test]
fn test_normalize_returns_zero_mean_unit_variance() {
    let mut returns = vec![1.0, 2.0, 3.0, 4.0];
    normalize_returns(&mut returns);
    let mean: f32 = returns.iter().sum::<f32>() / 4.0;
    let variance: f32 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f32>() / 4.0;
    assert!(mean.abs() < 1e-5);
    assert!((variance - 1.0).abs() < 1e-4);
}

#[test]
fn test_normalize_constant_returns_stays_finite() {
    let mut returns = vec![5.0; 8];
    normalize_returns(&mut returns);
    for &r in &returns {
        assert!(r.is_finite());
        assert!(r.abs() < 1e-3);
    }
}

#[test]
fn test_reward_weighted_targets() {
    let builder = RewardWeightedRegression::default();

    // Positive return: nudge taken components up, untaken down
    let targets = builder.build(&[[1.0, 0.0, 0.0, 1.0]], &[1.0]);
    assert!((targets[[0, 0]] - 1.1).abs() < 1e-6);
    assert!((targets[[0, 1]] + 0.1).abs() < 1e-6);
    assert!((targets[[0, 3]] - 1.1).abs() < 1e-6);

    // Negative return: shrink taken components toward zero
    let targets = builder.build(&[[1.0, 0.0, 1.0, 0.0]], &[-1.0]);
    assert!((targets[[0, 0]] - 0.9).abs() < 1e-6);
    assert_eq!(targets[[0, 1]], 0.0);
}

#[test]
fn test_train_is_noop_below_minimum() {
    let mut trainer = EpisodeTrainer::new();
    let mut policy = PolicyEngine::new();
    let mut buffer = filled_buffer(MIN_TRAIN_SAMPLES - 1);

    let report = trainer.train(&mut policy, &mut buffer).unwrap();
    assert!(report.is_none());
    // The buffer is untouched so the next episode can extend it
    assert_eq!(buffer.len(), MIN_TRAIN_SAMPLES - 1);
}

#[test]
fn test_train_clears_buffer_and_reports() {
    let mut trainer = EpisodeTrainer::new();
    let mut policy = PolicyEngine::new();
    let mut buffer = filled_buffer(24);

    let report = trainer
        .train(&mut policy, &mut buffer)
        .unwrap()
        .expect("enough samples to train");
    assert_eq!(report.samples, 24);
    assert!(report.loss.is_finite());
    assert!(report.weight_delta >= 0.0);
    assert!(buffer.is_empty());
    assert!(!policy.training_in_flight());
    assert_eq!(policy.weight_changes(), report.weight_delta);
}

#[test]
fn test_train_trims_dangling_transition() {
    let mut trainer = EpisodeTrainer::new();
    let mut policy = PolicyEngine::new();
    let mut buffer = filled_buffer(12);
    // One transition whose reward never arrived
    buffer.push_transition(Array1::zeros(FEATURE_LEN), [false; 4]);

    let report = trainer
        .train(&mut policy, &mut buffer)
        .unwrap()
        .expect("enough samples to train");
    assert_eq!(report.samples, 12);
}

#[test]
fn test_custom_target_builder_is_used() {
    struct ZeroTargets;
    impl TargetBuilder for ZeroTargets {
        fn build(&self, actions: &[[f32; 4]], _returns: &[f32]) -> ndarray::Array2<f32> {
            ndarray::Array2::zeros((actions.len(), 4))
        }
    }

    let mut trainer = EpisodeTrainer::new().with_target_builder(Box::new(ZeroTargets));
    let mut policy = PolicyEngine::new();
    let mut buffer = filled_buffer(16);

    let report = trainer
        .train(&mut policy, &mut buffer)
        .unwrap()
        .expect("enough samples to train");
    // MSE against all-zero targets on a sigmoid head is bounded by 1
    assert!(report.loss <= 1.0);
}
