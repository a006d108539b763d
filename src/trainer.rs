//! Episode-boundary training: a Monte-Carlo, reward-weighted-regression
//! recipe that turns an episode of transitions into a supervised fit.

use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::encoder::FEATURE_LEN;
use crate::error::Result;
use crate::experience::ExperienceBuffer;
use crate::policy::{PolicyEngine, ACTION_COUNT};
use crate::scratch::ScratchPool;

pub const GAMMA: f32 = 0.95;
pub const MIN_TRAIN_SAMPLES: usize = 10;
const MAX_BATCH: usize = 32;
const LEARNING_RATE: f32 = 0.001;
const NORM_EPSILON: f32 = 1e-8;

/// Compute discounted returns backward: `G_t = r_t + gamma * G_{t+1}`,
/// with `G_last = r_last`.
pub fn discounted_returns(rewards: &[f32], gamma: f32) -> Vec<f32> {
    let mut returns = vec![0.0f32; rewards.len()];
    let mut running = 0.0f32;
    for t in (0..rewards.len()).rev() {
        running = rewards[t] + gamma * running;
        returns[t] = running;
    }
    returns
}

/// Normalize returns to zero mean and unit variance (with a small epsilon).
pub fn normalize_returns(returns: &mut [f32]) {
    if returns.is_empty() {
        return;
    }
    let n = returns.len() as f32;
    let mean = returns.iter().sum::<f32>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f32>() / n;
    let std = variance.sqrt();
    for r in returns.iter_mut() {
        *r = (*r - mean) / (std + NORM_EPSILON);
    }
}

/// Builds the supervised regression targets from taken actions and
/// normalized returns. Implementations can swap the synthetic-target trick
/// for a principled policy-gradient objective without touching the buffer
/// or encoder.
pub trait TargetBuilder {
    fn build(&self, actions: &[[f32; ACTION_COUNT]], returns: &[f32]) -> Array2<f32>;
}

/// The ad hoc recipe: for a positive normalized return R, nudge each action
/// component away from its taken value by +/- strength * R (reinforce the
/// choice); for a non-positive R, shrink the component toward zero by
/// (1 + R * strength).
pub struct RewardWeightedRegression {
    pub strength: f32,
}

impl Default for RewardWeightedRegression {
    fn default() -> Self {
        RewardWeightedRegression { strength: 0.1 }
    }
}

impl TargetBuilder for RewardWeightedRegression {
    fn build(&self, actions: &[[f32; ACTION_COUNT]], returns: &[f32]) -> Array2<f32> {
        let mut targets = Array2::zeros((actions.len(), ACTION_COUNT));
        for (i, (action, &ret)) in actions.iter().zip(returns.iter()).enumerate() {
            for (j, &a) in action.iter().enumerate() {
                targets[[i, j]] = if ret > 0.0 {
                    let nudge = if a > 0.0 { self.strength } else { -self.strength };
                    a + nudge * ret
                } else {
                    a * (1.0 + ret * self.strength)
                };
            }
        }
        targets
    }
}

/// Outcome of one completed training pass.
#[derive(Debug, Clone, Copy)]
pub struct TrainReport {
    pub samples: usize,
    pub loss: f32,
    pub weight_delta: f32,
}

/// Fits the policy once per episode from the accumulated experience.
pub struct EpisodeTrainer {
    gamma: f32,
    target_builder: Box<dyn TargetBuilder + Send>,
    scratch: ScratchPool,
}

impl EpisodeTrainer {
    pub fn new() -> Self {
        EpisodeTrainer {
            gamma: GAMMA,
            target_builder: Box::new(RewardWeightedRegression::default()),
            scratch: ScratchPool::default(),
        }
    }

    pub fn with_target_builder(mut self, builder: Box<dyn TargetBuilder + Send>) -> Self {
        self.target_builder = builder;
        self
    }

    /// Run one training pass. A strict no-op (`Ok(None)`, buffer untouched)
    /// when fewer than [`MIN_TRAIN_SAMPLES`] complete transitions exist. On
    /// success the buffer is cleared and a report returned; on failure the
    /// buffer is left intact for the next episode boundary.
    pub fn train(
        &mut self,
        policy: &mut PolicyEngine,
        buffer: &mut ExperienceBuffer,
    ) -> Result<Option<TrainReport>> {
        if buffer.len() < MIN_TRAIN_SAMPLES {
            return Ok(None);
        }

        buffer.trim();
        let n = buffer.len();

        let mut returns = discounted_returns(buffer.rewards(), self.gamma);
        normalize_returns(&mut returns);
        let targets = self.target_builder.build(buffer.actions(), &returns);

        // Stage the full state matrix through a scratch lease; it returns to
        // the pool on every exit path below.
        let mut states = self.scratch.lease_2d((n, FEATURE_LEN));
        for (i, state) in buffer.states().iter().enumerate() {
            states.row_mut(i).assign(state);
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut thread_rng());
        let batch_size = MAX_BATCH.min(n);

        policy.begin_training()?;
        let fit_result = (|| -> Result<()> {
            // One epoch over the shuffled samples
            for chunk in order.chunks(batch_size) {
                let mut batch_states = self.scratch.lease_2d((chunk.len(), FEATURE_LEN));
                let mut batch_targets = self.scratch.lease_2d((chunk.len(), ACTION_COUNT));
                for (row, &idx) in chunk.iter().enumerate() {
                    batch_states.row_mut(row).assign(&states.row(idx));
                    batch_targets.row_mut(row).assign(&targets.row(idx));
                }
                policy.fit_minibatch(batch_states.view(), batch_targets.view(), LEARNING_RATE)?;
            }
            Ok(())
        })();
        policy.end_training();
        fit_result?;

        let loss = policy.evaluate_loss(states.view(), targets.view());
        let weight_delta = policy.refresh_weight_delta();
        buffer.clear();

        Ok(Some(TrainReport {
            samples: n,
            loss,
            weight_delta,
        }))
    }
}

impl Default for EpisodeTrainer {
    fn default() -> Self {
        Self::new()
    }
}
