//! Policy engine: the trainable function approximator and action selection.
//!
//! The network maps the 39-element feature vector to four independent action
//! probabilities (turn-left, turn-right, thrust, fire) through a sigmoid
//! output; several may be "on" at once. Inference is fail-soft: while a
//! training step is in flight, or after disposal, it degrades to the neutral
//! action instead of erroring out of the render loop.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::{rngs::ThreadRng, Rng};
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::encoder::FEATURE_LEN;
use crate::error::{AgentError, Result};
use crate::network::NeuralNetwork;
use crate::optimizer::{Adam, OptimizerWrapper, SGD};
use crate::scratch::ScratchPool;

pub const ACTION_COUNT: usize = 4;
pub const NEUTRAL_ACTION: [bool; ACTION_COUNT] = [false; ACTION_COUNT];
const ACTION_THRESHOLD: f32 = 0.5;

/// Diagnostic snapshot of one inference: the inputs, every layer's
/// post-activation output, and the weight matrices. Cloned at capture time
/// so later weight updates cannot mutate a previously reported snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkActivations {
    pub inputs: Array1<f32>,
    pub layer_outputs: Vec<Array1<f32>>,
    pub weights: Vec<Array2<f32>>,
}

pub struct PolicyEngine {
    network: NeuralNetwork,
    scratch: ScratchPool,
    training_in_flight: bool,
    disposed: bool,
    weight_snapshot: Vec<Array2<f32>>,
    weight_changes: f32,
    last_activations: Option<NetworkActivations>,
    rng: ThreadRng,
}

impl PolicyEngine {
    /// Create the 39 -> 128 -> 64 -> 32 -> 4 policy network with ReLU hidden
    /// layers and a sigmoid output, trained with Adam.
    pub fn new() -> Self {
        let layer_sizes = &[FEATURE_LEN, 128, 64, 32, ACTION_COUNT];
        let activations = &[
            Activation::Relu,
            Activation::Relu,
            Activation::Relu,
            Activation::Sigmoid,
        ];
        let mut network =
            NeuralNetwork::new(layer_sizes, activations, OptimizerWrapper::SGD(SGD::new()));
        network.optimizer = OptimizerWrapper::Adam(Adam::default_for(&network.layers));

        let weight_snapshot = network.weight_matrices();
        PolicyEngine {
            network,
            scratch: ScratchPool::default(),
            training_in_flight: false,
            disposed: false,
            weight_snapshot,
            weight_changes: 0.0,
            last_activations: None,
            rng: rand::thread_rng(),
        }
    }

    /// Raw action probabilities for a feature vector, recording a diagnostic
    /// activation snapshot on the way through.
    pub fn forward_probs(&mut self, features: ArrayView1<f32>) -> Result<Array1<f32>> {
        if self.disposed {
            return Err(AgentError::EngineDisposed);
        }
        if self.training_in_flight {
            return Err(AgentError::TrainingInProgress);
        }
        if features.len() != FEATURE_LEN {
            return Err(AgentError::dimension_mismatch(
                format!("{} features", FEATURE_LEN),
                format!("{} features", features.len()),
            ));
        }

        // Stage the input through a scratch lease; the buffer returns to the
        // pool when the lease drops, on every exit path.
        let mut staged = self.scratch.lease_1d(FEATURE_LEN);
        staged.assign(&features);
        let (output, trace) = self.network.forward_traced(staged.view());

        if output.iter().any(|v| !v.is_finite()) {
            return Err(AgentError::NumericalError(
                "non-finite action probabilities".to_string(),
            ));
        }

        self.last_activations = Some(NetworkActivations {
            inputs: features.to_owned(),
            layer_outputs: trace,
            weights: self.network.weight_matrices(),
        });

        Ok(output)
    }

    /// Select a boolean action vector. Each output is thresholded at 0.5;
    /// in training mode an exploration roll may substitute a uniform-random
    /// boolean per component. Degrades to the neutral action on any failure.
    pub fn select_action(
        &mut self,
        features: ArrayView1<f32>,
        training: bool,
        exploration_rate: f32,
    ) -> [bool; ACTION_COUNT] {
        let probs = match self.forward_probs(features) {
            Ok(probs) => probs,
            Err(err) => {
                log::debug!("inference unavailable, using neutral action: {}", err);
                return NEUTRAL_ACTION;
            }
        };

        let mut action = NEUTRAL_ACTION;
        for (i, &p) in probs.iter().enumerate().take(ACTION_COUNT) {
            action[i] = if training && self.rng.gen::<f32>() < exploration_rate {
                self.rng.gen_bool(0.5)
            } else {
                p > ACTION_THRESHOLD
            };
        }
        action
    }

    /// Mark a training step as in flight. At most one may be active; while
    /// set, inference short-circuits to the neutral action.
    pub fn begin_training(&mut self) -> Result<()> {
        if self.disposed {
            return Err(AgentError::EngineDisposed);
        }
        if self.training_in_flight {
            return Err(AgentError::TrainingInProgress);
        }
        self.training_in_flight = true;
        Ok(())
    }

    pub fn end_training(&mut self) {
        self.training_in_flight = false;
    }

    pub fn training_in_flight(&self) -> bool {
        self.training_in_flight
    }

    /// Fit one shuffled minibatch. Caller holds the training guard.
    pub fn fit_minibatch(
        &mut self,
        states: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        learning_rate: f32,
    ) -> Result<()> {
        if states.nrows() != targets.nrows() {
            return Err(AgentError::dimension_mismatch(
                format!("{} state rows", states.nrows()),
                format!("{} target rows", targets.nrows()),
            ));
        }
        if states.ncols() != FEATURE_LEN || targets.ncols() != ACTION_COUNT {
            return Err(AgentError::dimension_mismatch(
                format!("{}x{} batch", FEATURE_LEN, ACTION_COUNT),
                format!("{}x{} batch", states.ncols(), targets.ncols()),
            ));
        }
        self.network.train_minibatch(states, targets, learning_rate);
        Ok(())
    }

    /// Mean squared error of current predictions against targets.
    pub fn evaluate_loss(&mut self, states: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32 {
        let predictions = self.network.forward_batch(states);
        (&predictions - &targets)
            .mapv(|x| x * x)
            .mean()
            .unwrap_or(f32::INFINITY)
    }

    /// Mean absolute difference between current weights and the previous
    /// snapshot, averaged across all weight tensors. Updates the snapshot.
    pub fn refresh_weight_delta(&mut self) -> f32 {
        let current = self.network.weight_matrices();
        let mut total = 0.0f32;
        let mut tensors = 0usize;
        for (now, before) in current.iter().zip(self.weight_snapshot.iter()) {
            let mean_abs = (now - before).mapv(f32::abs).mean().unwrap_or(0.0);
            total += mean_abs;
            tensors += 1;
        }
        self.weight_changes = if tensors > 0 {
            total / tensors as f32
        } else {
            0.0
        };
        self.weight_snapshot = current;
        self.weight_changes
    }

    pub fn weight_changes(&self) -> f32 {
        self.weight_changes
    }

    /// Latest activation snapshot, cloned for the caller.
    pub fn network_activations(&self) -> Option<NetworkActivations> {
        self.last_activations.clone()
    }

    /// Tear the engine down. Subsequent inference returns the neutral action.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.last_activations = None;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn scratch_idle_buffers(&self) -> (usize, usize) {
        (self.scratch.idle_1d(), self.scratch.idle_2d())
    }

    #[cfg(test)]
    pub(crate) fn network_mut(&mut self) -> &mut NeuralNetwork {
        &mut self.network
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}
