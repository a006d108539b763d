use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::optimizer::{Optimizer, OptimizerWrapper};

/// A fully connected layer: weights, biases, and an activation function.
/// The forward pass caches its inputs and pre-activation output so a later
/// backward pass can compute gradients.
#[derive(Serialize, Deserialize, Clone)]
pub struct Layer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
    pre_activation_output: Option<Array2<f32>>,
    inputs: Option<Array2<f32>>,
}

impl Layer {
    /// Create a new layer with the given input size, output size, and activation function.
    /// Weights are initialized uniformly in [-0.1, 0.1], biases with zeros.
    pub fn new(input_size: usize, output_size: usize, activation: Activation) -> Self {
        let weights = Array2::random((input_size, output_size), Uniform::new(-0.1, 0.1));
        let biases = Array1::zeros(output_size);
        Layer {
            weights,
            biases,
            activation,
            pre_activation_output: None,
            inputs: None,
        }
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    /// Forward pass for a batch of input vectors.
    fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        self.inputs = Some(inputs.to_owned());
        let mut outputs = inputs.dot(&self.weights) + &self.biases.to_owned().insert_axis(Axis(0));
        self.pre_activation_output = Some(outputs.clone());
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Gradients of weights and biases with respect to the output errors,
    /// via the chain rule through the activation derivative. Returns the
    /// error adjusted for this layer alongside the two gradient arrays.
    fn backward_batch(&self, output_errors: ArrayView2<f32>) -> (Array2<f32>, Array2<f32>, Array1<f32>) {
        let pre_activation_output = self.pre_activation_output.as_ref()
            .expect("No pre-activation output stored. forward_batch() must be called before backward_batch()");
        let inputs = self.inputs.as_ref()
            .expect("No inputs stored. forward_batch() must be called before backward_batch()");

        let activation_deriv = self.activation.derivative_batch(pre_activation_output.view());
        let adjusted_error = output_errors.to_owned() * &activation_deriv;
        let weight_gradients = inputs.t().dot(&adjusted_error);
        let bias_gradients = adjusted_error.sum_axis(Axis(0));

        (adjusted_error, weight_gradients, bias_gradients)
    }
}

/// A feed-forward neural network: an ordered list of layers and an optimizer
/// used to apply gradient updates during training.
#[derive(Serialize, Deserialize, Clone)]
pub struct NeuralNetwork {
    pub layers: Vec<Layer>,
    pub optimizer: OptimizerWrapper,
}

impl NeuralNetwork {
    /// Create a new network from layer sizes and matching activations.
    pub fn new(layer_sizes: &[usize], activations: &[Activation], optimizer: OptimizerWrapper) -> Self {
        assert_eq!(layer_sizes.len() - 1, activations.len());

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| Layer::new(window[0], window[1], activation))
            .collect::<Vec<_>>();

        NeuralNetwork { layers, optimizer }
    }

    /// Forward pass for a single input vector.
    pub fn forward(&mut self, input: ArrayView1<f32>) -> Array1<f32> {
        let input = input.insert_axis(Axis(0));
        let output = self.forward_batch(input.view());
        let output_shape = output.shape()[1];
        output.into_shape((output_shape,)).expect("Failed to remove batch dimension")
    }

    /// Forward pass for a batch of input vectors.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut current_output = inputs.to_owned();
        for layer in &mut self.layers {
            current_output = layer.forward_batch(current_output.view());
        }
        current_output
    }

    /// Forward pass for a single input that also records every layer's
    /// post-activation output, in order. Used for diagnostic snapshots.
    pub fn forward_traced(&mut self, input: ArrayView1<f32>) -> (Array1<f32>, Vec<Array1<f32>>) {
        let mut current = input.to_owned().insert_axis(Axis(0));
        let mut trace = Vec::with_capacity(self.layers.len());
        for layer in &mut self.layers {
            current = layer.forward_batch(current.view());
            let width = current.shape()[1];
            trace.push(
                current
                    .clone()
                    .into_shape((width,))
                    .expect("Failed to remove batch dimension"),
            );
        }
        let output = trace.last().cloned().unwrap_or_else(|| input.to_owned());
        (output, trace)
    }

    /// Backpropagate a batch of output errors through every layer, returning
    /// per-layer (weight, bias) gradients in layer order.
    fn backward_batch(&mut self, output_errors: ArrayView2<f32>) -> Vec<(Array2<f32>, Array1<f32>)> {
        let mut gradients: Vec<(Array2<f32>, Array1<f32>)> = Vec::new();
        let mut current_error = output_errors.to_owned();

        let length = self.layers.len();
        for i in (0..length).rev() {
            let layer = &mut self.layers[i];
            let (adjusted_error, weight_gradients, bias_gradients) = layer.backward_batch(current_error.view());
            gradients.push((weight_gradients, bias_gradients));

            if i != 0 {
                current_error = adjusted_error.dot(&layer.weights.t());
            }
        }

        gradients.reverse();
        gradients
    }

    /// Train the network on one minibatch of inputs and targets, updating
    /// weights and biases through the optimizer.
    pub fn train_minibatch(
        &mut self,
        inputs: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        learning_rate: f32,
    ) {
        let outputs = self.forward_batch(inputs);
        let output_errors = &outputs - &targets;
        let gradients = self.backward_batch(output_errors.view());

        for (i, (layer, (weight_gradients, bias_gradients))) in
            self.layers.iter_mut().zip(gradients).enumerate()
        {
            self.optimizer.update_weights(i, &mut layer.weights, &weight_gradients, learning_rate);
            self.optimizer.update_biases(i, &mut layer.biases, &bias_gradients, learning_rate);
        }
    }

    /// Deep copies of every weight matrix, in layer order.
    pub fn weight_matrices(&self) -> Vec<Array2<f32>> {
        self.layers.iter().map(|layer| layer.weights.clone()).collect()
    }
}
