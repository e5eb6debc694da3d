//! A fully-connected layer: one affine transform plus a sigmoid
//! nonlinearity, with hand-written forward, gradient and
//! error-propagation passes.
//!
//! Forward state is an explicit [`ForwardCache`] value returned by
//! [`DenseLayer::forward`] and handed back into the backward passes.
//! The layer itself holds no hidden mutable state between calls, so one
//! layer can serve several in-flight forward/backward pairs as long as
//! each pair keeps its own cache.

use ndarray::{Array1, Array2};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::error::{ModelError, Result};
use crate::utils::{sigmoid, sigmoid_derivative};

/// Input and post-activation output of one forward pass, kept together
/// so the backward passes can be evaluated against exactly the values
/// that produced them.
#[derive(Debug, Clone)]
pub struct ForwardCache {
    pub input: Array1<f32>,
    pub output: Array1<f32>,
}

/// One dense layer: `output_i = sigmoid(sum_j w[i][j] * input[j] + b[i])`.
///
/// `weights` is output_dim x input_dim; row `i` holds the incoming
/// weights of output unit `i`.
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub learning_rate: f32,
}

impl DenseLayer {
    /// Creates a layer with weights and biases drawn uniformly from
    /// [0, 1). Random initialization keeps the units from all learning
    /// the same features.
    pub fn new(output_dim: usize, input_dim: usize, learning_rate: f32, rng: &mut impl Rng) -> Self {
        let uniform = Uniform::new(0.0f32, 1.0).ok();

        let (weights, biases) = if let Some(dist) = uniform {
            (
                Array2::from_shape_fn((output_dim, input_dim), |_| dist.sample(rng)),
                Array1::from_shape_fn(output_dim, |_| dist.sample(rng)),
            )
        } else {
            log::warn!("DenseLayer: uniform distribution construction failed, sampling directly");
            (
                Array2::from_shape_fn((output_dim, input_dim), |_| rng.random_range(0.0..1.0)),
                Array1::from_shape_fn(output_dim, |_| rng.random_range(0.0..1.0)),
            )
        };

        DenseLayer {
            weights,
            biases,
            learning_rate,
        }
    }

    pub fn input_dim(&self) -> usize {
        self.weights.ncols()
    }

    pub fn output_dim(&self) -> usize {
        self.weights.nrows()
    }

    pub fn parameters(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    /// Computes the weighted sums plus biases, applies the sigmoid and
    /// returns the (input, output) pair for the backward passes.
    ///
    /// Fails with `ShapeMismatch` when `input` does not have exactly
    /// `input_dim` entries.
    pub fn forward(&self, input: &Array1<f32>) -> Result<ForwardCache> {
        if input.len() != self.input_dim() {
            return Err(ModelError::ShapeMismatch {
                expected: self.input_dim(),
                actual: input.len(),
            });
        }

        let z = self.weights.dot(input) + &self.biases;
        let output = z.mapv(sigmoid);

        Ok(ForwardCache {
            input: input.clone(),
            output,
        })
    }

    /// Computes the parameter gradients for an upstream delta and
    /// applies them immediately (no separate apply step, no optimizer
    /// state).
    ///
    /// For each output unit `i` the local gradient is
    /// `g_i = delta_i * output_i * (1 - output_i)`; the weight gradient
    /// is `g_i * input_j` and the bias gradient is `g_i`. Updates are
    /// additive (`+=` scaled by the learning rate): the caller supplies
    /// `delta = target - output` at the top, so this ascends the
    /// negative squared error.
    ///
    /// The delta threaded through the reverse cascade keeps the width of
    /// the layer it started from, so `delta` may be wider than this
    /// layer; only the first `output_dim` entries are consumed. Fewer
    /// entries than `output_dim` is a `ShapeMismatch`.
    ///
    /// Returns the applied (weight, bias) gradients.
    pub fn backward(
        &mut self,
        cache: &ForwardCache,
        delta: &Array1<f32>,
    ) -> Result<(Array2<f32>, Array1<f32>)> {
        self.check_delta(delta)?;

        let mut weight_gradients = Array2::<f32>::zeros(self.weights.raw_dim());
        let mut bias_gradients = Array1::<f32>::zeros(self.output_dim());

        for i in 0..self.output_dim() {
            let g = delta[i] * sigmoid_derivative(cache.output[i]);
            for j in 0..self.input_dim() {
                weight_gradients[[i, j]] = g * cache.input[j];
            }
            bias_gradients[i] = g;
        }

        self.weights.scaled_add(self.learning_rate, &weight_gradients);
        self.biases.scaled_add(self.learning_rate, &bias_gradients);

        Ok((weight_gradients, bias_gradients))
    }

    /// Returns the delta to hand to the previous layer:
    /// `prev_j = sum_i delta_i * w[i][j] * output_i * (1 - output_i)`.
    ///
    /// Must be called before `backward` mutates the weights for the same
    /// step; the training cascade in `Network::train` orders the calls
    /// accordingly.
    pub fn propagate_error(&self, cache: &ForwardCache, delta: &Array1<f32>) -> Result<Array1<f32>> {
        self.check_delta(delta)?;

        let mut previous = Array1::<f32>::zeros(self.input_dim());
        for i in 0..self.output_dim() {
            let g = delta[i] * sigmoid_derivative(cache.output[i]);
            for j in 0..self.input_dim() {
                previous[j] += g * self.weights[[i, j]];
            }
        }

        Ok(previous)
    }

    fn check_delta(&self, delta: &Array1<f32>) -> Result<()> {
        if delta.len() < self.output_dim() {
            return Err(ModelError::ShapeMismatch {
                expected: self.output_dim(),
                actual: delta.len(),
            });
        }
        Ok(())
    }
}
