use ndarray::{Array1, Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{DqnError, Result};
use crate::layers::DenseLayer;
use crate::optimizer::{Optimizer, OptimizerWrapper};

/// One value matrix per action head, each shaped `(batch, head_cardinality)`.
pub type HeadValues = Vec<Array2<f32>>;

/// Weights and biases of one layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerParams {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

/// A full, verbatim copy of an approximator's trainable parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamSnapshot {
    pub layers: Vec<LayerParams>,
}

/// Contract every action-value approximator must satisfy to plug into the
/// estimator and the TD update.
pub trait QFunction: Send {
    /// Length of the flattened state vector
    fn input_size(&self) -> usize;

    /// Cardinality of each action head, in head order
    fn head_sizes(&self) -> Vec<usize>;

    /// Inference-mode forward pass; nothing is retained for gradients.
    fn predict_batch(&self, states: ArrayView2<f32>) -> Result<HeadValues>;

    /// Forward pass that retains activations for the following `backward_step`.
    fn forward_batch(&mut self, states: ArrayView2<f32>) -> Result<HeadValues>;

    /// Backpropagate `dLoss/dOutput` for every head of the last
    /// `forward_batch` and apply one optimizer update.
    fn backward_step(&mut self, head_gradients: &[Array2<f32>], learning_rate: f32) -> Result<()>;

    fn snapshot(&self) -> ParamSnapshot;

    fn restore(&mut self, snapshot: &ParamSnapshot) -> Result<()>;
}

/// A dense network with a shared trunk and one linear output layer per
/// action head (e.g. `[actions, x, y]`).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MultiHeadNetwork {
    pub trunk: Vec<DenseLayer>,
    pub heads: Vec<DenseLayer>,
    pub optimizer: OptimizerWrapper,
}

impl MultiHeadNetwork {
    /// Create a network with ReLU hidden layers of `hidden_sizes` and a
    /// linear head for each entry of `head_sizes`.
    pub fn new(input_size: usize, hidden_sizes: &[usize], head_sizes: &[usize], optimizer: OptimizerWrapper) -> Result<Self> {
        Self::new_using(input_size, hidden_sizes, head_sizes, optimizer, &mut rand::thread_rng())
    }

    /// Same as `new`, with weights drawn from a seeded generator.
    pub fn new_seeded(input_size: usize, hidden_sizes: &[usize], head_sizes: &[usize], optimizer: OptimizerWrapper, seed: u64) -> Result<Self> {
        Self::new_using(input_size, hidden_sizes, head_sizes, optimizer, &mut StdRng::seed_from_u64(seed))
    }

    fn new_using<R: Rng + ?Sized>(
        input_size: usize,
        hidden_sizes: &[usize],
        head_sizes: &[usize],
        optimizer: OptimizerWrapper,
        rng: &mut R,
    ) -> Result<Self> {
        if input_size == 0 {
            return Err(DqnError::invalid_parameter("input_size", "must be greater than 0"));
        }
        if head_sizes.is_empty() {
            return Err(DqnError::invalid_parameter("head_sizes", "at least one action head is required"));
        }
        if hidden_sizes.iter().chain(head_sizes).any(|&size| size == 0) {
            return Err(DqnError::invalid_parameter("layer sizes", "every layer needs at least one unit"));
        }

        let mut trunk = Vec::with_capacity(hidden_sizes.len());
        let mut width = input_size;
        for &size in hidden_sizes {
            trunk.push(DenseLayer::new(width, size, Activation::Relu, rng));
            width = size;
        }

        let heads = head_sizes
            .iter()
            .map(|&size| DenseLayer::new(width, size, Activation::Linear, rng))
            .collect();

        Ok(MultiHeadNetwork { trunk, heads, optimizer })
    }

    fn layers(&self) -> impl Iterator<Item = &DenseLayer> {
        self.trunk.iter().chain(self.heads.iter())
    }

    fn layers_mut(&mut self) -> impl Iterator<Item = &mut DenseLayer> {
        self.trunk.iter_mut().chain(self.heads.iter_mut())
    }

    fn infer_trunk(&self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        let mut current = states.to_owned();
        for layer in &self.trunk {
            current = layer.infer_batch(current.view())?;
        }
        Ok(current)
    }
}

impl QFunction for MultiHeadNetwork {
    fn input_size(&self) -> usize {
        self.trunk
            .first()
            .or_else(|| self.heads.first())
            .map(|layer| layer.input_size())
            .unwrap_or(0)
    }

    fn head_sizes(&self) -> Vec<usize> {
        self.heads.iter().map(|head| head.output_size()).collect()
    }

    fn predict_batch(&self, states: ArrayView2<f32>) -> Result<HeadValues> {
        let features = self.infer_trunk(states)?;
        self.heads
            .iter()
            .map(|head| head.infer_batch(features.view()))
            .collect()
    }

    fn forward_batch(&mut self, states: ArrayView2<f32>) -> Result<HeadValues> {
        let mut current = states.to_owned();
        for layer in &mut self.trunk {
            current = layer.forward_batch(current.view())?;
        }
        self.heads
            .iter_mut()
            .map(|head| head.forward_batch(current.view()))
            .collect()
    }

    fn backward_step(&mut self, head_gradients: &[Array2<f32>], learning_rate: f32) -> Result<()> {
        if head_gradients.len() != self.heads.len() {
            return Err(DqnError::dimension_mismatch(
                format!("{} head gradients", self.heads.len()),
                format!("{} head gradients", head_gradients.len()),
            ));
        }

        // Gradients are computed against the pre-update weights of every layer
        // before any of them is touched.
        let mut head_grads = Vec::with_capacity(self.heads.len());
        let mut trunk_error: Option<Array2<f32>> = None;
        for (head, output_error) in self.heads.iter().zip(head_gradients) {
            let (adjusted_error, weight_gradients, bias_gradients) = head.backward_batch(output_error.view())?;
            if !self.trunk.is_empty() {
                let error = adjusted_error.dot(&head.weights.t());
                trunk_error = Some(match trunk_error {
                    Some(sum) => sum + &error,
                    None => error,
                });
            }
            head_grads.push((weight_gradients, bias_gradients));
        }

        let mut trunk_grads = Vec::with_capacity(self.trunk.len());
        if let Some(mut current_error) = trunk_error {
            for i in (0..self.trunk.len()).rev() {
                let layer = &self.trunk[i];
                let (adjusted_error, weight_gradients, bias_gradients) = layer.backward_batch(current_error.view())?;
                trunk_grads.push((weight_gradients, bias_gradients));
                if i != 0 {
                    current_error = adjusted_error.dot(&layer.weights.t());
                }
            }
            trunk_grads.reverse();
        }

        self.optimizer.begin_step();
        let gradients = trunk_grads.into_iter().chain(head_grads);
        let optimizer = &mut self.optimizer;
        for (slot, (layer, (weight_gradients, bias_gradients))) in
            self.trunk.iter_mut().chain(self.heads.iter_mut()).zip(gradients).enumerate()
        {
            optimizer.update_weights(slot, &mut layer.weights, &weight_gradients, learning_rate);
            optimizer.update_biases(slot, &mut layer.biases, &bias_gradients, learning_rate);
        }
        Ok(())
    }

    fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            layers: self
                .layers()
                .map(|layer| LayerParams {
                    weights: layer.weights.clone(),
                    biases: layer.biases.clone(),
                })
                .collect(),
        }
    }

    fn restore(&mut self, snapshot: &ParamSnapshot) -> Result<()> {
        let layer_count = self.trunk.len() + self.heads.len();
        if snapshot.layers.len() != layer_count {
            return Err(DqnError::dimension_mismatch(
                format!("{} layers", layer_count),
                format!("{} layers", snapshot.layers.len()),
            ));
        }
        for (layer, params) in self.layers().zip(&snapshot.layers) {
            if layer.weights.dim() != params.weights.dim() || layer.biases.len() != params.biases.len() {
                return Err(DqnError::dimension_mismatch(
                    format!("{:?}", layer.weights.dim()),
                    format!("{:?}", params.weights.dim()),
                ));
            }
        }
        for (layer, params) in self.layers_mut().zip(&snapshot.layers) {
            layer.weights.assign(&params.weights);
            layer.biases.assign(&params.biases);
        }
        Ok(())
    }
}
