//! Network-level orchestration: an ordered sequence of dense layers,
//! end-to-end prediction, the reverse training cascade and the optional
//! word-embedding side table.

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Uniform};

use crate::dense_layer::{DenseLayer, ForwardCache};
use crate::error::{ModelError, Result};
use crate::{DEFAULT_LEARNING_RATE, DEFAULT_TEMPERATURE};

/// Everything needed to build a [`Network`].
///
/// Only the layer shape is required; the rest has defaults. The shape
/// `[n0, n1, ..., nk]` yields `k` layers where layer `m` maps `n(m)`
/// inputs to `n(m+1)` outputs.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub layer_shape: Vec<usize>,
    pub learning_rate: f32,
    pub embedding_size: Option<usize>,
    pub temperature: f32,
}

impl NetworkConfig {
    pub fn new(layer_shape: Vec<usize>) -> Self {
        NetworkConfig {
            layer_shape,
            learning_rate: DEFAULT_LEARNING_RATE,
            embedding_size: None,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_embedding_size(mut self, embedding_size: usize) -> Self {
        self.embedding_size = Some(embedding_size);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.layer_shape.len() < 2 {
            return Err(ModelError::InvalidConfig(format!(
                "layer_shape needs at least an input and an output width, got {:?}",
                self.layer_shape
            )));
        }
        if self.layer_shape.iter().any(|&n| n == 0) {
            return Err(ModelError::InvalidConfig(
                "layer widths must be non-zero".to_string(),
            ));
        }
        if self.learning_rate <= 0.0 {
            return Err(ModelError::InvalidConfig(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.temperature <= 0.0 {
            return Err(ModelError::InvalidTemperature(self.temperature));
        }
        if self.embedding_size == Some(0) {
            return Err(ModelError::InvalidConfig(
                "embedding size must be non-zero when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// A feed-forward network over [`DenseLayer`]s.
///
/// The topology is fixed at construction; only the parameters inside
/// the layers (and the embedding table, if initialized) mutate
/// afterwards. Not thread-safe: `train` mutates the parameters
/// `predict` reads.
pub struct Network {
    pub layers: Vec<DenseLayer>,
    /// vocab_size x embedding_dim, row `i` = embedding of word index
    /// `i`. Initialized once via [`Network::init_embeddings`], never
    /// gradient-updated.
    pub embeddings: Option<Array2<f32>>,
    pub learning_rate: f32,
    pub temperature: f32,
    pub embedding_size: Option<usize>,
    rng: StdRng,
}

impl Network {
    /// Builds the layered topology from a config, seeding the
    /// pseudo-random source from the OS.
    pub fn new(config: NetworkConfig) -> Result<Self> {
        Self::build(config, StdRng::from_os_rng())
    }

    /// Like [`Network::new`] with a fixed seed, for reproducible
    /// initialization.
    pub fn with_seed(config: NetworkConfig, seed: u64) -> Result<Self> {
        Self::build(config, StdRng::seed_from_u64(seed))
    }

    /// Reassembles a network from already-built parts. Used by model
    /// deserialization, which restores parameters verbatim.
    pub(crate) fn from_parts(
        layers: Vec<DenseLayer>,
        embeddings: Option<Array2<f32>>,
        learning_rate: f32,
        temperature: f32,
        embedding_size: Option<usize>,
    ) -> Self {
        Network {
            layers,
            embeddings,
            learning_rate,
            temperature,
            embedding_size,
            rng: StdRng::from_os_rng(),
        }
    }

    fn build(config: NetworkConfig, mut rng: StdRng) -> Result<Self> {
        config.validate()?;

        let mut layers = Vec::with_capacity(config.layer_shape.len() - 1);
        for pair in config.layer_shape.windows(2) {
            layers.push(DenseLayer::new(pair[1], pair[0], config.learning_rate, &mut rng));
        }

        Ok(Network {
            layers,
            embeddings: None,
            learning_rate: config.learning_rate,
            temperature: config.temperature,
            embedding_size: config.embedding_size,
            rng,
        })
    }

    /// Width of the input vector the first layer expects.
    pub fn input_dim(&self) -> usize {
        self.layers[0].input_dim()
    }

    /// Width of the final layer's output.
    pub fn output_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].output_dim()
    }

    pub fn total_parameters(&self) -> usize {
        self.layers.iter().map(|l| l.parameters()).sum()
    }

    /// Allocates and fills the embedding table with one uniformly
    /// initialized row per vocabulary index. Requires the config to
    /// have named an embedding size.
    pub fn init_embeddings(&mut self, vocab_size: usize) -> Result<()> {
        let embedding_size = self.embedding_size.ok_or_else(|| {
            ModelError::InvalidConfig("config has no embedding size".to_string())
        })?;

        let uniform = Uniform::new(0.0f32, 1.0).ok();
        let rng = &mut self.rng;
        let table = if let Some(dist) = uniform {
            Array2::from_shape_fn((vocab_size, embedding_size), |_| dist.sample(rng))
        } else {
            log::warn!("Network: uniform distribution construction failed, sampling directly");
            Array2::from_shape_fn((vocab_size, embedding_size), |_| rng.random_range(0.0..1.0))
        };

        self.embeddings = Some(table);
        Ok(())
    }

    /// Looks up the embedding row of a vocabulary index.
    ///
    /// Fails with `MissingEmbeddings` before [`Network::init_embeddings`]
    /// has run, and with `ShapeMismatch` for an index outside the table.
    pub fn word_embedding(&self, index: usize) -> Result<ArrayView1<'_, f32>> {
        let table = self.embeddings.as_ref().ok_or(ModelError::MissingEmbeddings)?;
        if index >= table.nrows() {
            return Err(ModelError::ShapeMismatch {
                expected: table.nrows(),
                actual: index,
            });
        }
        Ok(table.row(index))
    }

    /// Chains every layer's forward pass and returns the final output.
    pub fn predict(&self, input: &Array1<f32>) -> Result<Array1<f32>> {
        let mut caches = self.forward_trace(input)?;
        match caches.pop() {
            Some(cache) => Ok(cache.output),
            // config validation guarantees at least one layer
            None => Err(ModelError::InvalidConfig("network has no layers".to_string())),
        }
    }

    /// Elementwise `target - output`. Antisymmetric; fails with
    /// `ShapeMismatch` when the lengths differ.
    pub fn error(output: &Array1<f32>, target: &Array1<f32>) -> Result<Array1<f32>> {
        if output.len() != target.len() {
            return Err(ModelError::ShapeMismatch {
                expected: output.len(),
                actual: target.len(),
            });
        }
        Ok(target - output)
    }

    /// One stochastic gradient step on a single (input, target) pair.
    ///
    /// Runs the forward chain, computes the top-level delta
    /// `target - output`, then walks the layers newest-to-oldest: each
    /// layer applies its update from the current delta, and the delta
    /// handed further back is the previous layer's `propagate_error`
    /// evaluated against that same vector - a strict one-pass reverse
    /// cascade, each `propagate_error` seeing its layer's weights
    /// before that layer's own update.
    pub fn train(&mut self, input: &Array1<f32>, target: &Array1<f32>) -> Result<()> {
        let caches = self.forward_trace(input)?;
        let output = &caches[caches.len() - 1].output;
        let mut delta = Self::error(output, target)?;

        for i in (0..self.layers.len()).rev() {
            self.layers[i].backward(&caches[i], &delta)?;
            if i > 0 {
                delta = self.layers[i - 1].propagate_error(&caches[i - 1], &delta)?;
            }
        }

        Ok(())
    }

    fn forward_trace(&self, input: &Array1<f32>) -> Result<Vec<ForwardCache>> {
        let mut caches = Vec::with_capacity(self.layers.len());
        let mut current = input.clone();

        for layer in &self.layers {
            let cache = layer.forward(&current)?;
            current = cache.output.clone();
            caches.push(cache);
        }

        Ok(caches)
    }
}
