//! # minilm - a tiny next-word predictor built from scratch
//!
//! A feed-forward sigmoid network with hand-written backpropagation,
//! trained to predict the next word over a small text corpus, plus a
//! decoding/sampling layer that turns network outputs back into words.
//! Only `ndarray` is used for the numerics; there is no autograd, no
//! computation graph and no batching - every training call is a single
//! stochastic gradient step.
//!
//! ## Module organization
//!
//! - `dense_layer`: one affine transform + sigmoid, with forward,
//!   gradient/update and error-propagation passes
//! - `network`: chains layers into a topology, drives the reverse
//!   backpropagation cascade, owns the optional embedding table
//! - `generator`: encodes words into vectors, turns raw outputs into a
//!   temperature-scaled distribution, samples or greedily decodes words
//! - `corpus`: text samples, normalization and the vocabulary
//! - `trainer`: batch-sampling training driver
//! - `model_serialization`: save/load of a whole network (bincode/JSON)
//! - `utils`: sigmoid and softmax helpers shared across modules
//!
//! The `Network` is *not* thread-safe: `train` mutates the same
//! parameters `predict` reads, so concurrent callers must serialize
//! access behind one exclusive lock.

pub mod corpus;
pub mod dense_layer;
pub mod error;
pub mod generator;
pub mod model_serialization;
pub mod network;
pub mod trainer;
pub mod utils;

pub use corpus::TextCorpus;
pub use dense_layer::{DenseLayer, ForwardCache};
pub use error::{ModelError, Result};
pub use generator::{bag_of_words, one_hot, TextGenerator};
pub use model_serialization::{
    load_model_auto, load_model_binary, load_model_json, save_model_binary, save_model_json,
};
pub use network::{Network, NetworkConfig};
pub use trainer::ModelTrainer;

/// Learning rate used when a `NetworkConfig` does not override it.
pub const DEFAULT_LEARNING_RATE: f32 = 0.01;

/// Temperature used when a `NetworkConfig` does not override it.
/// 1.0 leaves the softmax unscaled.
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Width of a word-embedding row when embeddings are enabled.
pub const DEFAULT_EMBEDDING_DIM: usize = 150;

/// Number of candidates the generation loop samples from at each step.
pub const GENERATION_TOP_K: usize = 10;
