//! Model persistence in two formats:
//!
//! 1. **Binary** (bincode): compact and fast, the format the CLI saves.
//! 2. **JSON** (serde_json): human-readable, handy for inspecting
//!    weights or loading from other tooling.
//!
//! Every matrix is stored as a shape tuple plus a flat `Vec<f32>`;
//! non-finite values are scrubbed to zero on the way out. A failed load
//! returns the error without touching any in-memory network, so callers
//! can fall back to fresh initialization.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use bincode::{Decode, Encode};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::dense_layer::DenseLayer;
use crate::network::Network;

const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Clone, Encode, Decode, Serialize, Deserialize)]
pub struct SerializableDenseLayer {
    pub weights_shape: (usize, usize),
    pub weights_data: Vec<f32>,
    pub biases_data: Vec<f32>,
    pub learning_rate: f32,
}

impl SerializableDenseLayer {
    fn from_layer(layer: &DenseLayer) -> Self {
        SerializableDenseLayer {
            weights_shape: layer.weights.dim(),
            weights_data: layer
                .weights
                .iter()
                .map(|&x| if x.is_finite() { x } else { 0.0 })
                .collect(),
            biases_data: layer
                .biases
                .iter()
                .map(|&x| if x.is_finite() { x } else { 0.0 })
                .collect(),
            learning_rate: layer.learning_rate,
        }
    }

    fn to_layer(&self) -> DenseLayer {
        let weights = match Array2::from_shape_vec(self.weights_shape, self.weights_data.clone()) {
            Ok(arr) => arr,
            Err(e) => {
                log::error!("failed to reconstruct layer weights: {e}");
                Array2::zeros(self.weights_shape)
            }
        };

        DenseLayer {
            weights,
            biases: Array1::from_vec(self.biases_data.clone()),
            learning_rate: self.learning_rate,
        }
    }
}

#[derive(Clone, Encode, Decode, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub input_dim: usize,
    pub output_dim: usize,
    pub layer_count: usize,
}

#[derive(Clone, Encode, Decode, Serialize, Deserialize)]
pub struct SerializableModel {
    pub version: u32,
    pub layers: Vec<SerializableDenseLayer>,
    pub embeddings_shape: Option<(usize, usize)>,
    pub embeddings_data: Option<Vec<f32>>,
    pub learning_rate: f32,
    pub temperature: f32,
    pub embedding_size: Option<usize>,
    pub metadata: ModelMetadata,
}

impl SerializableModel {
    fn from_network(network: &Network) -> Self {
        SerializableModel {
            version: MODEL_FORMAT_VERSION,
            layers: network
                .layers
                .iter()
                .map(SerializableDenseLayer::from_layer)
                .collect(),
            embeddings_shape: network.embeddings.as_ref().map(|e| e.dim()),
            embeddings_data: network.embeddings.as_ref().map(|e| {
                e.iter()
                    .map(|&x| if x.is_finite() { x } else { 0.0 })
                    .collect()
            }),
            learning_rate: network.learning_rate,
            temperature: network.temperature,
            embedding_size: network.embedding_size,
            metadata: ModelMetadata {
                input_dim: network.input_dim(),
                output_dim: network.output_dim(),
                layer_count: network.layers.len(),
            },
        }
    }

    fn to_network(&self) -> Network {
        let layers = self.layers.iter().map(|l| l.to_layer()).collect();

        let embeddings = match (&self.embeddings_shape, &self.embeddings_data) {
            (Some(shape), Some(data)) => match Array2::from_shape_vec(*shape, data.clone()) {
                Ok(arr) => Some(arr),
                Err(e) => {
                    log::error!("failed to reconstruct embedding table: {e}");
                    None
                }
            },
            _ => None,
        };

        Network::from_parts(
            layers,
            embeddings,
            self.learning_rate,
            self.temperature,
            self.embedding_size,
        )
    }
}

/// Saves a network to a bincode file.
pub fn save_model_binary<P: AsRef<Path>>(
    network: &Network,
    path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let serializable = SerializableModel::from_network(network);

    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    let config = bincode::config::standard();
    bincode::encode_into_std_write(&serializable, &mut writer, config)?;

    log::info!(
        "saved model to {:?} ({} layers, {} parameters)",
        path.as_ref(),
        network.layers.len(),
        network.total_parameters()
    );
    Ok(())
}

/// Loads a network from a bincode file.
pub fn load_model_binary<P: AsRef<Path>>(path: P) -> Result<Network, Box<dyn std::error::Error>> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);
    let config = bincode::config::standard();
    let serializable: SerializableModel = bincode::decode_from_std_read(&mut reader, config)?;

    let network = serializable.to_network();
    log::info!(
        "loaded model from {:?} (version {}, {} layers)",
        path.as_ref(),
        serializable.version,
        network.layers.len()
    );
    Ok(network)
}

/// Saves a network to a pretty-printed JSON file.
pub fn save_model_json<P: AsRef<Path>>(
    network: &Network,
    path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let serializable = SerializableModel::from_network(network);

    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &serializable)?;

    log::info!("saved model to {:?} (json)", path.as_ref());
    Ok(())
}

/// Loads a network from a JSON file.
pub fn load_model_json<P: AsRef<Path>>(path: P) -> Result<Network, Box<dyn std::error::Error>> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let serializable: SerializableModel = serde_json::from_reader(reader)?;

    let network = serializable.to_network();
    log::info!(
        "loaded model from {:?} (version {}, json)",
        path.as_ref(),
        serializable.version
    );
    Ok(network)
}

/// Picks the loader from the file extension: `.json` loads JSON,
/// anything else loads binary.
pub fn load_model_auto<P: AsRef<Path>>(path: P) -> Result<Network, Box<dyn std::error::Error>> {
    let is_json = path
        .as_ref()
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        load_model_json(path)
    } else {
        load_model_binary(path)
    }
}
