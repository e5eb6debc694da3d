use std::fmt;

/// Errors surfaced by the numeric engine and the text generator.
///
/// Unknown words during encoding are deliberately *not* an error: they
/// contribute a zero vector. Unknown vocabulary indices during decoding
/// terminate the decode loop instead of propagating.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A vector's length does not match the dimension the operation
    /// expects. Fatal to the call, never retried.
    ShapeMismatch { expected: usize, actual: usize },
    /// Temperature must be strictly positive.
    InvalidTemperature(f32),
    /// Encoding or decoding against an empty vocabulary.
    EmptyVocabulary,
    /// The embedding table was used before being initialized.
    MissingEmbeddings,
    /// A `NetworkConfig` that cannot describe a network.
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::ShapeMismatch { expected, actual } => {
                write!(f, "shape mismatch: expected {expected} entries, got {actual}")
            }
            ModelError::InvalidTemperature(t) => {
                write!(f, "temperature must be positive, got {t}")
            }
            ModelError::EmptyVocabulary => write!(f, "vocabulary is empty"),
            ModelError::MissingEmbeddings => {
                write!(f, "embedding table has not been initialized")
            }
            ModelError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ModelError {}
