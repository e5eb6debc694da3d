use minilm::{ModelError, Network, NetworkConfig};
use ndarray::array;

#[test]
fn test_config_defaults() {
    let config = NetworkConfig::new(vec![4, 3, 4]);
    assert!((config.learning_rate - 0.01).abs() < 1e-9);
    assert!((config.temperature - 1.0).abs() < 1e-9);
    assert_eq!(config.embedding_size, None);
}

#[test]
fn test_config_validation() {
    assert!(matches!(
        Network::new(NetworkConfig::new(vec![4])),
        Err(ModelError::InvalidConfig(_))
    ));
    assert!(matches!(
        Network::new(NetworkConfig::new(vec![4, 0, 4])),
        Err(ModelError::InvalidConfig(_))
    ));
    assert!(matches!(
        Network::new(NetworkConfig::new(vec![4, 3]).with_learning_rate(0.0)),
        Err(ModelError::InvalidConfig(_))
    ));
    assert!(matches!(
        Network::new(NetworkConfig::new(vec![4, 3]).with_temperature(-1.0)),
        Err(ModelError::InvalidTemperature(_))
    ));
}

#[test]
fn test_topology_from_shape() {
    let network = Network::with_seed(NetworkConfig::new(vec![4, 3, 4]), 1).unwrap();
    assert_eq!(network.layers.len(), 2);
    assert_eq!(network.layers[0].input_dim(), 4);
    assert_eq!(network.layers[0].output_dim(), 3);
    assert_eq!(network.layers[1].input_dim(), 3);
    assert_eq!(network.layers[1].output_dim(), 4);
    assert_eq!(network.input_dim(), 4);
    assert_eq!(network.output_dim(), 4);
}

#[test]
fn test_error_is_antisymmetric() {
    let a = array![0.2f32, 0.9, -0.4];
    let b = array![1.0f32, 0.1, 0.3];

    let ab = Network::error(&a, &b).unwrap();
    let ba = Network::error(&b, &a).unwrap();
    for (x, y) in ab.iter().zip(ba.iter()) {
        assert!((x + y).abs() < 1e-6);
    }
}

#[test]
fn test_error_rejects_length_mismatch() {
    let a = array![0.2f32, 0.9];
    let b = array![1.0f32, 0.1, 0.3];
    assert_eq!(
        Network::error(&a, &b).unwrap_err(),
        ModelError::ShapeMismatch {
            expected: 2,
            actual: 3
        }
    );
}

#[test]
fn test_predict_shape_and_range() {
    let network = Network::with_seed(NetworkConfig::new(vec![5, 4, 3]), 2).unwrap();
    let output = network.predict(&array![1.0f32, 0.0, -1.0, 2.0, 0.5]).unwrap();

    assert_eq!(output.len(), 3);
    for &y in output.iter() {
        assert!(y > 0.0 && y < 1.0);
    }
}

#[test]
fn test_train_updates_every_layer() {
    let mut network = Network::with_seed(
        NetworkConfig::new(vec![4, 3, 4]).with_learning_rate(0.1),
        3,
    )
    .unwrap();

    let snapshots: Vec<_> = network
        .layers
        .iter()
        .map(|l| (l.weights.clone(), l.biases.clone()))
        .collect();

    network
        .train(&array![1.0f32, 1.0, 1.0, 1.0], &array![1.0f32, 0.0, 1.0, 0.0])
        .unwrap();

    for (layer, (w_before, b_before)) in network.layers.iter().zip(snapshots.iter()) {
        let w_moved = layer
            .weights
            .iter()
            .zip(w_before.iter())
            .any(|(a, b)| (a - b).abs() > 0.0);
        let b_moved = layer
            .biases
            .iter()
            .zip(b_before.iter())
            .any(|(a, b)| (a - b).abs() > 0.0);
        assert!(w_moved && b_moved, "a layer was not updated by train");
    }
}

#[test]
fn test_train_converges_on_fixed_pair() {
    let mut network = Network::with_seed(
        NetworkConfig::new(vec![4, 3, 4]).with_learning_rate(0.5),
        42,
    )
    .unwrap();

    let input = array![1.0f32, 0.0, 0.0, 0.0];
    let target = array![0.0f32, 1.0, 0.0, 0.0];

    for _ in 0..2000 {
        network.train(&input, &target).unwrap();
    }

    let output = network.predict(&input).unwrap();
    let max_index = output
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(i, _)| i)
        .unwrap();
    assert_eq!(max_index, 1, "output after training: {output:?}");
}

#[test]
fn test_embedding_table() {
    let mut network =
        Network::with_seed(NetworkConfig::new(vec![4, 4]).with_embedding_size(8), 4).unwrap();

    // Lookup before initialization is a domain error.
    assert!(matches!(
        network.word_embedding(0),
        Err(ModelError::MissingEmbeddings)
    ));

    network.init_embeddings(5).unwrap();
    let row = network.word_embedding(3).unwrap();
    assert_eq!(row.len(), 8);

    assert!(matches!(
        network.word_embedding(9),
        Err(ModelError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_init_embeddings_requires_configured_size() {
    let mut network = Network::with_seed(NetworkConfig::new(vec![4, 4]), 5).unwrap();
    assert!(matches!(
        network.init_embeddings(5),
        Err(ModelError::InvalidConfig(_))
    ));
}
