use std::fs;

use minilm::{
    load_model_auto, load_model_binary, load_model_json, save_model_binary, save_model_json,
    Network, NetworkConfig,
};
use ndarray::array;

fn trained_network() -> Network {
    let mut network = Network::with_seed(
        NetworkConfig::new(vec![4, 3, 4])
            .with_learning_rate(0.05)
            .with_embedding_size(6)
            .with_temperature(0.8),
        17,
    )
    .unwrap();
    network.init_embeddings(4).unwrap();

    // A few steps so the saved parameters are not just the init.
    for _ in 0..10 {
        network
            .train(&array![1.0f32, 0.0, 0.0, 0.0], &array![0.0f32, 1.0, 0.0, 0.0])
            .unwrap();
    }
    network
}

fn assert_same_predictions(a: &Network, b: &Network) {
    let input = array![1.0f32, 0.0, 1.0, 0.0];
    let out_a = a.predict(&input).unwrap();
    let out_b = b.predict(&input).unwrap();
    for (x, y) in out_a.iter().zip(out_b.iter()) {
        assert!((x - y).abs() < 1e-7, "predictions diverged after reload");
    }
}

#[test]
fn test_binary_round_trip() {
    fs::create_dir_all("test_models").unwrap();
    let path = "test_models/model.bin";

    let network = trained_network();
    save_model_binary(&network, path).unwrap();
    assert!(std::path::Path::new(path).exists());

    let loaded = load_model_binary(path).unwrap();
    assert_eq!(loaded.layers.len(), network.layers.len());
    assert_eq!(loaded.input_dim(), network.input_dim());
    assert_eq!(loaded.output_dim(), network.output_dim());
    assert_eq!(loaded.total_parameters(), network.total_parameters());
    assert!((loaded.temperature - 0.8).abs() < 1e-6);
    assert_eq!(loaded.embedding_size, Some(6));
    assert!(loaded.embeddings.is_some());
    assert_same_predictions(&network, &loaded);

    let _ = fs::remove_file(path);
    let _ = fs::remove_dir("test_models");
}

#[test]
fn test_json_round_trip() {
    fs::create_dir_all("test_models_json").unwrap();
    let path = "test_models_json/model.json";

    let network = trained_network();
    save_model_json(&network, path).unwrap();

    let loaded = load_model_json(path).unwrap();
    assert_eq!(loaded.layers.len(), network.layers.len());
    assert_same_predictions(&network, &loaded);

    let _ = fs::remove_file(path);
    let _ = fs::remove_dir("test_models_json");
}

#[test]
fn test_load_auto_picks_format_by_extension() {
    fs::create_dir_all("test_models_auto").unwrap();
    let bin_path = "test_models_auto/model.bin";
    let json_path = "test_models_auto/model.json";

    let network = trained_network();
    save_model_binary(&network, bin_path).unwrap();
    save_model_json(&network, json_path).unwrap();

    let from_bin = load_model_auto(bin_path).unwrap();
    let from_json = load_model_auto(json_path).unwrap();
    assert_same_predictions(&from_bin, &from_json);

    let _ = fs::remove_file(bin_path);
    let _ = fs::remove_file(json_path);
    let _ = fs::remove_dir("test_models_auto");
}

#[test]
fn test_load_failure_is_reported() {
    assert!(load_model_binary("test_models/no_such_model.bin").is_err());
    assert!(load_model_json("test_models/no_such_model.json").is_err());
}
