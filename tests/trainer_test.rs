use minilm::{ModelTrainer, Network, NetworkConfig, TextCorpus};

fn training_corpus() -> TextCorpus {
    let mut corpus = TextCorpus::new();
    corpus.add_sample("alpha beta gamma");
    corpus.add_sample("beta gamma alpha");
    corpus.add_sample("gamma alpha beta");
    corpus
}

#[test]
fn test_train_model_moves_parameters() {
    let corpus = training_corpus();
    let vocab_size = corpus.vocab_size();

    let mut network = Network::with_seed(
        NetworkConfig::new(vec![vocab_size, 4, vocab_size]).with_learning_rate(0.1),
        8,
    )
    .unwrap();

    let snapshots: Vec<_> = network
        .layers
        .iter()
        .map(|l| (l.weights.clone(), l.biases.clone()))
        .collect();

    let mut trainer = ModelTrainer::with_seed(&corpus, &mut network, 16, 13);
    trainer.train_model(3).unwrap();

    for (layer, (w_before, b_before)) in network.layers.iter().zip(snapshots.iter()) {
        let moved = layer
            .weights
            .iter()
            .zip(w_before.iter())
            .any(|(a, b)| a != b)
            || layer.biases.iter().zip(b_before.iter()).any(|(a, b)| a != b);
        assert!(moved, "training left a layer untouched");
    }
}

#[test]
fn test_train_model_skips_single_word_samples() {
    let mut corpus = TextCorpus::new();
    corpus.add_sample("solo");
    let vocab_size = corpus.vocab_size();

    let mut network =
        Network::with_seed(NetworkConfig::new(vec![vocab_size, vocab_size]), 8).unwrap();
    let weights_before = network.layers[0].weights.clone();

    // Every draw hits the one-word sample: no pair, no update, no error.
    let mut trainer = ModelTrainer::with_seed(&corpus, &mut network, 8, 13);
    trainer.train_model(2).unwrap();

    assert_eq!(network.layers[0].weights, weights_before);
}

#[test]
fn test_train_model_with_empty_corpus_is_a_no_op() {
    let corpus = TextCorpus::new();
    let mut network = Network::with_seed(NetworkConfig::new(vec![2, 2]), 8).unwrap();

    let mut trainer = ModelTrainer::with_seed(&corpus, &mut network, 8, 13);
    trainer.train_model(5).unwrap();
}

#[test]
fn test_train_model_learns_a_deterministic_pair() {
    // A single two-word sample: every step trains alpha -> beta.
    let mut corpus = TextCorpus::new();
    corpus.add_sample("alpha beta");
    let vocab_size = corpus.vocab_size();

    let mut network = Network::with_seed(
        NetworkConfig::new(vec![vocab_size, 4, vocab_size]).with_learning_rate(0.5),
        42,
    )
    .unwrap();

    {
        let mut trainer = ModelTrainer::with_seed(&corpus, &mut network, 32, 13);
        trainer.train_model(50).unwrap();
    }

    let input = minilm::one_hot(&corpus, "alpha").unwrap();
    let output = network.predict(&input).unwrap();
    let beta = corpus.word_index("beta").unwrap();
    let max_index = output
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(i, _)| i)
        .unwrap();
    assert_eq!(max_index, beta, "output after training: {output:?}");
}
