use std::io::Write;

use minilm::{
    load_model_binary, save_model_binary, ModelTrainer, Network, NetworkConfig, TextCorpus,
    TextGenerator, DEFAULT_EMBEDDING_DIM,
};

// Defaults mirror the sizes this model family trains well with on a
// small corpus.
const DEFAULT_CORPUS_PATH: &str = "data/corpus.txt";
const DEFAULT_MODEL_PATH: &str = "model.bin";
const DEFAULT_EPOCHS: usize = 5;
const DEFAULT_BATCH_SIZE: usize = 16;
const HIDDEN_DIM_1: usize = 500;
const HIDDEN_DIM_2: usize = 300;
const CLI_LEARNING_RATE: f32 = 0.005;
const CLI_TEMPERATURE: f32 = 0.75;
const COMPLETION_MAX_TOKENS: usize = 25;

fn parse_str_arg(args: &[String], key: &str) -> Option<String> {
    let prefix = format!("{key}=");
    args.iter()
        .find(|a| a.starts_with(&prefix))
        .map(|a| a[prefix.len()..].to_string())
}

fn parse_usize_arg(args: &[String], key: &str) -> Option<usize> {
    parse_str_arg(args, key).and_then(|v| v.parse().ok())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let corpus_path = parse_str_arg(&args, "corpus").unwrap_or_else(|| DEFAULT_CORPUS_PATH.into());
    let model_path = parse_str_arg(&args, "model").unwrap_or_else(|| DEFAULT_MODEL_PATH.into());
    let epochs = parse_usize_arg(&args, "epochs").unwrap_or(DEFAULT_EPOCHS);
    let batch_size = parse_usize_arg(&args, "batch").unwrap_or(DEFAULT_BATCH_SIZE);

    println!("=====================================");
    println!("minilm | tiny next-word predictor");
    println!("=====================================");

    // === Load corpus ===
    let mut corpus = TextCorpus::new();
    if let Err(e) = corpus.load_text(&corpus_path) {
        eprintln!("Error reading corpus {corpus_path}: {e}");
        return;
    }
    let vocab_size = corpus.vocab_size();
    println!("Corpus: {} samples, vocabulary size {}", corpus.sample_count(), vocab_size);
    if vocab_size == 0 {
        eprintln!("Corpus has no words; nothing to train on.");
        return;
    }

    // === Load a persisted model, or train a new one ===
    let mut network = match load_model_binary(&model_path) {
        Ok(loaded) if loaded.input_dim() == vocab_size => {
            println!("Loaded model from {model_path}");
            Some(loaded)
        }
        Ok(loaded) => {
            log::warn!(
                "model at {} expects input width {} but vocabulary is {}; training fresh",
                model_path,
                loaded.input_dim(),
                vocab_size
            );
            None
        }
        Err(e) => {
            log::info!("no usable model at {model_path} ({e}); training fresh");
            None
        }
    };

    if network.is_none() {
        // Hidden widths are clamped so the backward cascade's delta
        // never arrives narrower than a layer's output.
        let hidden_1 = HIDDEN_DIM_1.min(vocab_size);
        let hidden_2 = HIDDEN_DIM_2.min(hidden_1);
        let shape = vec![vocab_size, hidden_1, hidden_2, vocab_size];
        println!("Training a new model with shape {shape:?}");

        let config = NetworkConfig::new(shape)
            .with_learning_rate(CLI_LEARNING_RATE)
            .with_embedding_size(DEFAULT_EMBEDDING_DIM)
            .with_temperature(CLI_TEMPERATURE);

        let mut fresh = match Network::new(config) {
            Ok(n) => n,
            Err(e) => {
                eprintln!("Error building network: {e}");
                return;
            }
        };
        if let Err(e) = fresh.init_embeddings(vocab_size) {
            eprintln!("Error initializing embeddings: {e}");
            return;
        }
        println!("Total parameters: {}", fresh.total_parameters());

        let mut trainer = ModelTrainer::new(&corpus, &mut fresh, batch_size);
        if let Err(e) = trainer.train_model(epochs) {
            eprintln!("Error during training: {e}");
            return;
        }
        network = Some(fresh);
    }

    let network = match network {
        Some(n) => n,
        None => return,
    };
    let mut generator = TextGenerator::new(&network, &corpus);

    // === Demonstrate completion and generation on corpus text ===
    if let Some(sample) = corpus.sample_at(0) {
        let seed: String = sample.split_whitespace().take(4).collect::<Vec<_>>().join(" ");
        match generator.complete(&seed, COMPLETION_MAX_TOKENS) {
            Ok(text) => println!("\nComplete \"{seed}\" -> {text}"),
            Err(e) => log::error!("completion failed: {e}"),
        }
        match generator.generate(&seed, 12) {
            Ok(text) => println!("Generate \"{seed}\" -> {text}"),
            Err(e) => log::error!("generation failed: {e}"),
        }
    }

    // === Interactive loop ===
    println!("\n--- Interactive mode ---");
    println!("Type text to complete it; 'save' persists the model, 'quit' exits.");

    let mut input = String::new();
    loop {
        input.clear();
        print!("\nEnter text to complete (quit|save): ");
        if std::io::stdout().flush().is_err() {
            break;
        }
        if std::io::stdin().read_line(&mut input).is_err() {
            break;
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") {
            break;
        }
        if trimmed.eq_ignore_ascii_case("save") {
            match save_model_binary(&network, &model_path) {
                Ok(()) => println!("Model saved to {model_path}"),
                Err(e) => eprintln!("Error saving model: {e}"),
            }
            continue;
        }

        match generator.complete(&trimmed.to_lowercase(), COMPLETION_MAX_TOKENS) {
            Ok(text) => println!("\n{text}"),
            Err(e) => eprintln!("Error completing text: {e}"),
        }
    }
}
