//! Text generation on top of a trained [`Network`]: word/sequence
//! encodings, temperature-scaled prediction, top-k sampling, greedy
//! decoding with exclusion, and the iterative generate/complete loops.
//!
//! Encoding policy: sequences are encoded as bag-of-words vectors
//! (vocab_size entries, additive counts), which keeps every encoding the
//! width the network's input layer expects. The embedding-concatenation
//! encoding over the network's embedding table is available separately
//! as [`TextGenerator::encode_embeddings`] but is not what the
//! generation loops feed the network.

use std::cmp::Ordering;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::corpus::TextCorpus;
use crate::error::{ModelError, Result};
use crate::network::Network;
use crate::utils::softmax_with_temperature;
use crate::GENERATION_TOP_K;

/// One-hot vector over the vocabulary for a single word.
///
/// Unknown words are not an error: they yield the all-zero vector.
/// Fails with `EmptyVocabulary` when there is nothing to encode
/// against.
pub fn one_hot(corpus: &TextCorpus, word: &str) -> Result<Array1<f32>> {
    if corpus.vocab_size() == 0 {
        return Err(ModelError::EmptyVocabulary);
    }

    let mut vector = Array1::zeros(corpus.vocab_size());
    if let Some(index) = corpus.word_index(word) {
        vector[index] = 1.0;
    }
    Ok(vector)
}

/// Bag-of-words vector for a whitespace-split text: the sum of the
/// per-word one-hot encodings, so repeated words accumulate counts.
/// Unknown words contribute nothing.
pub fn bag_of_words(corpus: &TextCorpus, text: &str) -> Result<Array1<f32>> {
    if corpus.vocab_size() == 0 {
        return Err(ModelError::EmptyVocabulary);
    }

    let mut vector = Array1::zeros(corpus.vocab_size());
    for word in text.split_whitespace() {
        if let Some(index) = corpus.word_index(word) {
            vector[index] += 1.0;
        }
    }
    Ok(vector)
}

/// Drives prediction and decoding against a network and its corpus.
///
/// Owns its own pseudo-random source; sampling is the only
/// intentionally non-deterministic operation, and a fixed seed makes it
/// reproducible.
pub struct TextGenerator<'a> {
    network: &'a Network,
    corpus: &'a TextCorpus,
    temperature: f32,
    rng: StdRng,
}

impl<'a> TextGenerator<'a> {
    /// Ties a generator to a network and corpus, inheriting the
    /// network's configured temperature.
    pub fn new(network: &'a Network, corpus: &'a TextCorpus) -> Self {
        TextGenerator {
            network,
            corpus,
            temperature: network.temperature,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Like [`TextGenerator::new`] with a fixed sampling seed.
    pub fn with_seed(network: &'a Network, corpus: &'a TextCorpus, seed: u64) -> Self {
        TextGenerator {
            network,
            corpus,
            temperature: network.temperature,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// One-hot encoding of a single word (see [`one_hot`]).
    pub fn encode_one_hot(&self, word: &str) -> Result<Array1<f32>> {
        one_hot(self.corpus, word)
    }

    /// Bag-of-words encoding of a whitespace-split text (see
    /// [`bag_of_words`]). This is the encoding the generation loops use.
    pub fn encode_sequence(&self, text: &str) -> Result<Array1<f32>> {
        bag_of_words(self.corpus, text)
    }

    /// Concatenation of the embedding rows of each word in the text,
    /// `embedding_dim * word_count` entries long. Unknown words leave
    /// their block zeroed. Requires the network's embedding table.
    pub fn encode_embeddings(&self, text: &str) -> Result<Array1<f32>> {
        if self.corpus.vocab_size() == 0 {
            return Err(ModelError::EmptyVocabulary);
        }
        let embedding_size = self
            .network
            .embedding_size
            .ok_or(ModelError::MissingEmbeddings)?;

        let words: Vec<&str> = text.split_whitespace().collect();
        let mut encoded = Array1::zeros(embedding_size * words.len());

        for (i, word) in words.iter().enumerate() {
            if let Some(index) = self.corpus.word_index(word) {
                let row = self.network.word_embedding(index)?;
                let offset = i * embedding_size;
                for (j, &value) in row.iter().enumerate() {
                    encoded[offset + j] = value;
                }
            }
        }

        Ok(encoded)
    }

    /// Runs the network on an encoded input and converts the raw output
    /// into a temperature-scaled probability distribution.
    pub fn predict_next(&self, encoded: &Array1<f32>) -> Result<Array1<f32>> {
        let output = self.network.predict(encoded)?;
        softmax_with_temperature(&output, self.temperature)
    }

    /// Samples an index from the `k` highest-probability entries of a
    /// distribution.
    ///
    /// Ties are broken by original index order (first seen wins). The
    /// top-k probabilities are renormalized and a uniform draw in
    /// [0, 1) picks the first candidate whose cumulative probability
    /// exceeds it. If floating-point error lets the cumulative walk run
    /// off the end, a uniform choice among the k candidates stands in -
    /// that path is a normalization-bug canary, not a feature.
    pub fn sample_top_k(&mut self, distribution: &Array1<f32>, k: usize) -> Result<usize> {
        if distribution.is_empty() || k == 0 {
            return Err(ModelError::InvalidConfig(
                "top-k sampling needs a non-empty distribution and k > 0".to_string(),
            ));
        }

        let mut candidates: Vec<(usize, f32)> =
            distribution.iter().copied().enumerate().collect();
        // sort_by is stable, so equal probabilities keep index order
        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        candidates.truncate(k.min(candidates.len()));

        let sum: f32 = candidates.iter().map(|&(_, p)| p).sum();
        if sum > 0.0 {
            for entry in &mut candidates {
                entry.1 /= sum;
            }

            let draw: f32 = self.rng.random();
            let mut cumulative = 0.0;
            for &(index, p) in &candidates {
                cumulative += p;
                if draw < cumulative {
                    return Ok(index);
                }
            }
        }

        log::warn!("top-k cumulative sampling fell through, falling back to uniform choice");
        let pick = self.rng.random_range(0..candidates.len());
        Ok(candidates[pick].0)
    }

    /// Decodes a score vector into words by repeated arg-max with
    /// exclusion: the best remaining index is mapped to its word,
    /// appended, and clamped to negative infinity so it cannot be
    /// selected again. Stops when no index remains above negative
    /// infinity, when an index has no vocabulary word, or after
    /// `vector.len()` iterations.
    ///
    /// The exclusions persist in `vector`, so a second pass over the
    /// same vector continues where the first left off.
    pub fn greedy_decode(&self, vector: &mut Array1<f32>) -> String {
        let mut decoded: Vec<&str> = Vec::new();
        let mut iterations = 0;

        while iterations < vector.len() {
            let Some(max_index) = find_max_index(vector) else {
                break;
            };
            let Some(word) = self.corpus.vocab_word(max_index) else {
                // index beyond the vocabulary: treat as exhausted
                break;
            };

            decoded.push(word);
            vector[max_index] = f32::NEG_INFINITY;
            iterations += 1;
        }

        decoded.join(" ")
    }

    /// Generates exactly `length` additional words after the seed text.
    ///
    /// Each step encodes the current word, predicts a distribution,
    /// samples from the top ten candidates and re-encodes only the
    /// newly produced word - prior context is discarded.
    pub fn generate(&mut self, seed_text: &str, length: usize) -> Result<String> {
        let mut encoded = self.encode_sequence(seed_text)?;
        let mut generated = seed_text.to_string();

        for _ in 0..length {
            let distribution = self.predict_next(&encoded)?;
            let index = self.sample_top_k(&distribution, GENERATION_TOP_K)?;

            let Some(word) = self.corpus.vocab_word(index) else {
                // sampled index has no word; nothing sensible to append
                break;
            };
            generated.push(' ');
            generated.push_str(word);

            encoded = self.encode_sequence(word)?;
        }

        Ok(generated)
    }

    /// Completes a partial text: one prediction, greedily decoded, then
    /// the combined seed + completion is truncated to at most
    /// `max_length` whitespace-separated tokens.
    pub fn complete(&mut self, seed_text: &str, max_length: usize) -> Result<String> {
        let encoded = self.encode_sequence(seed_text)?;
        let mut distribution = self.predict_next(&encoded)?;
        let completion = self.greedy_decode(&mut distribution);

        let combined = format!("{seed_text} {completion}");
        let limited: Vec<&str> = combined.split_whitespace().take(max_length).collect();
        Ok(limited.join(" "))
    }
}

/// Index of the largest entry strictly above negative infinity, first
/// occurrence winning ties. `None` once every entry has been excluded.
fn find_max_index(vector: &Array1<f32>) -> Option<usize> {
    let mut max_value = f32::NEG_INFINITY;
    let mut max_index = None;

    for (i, &value) in vector.iter().enumerate() {
        if value > max_value {
            max_value = value;
            max_index = Some(i);
        }
    }

    max_index
}
