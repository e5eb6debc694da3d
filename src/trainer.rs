//! Training driver: samples batches of (input, target) word pairs from
//! the corpus and feeds them to the network, one gradient step per
//! pair.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::corpus::TextCorpus;
use crate::error::Result;
use crate::generator::one_hot;
use crate::network::Network;

pub struct ModelTrainer<'a> {
    corpus: &'a TextCorpus,
    network: &'a mut Network,
    batch_size: usize,
    rng: StdRng,
}

impl<'a> ModelTrainer<'a> {
    pub fn new(corpus: &'a TextCorpus, network: &'a mut Network, batch_size: usize) -> Self {
        ModelTrainer {
            corpus,
            network,
            batch_size,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Like [`ModelTrainer::new`] with a fixed batch-sampling seed.
    pub fn with_seed(
        corpus: &'a TextCorpus,
        network: &'a mut Network,
        batch_size: usize,
        seed: u64,
    ) -> Self {
        ModelTrainer {
            corpus,
            network,
            batch_size,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Runs `epochs` rounds of `batch_size` randomly drawn samples.
    ///
    /// Each sample trains the network to predict its second word from
    /// its first (one-hot in, one-hot out). Samples with fewer than two
    /// words carry no next-word pair and are skipped, not an error.
    /// Prints one summary line per epoch with the mean squared
    /// top-level error over the pairs actually trained on.
    pub fn train_model(&mut self, epochs: usize) -> Result<()> {
        for epoch in 0..epochs {
            let mut total_error = 0.0f32;
            let mut trained = 0usize;

            for _ in 0..self.batch_size {
                if self.corpus.sample_count() == 0 {
                    break;
                }

                let index = self.rng.random_range(0..self.corpus.sample_count());
                let Some((first, second)) = self.next_word_pair(index) else {
                    log::debug!("skipping sample {index}: fewer than two words");
                    continue;
                };

                let input = one_hot(self.corpus, &first)?;
                let target = one_hot(self.corpus, &second)?;

                let output = self.network.predict(&input)?;
                let delta = Network::error(&output, &target)?;
                total_error += delta.mapv(|e| e * e).sum() / delta.len() as f32;

                self.network.train(&input, &target)?;
                trained += 1;
            }

            if trained > 0 {
                println!(
                    "Epoch {}: mse = {:.6} over {} pairs",
                    epoch,
                    total_error / trained as f32,
                    trained
                );
            } else {
                log::warn!("epoch {epoch}: no trainable pairs in batch");
            }
        }

        Ok(())
    }

    fn next_word_pair(&self, sample_index: usize) -> Option<(String, String)> {
        let text = self.corpus.sample_at(sample_index)?;
        let mut words = text.split_whitespace();
        let first = words.next()?;
        let second = words.next()?;
        Some((first.to_string(), second.to_string()))
    }
}
