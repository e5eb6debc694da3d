//! Text corpus storage: preprocessed training samples plus the
//! vocabulary accumulated from them.
//!
//! The vocabulary keeps insertion order, so word indices are stable for
//! the lifetime of the corpus but *grow* as more text is loaded. The
//! numeric core only reads the vocabulary through the lookup methods
//! here; a network sized to an older vocabulary must be re-provisioned
//! before it can serve a grown one.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use regex::Regex;

pub struct TextCorpus {
    text_data: Vec<String>,
    vocab_list: Vec<String>,
    vocab_index: HashMap<String, usize>,
    whitespace: Regex,
    punctuation: Regex,
}

impl Default for TextCorpus {
    fn default() -> Self {
        Self::new()
    }
}

impl TextCorpus {
    pub fn new() -> Self {
        TextCorpus {
            text_data: Vec::new(),
            vocab_list: Vec::new(),
            vocab_index: HashMap::new(),
            whitespace: Regex::new(r"\s+").unwrap(),
            punctuation: Regex::new(r"[,:;.?!()\-]").unwrap(),
        }
    }

    /// Normalizes one text sample: collapses whitespace, lowercases,
    /// strips punctuation and expands common contractions.
    pub fn preprocess_text(&self, text: &str) -> String {
        let text = self.whitespace.replace_all(text, " ").to_lowercase();
        let text = text.replace("won't", "will not").replace("can't", "cannot");
        let text = self.punctuation.replace_all(&text, "");
        text.trim().to_string()
    }

    /// Splits a sample on whitespace and records each previously unseen
    /// word at the next free index.
    pub fn update_vocabulary(&mut self, text: &str) {
        for word in text.split_whitespace() {
            if !self.vocab_index.contains_key(word) {
                self.vocab_index.insert(word.to_string(), self.vocab_list.len());
                self.vocab_list.push(word.to_string());
            }
        }
    }

    /// Cleans a line, stores it as a sample and folds its words into
    /// the vocabulary. Empty lines (after cleaning) are dropped.
    pub fn add_sample(&mut self, line: &str) {
        let cleaned = self.preprocess_text(line);
        if cleaned.is_empty() {
            return;
        }
        self.update_vocabulary(&cleaned);
        self.text_data.push(cleaned);
    }

    /// Reads a text file line by line into the corpus.
    pub fn load_text<P: AsRef<Path>>(&mut self, path: P) -> io::Result<()> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);

        for line in reader.lines() {
            self.add_sample(&line?);
        }

        log::info!(
            "loaded corpus from {:?}: {} samples, {} words in vocabulary",
            path.as_ref(),
            self.text_data.len(),
            self.vocab_list.len()
        );
        Ok(())
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_list.len()
    }

    /// Index of a word in the vocabulary, if present.
    pub fn word_index(&self, word: &str) -> Option<usize> {
        self.vocab_index.get(word).copied()
    }

    /// Word at a vocabulary index, if the index is in range.
    pub fn vocab_word(&self, index: usize) -> Option<&str> {
        self.vocab_list.get(index).map(|s| s.as_str())
    }

    pub fn sample_count(&self) -> usize {
        self.text_data.len()
    }

    pub fn sample_at(&self, index: usize) -> Option<&str> {
        self.text_data.get(index).map(|s| s.as_str())
    }
}
