//! Generation provider trait, decoding options, and the offline
//! extractive generator.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RagError;
use crate::prompt::Prompt;

/// Decoding parameters passed to every [`Generator::generate`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Upper bound on generated tokens.
    pub max_output_length: usize,
    /// Beam search width; `1` means greedy.
    pub beam_count: usize,
    /// Sampling randomness, strictly positive.
    pub temperature: f32,
    /// Forbid repeating n-grams of this size; `0` disables the constraint.
    pub no_repeat_ngram_size: usize,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_output_length: 150,
            beam_count: 4,
            temperature: 0.7,
            no_repeat_ngram_size: 2,
        }
    }
}

impl GenerationOptions {
    pub fn validate(&self) -> Result<(), RagError> {
        if self.max_output_length == 0 {
            return Err(RagError::InvalidOptions(
                "max_output_length must be >= 1".to_string(),
            ));
        }
        if self.beam_count == 0 {
            return Err(RagError::InvalidOptions(
                "beam_count must be >= 1".to_string(),
            ));
        }
        if !(self.temperature > 0.0 && self.temperature.is_finite()) {
            return Err(RagError::InvalidOptions(format!(
                "temperature must be > 0 (got {})",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// A prompt-to-text model.
#[async_trait]
pub trait Generator: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &Prompt, options: &GenerationOptions) -> Result<String>;
}

/// Offline generator that answers with the prompt's retrieved context.
///
/// Emits context words in order, up to `max_output_length` words, dropping
/// any word that would complete an n-gram already emitted (for
/// `no_repeat_ngram_size = n > 0`). Beam count and temperature do not
/// apply.
#[derive(Debug, Clone, Default)]
pub struct ExtractiveGenerator;

pub const NO_CONTEXT_ANSWER: &str = "I could not find any stored content relevant to that question.";

#[async_trait]
impl Generator for ExtractiveGenerator {
    fn model_name(&self) -> &str {
        "extractive"
    }

    async fn generate(&self, prompt: &Prompt, options: &GenerationOptions) -> Result<String> {
        let answer = extract(prompt.context(), options);
        if answer.is_empty() {
            return Ok(NO_CONTEXT_ANSWER.to_string());
        }
        Ok(answer)
    }
}

fn extract(context: &str, options: &GenerationOptions) -> String {
    let n = options.no_repeat_ngram_size;
    let mut out: Vec<&str> = Vec::new();
    let mut seen: HashSet<Vec<&str>> = HashSet::new();

    for word in context.split_whitespace() {
        if out.len() >= options.max_output_length {
            break;
        }
        if n > 0 && out.len() + 1 >= n {
            let mut gram: Vec<&str> = out[out.len() + 1 - n..].to_vec();
            gram.push(word);
            if !seen.insert(gram) {
                continue;
            }
        }
        out.push(word);
    }
    out.join(" ")
}
