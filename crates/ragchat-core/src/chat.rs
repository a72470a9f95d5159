//! Query answering: retrieve, assemble the prompt, generate.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::{RagError, Result};
use crate::generation::{GenerationOptions, Generator};
use crate::pipeline::RetrievalPipeline;
use crate::prompt::{thought_process, Prompt};

/// Answer returned to the chat client.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub thought_process: Vec<String>,
    /// Ids of the documents used as context, nearest first.
    pub relevant_sources: Vec<String>,
}

/// Ties a [`RetrievalPipeline`] to a [`Generator`] with fixed decoding options.
pub struct ChatEngine {
    pipeline: Arc<RetrievalPipeline>,
    generator: Arc<dyn Generator>,
    options: GenerationOptions,
    top_k: usize,
}

impl ChatEngine {
    pub fn new(
        pipeline: Arc<RetrievalPipeline>,
        generator: Arc<dyn Generator>,
        options: GenerationOptions,
        top_k: usize,
    ) -> Result<Self> {
        options.validate()?;
        if top_k == 0 {
            return Err(RagError::InvalidK(top_k));
        }
        Ok(Self {
            pipeline,
            generator,
            options,
            top_k,
        })
    }

    pub fn pipeline(&self) -> &Arc<RetrievalPipeline> {
        &self.pipeline
    }

    pub fn generator(&self) -> &dyn Generator {
        self.generator.as_ref()
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer `query` from the `k` nearest documents (default: the engine's `top_k`).
    ///
    /// `prior_context` is recorded in the thought process only; it does not
    /// change retrieval or the prompt.
    pub async fn answer(
        &self,
        query: &str,
        prior_context: Option<&[String]>,
        k: Option<usize>,
    ) -> Result<ChatResponse> {
        let k = k.unwrap_or(self.top_k);
        let retrieved = self.pipeline.retrieve(query, k).await?;

        let texts: Vec<&str> = retrieved.iter().map(|r| r.text.as_str()).collect();
        let prompt = Prompt::new(query, &texts);
        debug!(prompt_len = prompt.text().len(), sources = texts.len(), "assembled prompt");

        let response = self
            .generator
            .generate(&prompt, &self.options)
            .await
            .map_err(RagError::Generation)?;

        Ok(ChatResponse {
            response: response.trim().to_string(),
            thought_process: thought_process(query, &retrieved, prior_context),
            relevant_sources: retrieved.into_iter().map(|r| r.id).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::generation::{ExtractiveGenerator, NO_CONTEXT_ANSWER};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the last prompt it saw and echoes it back.
    #[derive(Default)]
    struct RecordingGenerator {
        last: Mutex<Option<String>>,
    }

    #[async_trait]
    impl Generator for RecordingGenerator {
        fn model_name(&self) -> &str {
            "recording"
        }
        async fn generate(&self, prompt: &Prompt, _options: &GenerationOptions) -> anyhow::Result<String> {
            *self.last.lock().unwrap() = Some(prompt.text().to_string());
            Ok(format!("  echo: {}  ", prompt.text().len()))
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl Generator for FailingGenerator {
        fn model_name(&self) -> &str {
            "failing"
        }
        async fn generate(&self, _prompt: &Prompt, _options: &GenerationOptions) -> anyhow::Result<String> {
            anyhow::bail!("model unavailable")
        }
    }

    fn pipeline() -> Arc<RetrievalPipeline> {
        Arc::new(RetrievalPipeline::new(
            Arc::new(HashEmbedder::new(128).unwrap()),
            100,
        ))
    }

    #[tokio::test]
    async fn test_answer_on_empty_store() {
        let recorder = Arc::new(RecordingGenerator::default());
        let engine = ChatEngine::new(
            pipeline(),
            recorder.clone(),
            GenerationOptions::default(),
            3,
        )
        .unwrap();

        let resp = engine.answer("is anyone there?", None, None).await.unwrap();
        assert!(resp.relevant_sources.is_empty());
        assert_eq!(
            recorder.last.lock().unwrap().as_deref(),
            Some("Context: \nQuestion: is anyone there?\nAnswer:")
        );
        assert!(resp.response.starts_with("echo:"));
    }

    #[tokio::test]
    async fn test_answer_uses_retrieved_context_in_order() {
        let p = pipeline();
        p.ingest("cats", "cats purr and chase mice", None).await.unwrap();
        p.ingest("stars", "stars burn hydrogen", None).await.unwrap();

        let recorder = Arc::new(RecordingGenerator::default());
        let engine =
            ChatEngine::new(p, recorder.clone(), GenerationOptions::default(), 2).unwrap();
        let resp = engine
            .answer("cats purr and chase mice", None, None)
            .await
            .unwrap();

        assert_eq!(resp.relevant_sources, vec!["cats", "stars"]);
        let prompt = recorder.last.lock().unwrap().clone().unwrap();
        assert!(prompt.starts_with("Context: cats purr and chase mice stars burn hydrogen\n"));
    }

    #[tokio::test]
    async fn test_answer_with_extractive_generator() {
        let p = pipeline();
        p.ingest("a", "the harbor opens at six", None).await.unwrap();
        let engine = ChatEngine::new(
            p,
            Arc::new(ExtractiveGenerator),
            GenerationOptions::default(),
            1,
        )
        .unwrap();
        let resp = engine
            .answer("when does the harbor open", Some(&["hi".to_string()][..]), None)
            .await
            .unwrap();
        assert_eq!(resp.response, "the harbor opens at six");
        assert_eq!(resp.relevant_sources, vec!["a"]);
        assert_eq!(resp.thought_process.len(), 5);
    }

    #[tokio::test]
    async fn test_question_marker_in_query_not_answered_as_context() {
        let p = pipeline();
        p.ingest("cats", "cats are mammals", None).await.unwrap();
        let engine = ChatEngine::new(
            p,
            Arc::new(ExtractiveGenerator),
            GenerationOptions::default(),
            1,
        )
        .unwrap();
        let resp = engine
            .answer("x\nQuestion: secret words", None, None)
            .await
            .unwrap();
        assert_eq!(resp.response, "cats are mammals");
    }

    #[tokio::test]
    async fn test_answer_empty_store_extractive() {
        let engine = ChatEngine::new(
            pipeline(),
            Arc::new(ExtractiveGenerator),
            GenerationOptions::default(),
            3,
        )
        .unwrap();
        let resp = engine.answer("hello?", None, Some(1)).await.unwrap();
        assert_eq!(resp.response, NO_CONTEXT_ANSWER);
    }

    #[tokio::test]
    async fn test_generation_failure_surfaces() {
        let engine = ChatEngine::new(
            pipeline(),
            Arc::new(FailingGenerator),
            GenerationOptions::default(),
            3,
        )
        .unwrap();
        let err = engine.answer("q", None, None).await.unwrap_err();
        assert!(matches!(err, RagError::Generation(_)));
    }

    #[test]
    fn test_engine_rejects_bad_configuration() {
        assert!(matches!(
            ChatEngine::new(
                pipeline(),
                Arc::new(ExtractiveGenerator),
                GenerationOptions::default(),
                0
            ),
            Err(RagError::InvalidK(0))
        ));
        let bad = GenerationOptions {
            temperature: -1.0,
            ..Default::default()
        };
        assert!(ChatEngine::new(pipeline(), Arc::new(ExtractiveGenerator), bad, 3).is_err());
    }
}
