//! Prompt assembly and the thought-process trace returned to the chat client.

use crate::models::Retrieved;

const CONTEXT_PREFIX: &str = "Context: ";
const QUESTION_PREFIX: &str = "\nQuestion: ";
const ANSWER_CUE: &str = "\nAnswer:";

/// A rendered prompt together with the parts it was built from.
///
/// Generators that call a model send [`text`](Prompt::text); offline
/// generators can read [`context`](Prompt::context) directly instead of
/// parsing the text back apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    query: String,
    context: String,
    text: String,
}

impl Prompt {
    /// Assemble the prompt for `query` over `texts`, closest document first.
    pub fn new<S: AsRef<str>>(query: &str, texts: &[S]) -> Self {
        let context = texts
            .iter()
            .map(|t| t.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        let text = format!(
            "{}{}{}{}{}",
            CONTEXT_PREFIX, context, QUESTION_PREFIX, query, ANSWER_CUE
        );
        Self {
            query: query.to_string(),
            context,
            text,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// The space-joined retrieved texts.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// The full prompt string.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Build the prompt string handed to the generation provider.
///
/// Retrieved texts are space-joined in the given order, so the closest
/// document comes first:
///
/// ```text
/// Context: {text₁ text₂ …}
/// Question: {query}
/// Answer:
/// ```
///
/// ```rust
/// use ragchat_core::prompt::build_prompt;
///
/// let p = build_prompt("why?", &["a", "b"]);
/// assert_eq!(p, "Context: a b\nQuestion: why?\nAnswer:");
/// ```
pub fn build_prompt<S: AsRef<str>>(query: &str, texts: &[S]) -> String {
    Prompt::new(query, texts).text
}

/// Human-readable steps describing how an answer was produced.
pub fn thought_process(
    query: &str,
    retrieved: &[Retrieved],
    prior_context: Option<&[String]>,
) -> Vec<String> {
    let mut thoughts = vec![format!("1. Received query: '{}'", query)];

    if retrieved.is_empty() {
        thoughts.push("2. No stored content matched the query embedding".to_string());
    } else {
        let ids: Vec<&str> = retrieved.iter().map(|r| r.id.as_str()).collect();
        thoughts.push(format!(
            "2. Retrieved {} relevant document(s) based on query embedding: {}",
            retrieved.len(),
            ids.join(", ")
        ));
    }

    if let Some(prior) = prior_context.filter(|p| !p.is_empty()) {
        thoughts.push(format!(
            "   Considered {} earlier message(s) from the conversation",
            prior.len()
        ));
    }

    thoughts.push(
        "3. Analyzing content to find common themes and extract key information".to_string(),
    );
    thoughts.push("4. Formulating a detailed response considering the logical sequence".to_string());
    thoughts
}
