//! Natural-language explanations for retrieved couplets.
//!
//! The generator is asked for one line per couplet, separated by a
//! delimiter, and the combined answer is split back into per-result pieces.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{Result, SearchError};
use crate::models::CorpusEntry;

/// Separator the generator is asked to place between explanations.
pub const EXPLANATION_DELIMITER: char = '*';

/// Opaque text generator: query + records in, free text out.
#[async_trait]
pub trait ExplanationGenerator: Send + Sync {
    async fn explain(&self, query: &str, records: &[CorpusEntry]) -> Result<String>;
}

/// Split a combined answer into trimmed, non-empty explanations.
pub fn split_explanations(answer: &str, delimiter: char) -> Vec<String> {
    answer
        .split(delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pair the i-th explanation with the i-th of `count` results; results
/// without a matching piece get an empty explanation.
pub fn align_explanations(pieces: Vec<String>, count: usize) -> Vec<String> {
    let mut pieces = pieces.into_iter();
    (0..count)
        .map(|_| pieces.next().unwrap_or_default())
        .collect()
}

pub fn build_prompt(query: &str, records: &[CorpusEntry]) -> String {
    let context = records
        .iter()
        .map(|r| {
            format!(
                "ID: {}\nKural: {} {}\nCouplet: {} {}\nMeaning: {}",
                r.kural_id,
                r.tamil.get("line1"),
                r.tamil.get("line2"),
                r.english.get("line1"),
                r.english.get("line2"),
                r.english.get("translation"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a helpful assistant that answers queries about Thirukkural.\n\
         Use the following retrieved passages as context:\n\n{context}\n\n\
         User Query: {query}\n\n\
         Answer in a clear and accurate way.\n\
         Give an explanation in a single line for each of the {} kurals, in the order given, separated by \"{EXPLANATION_DELIMITER}\".\n\
         Do not include any other sentences.",
        records.len()
    )
}

/// Chat-completion client for Ollama or OpenAI-compatible APIs.
pub struct HttpExplainer {
    client: reqwest::Client,
    config: LlmConfig,
}

impl HttpExplainer {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ExplanationGenerator for HttpExplainer {
    async fn explain(&self, query: &str, records: &[CorpusEntry]) -> Result<String> {
        if records.is_empty() {
            return Ok(String::new());
        }

        let prompt = build_prompt(query, records);
        let result = match self.config.provider.as_str() {
            "ollama" => self.call_ollama(&prompt).await,
            "openai" => self.call_openai(&prompt).await,
            other => Err(format!("unknown LLM provider: {other}")),
        };

        result.map_err(|reason| SearchError::model(&self.config.chat_model, reason))
    }
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: ChatMessage,
}

impl HttpExplainer {
    fn user_message(prompt: &str) -> Vec<ChatMessage> {
        vec![ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }]
    }

    async fn call_ollama(&self, prompt: &str) -> std::result::Result<String, String> {
        let url = format!("{}/api/chat", self.config.base_url.trim_end_matches('/'));
        let req = OllamaChatRequest {
            model: self.config.chat_model.clone(),
            messages: Self::user_message(prompt),
            stream: false,
        };

        let resp = self
            .client
            .post(&url)
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .json(&req)
            .send()
            .await
            .map_err(|e| format!("failed to call Ollama chat API: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("Ollama chat API returned {status}: {body}"));
        }

        let body: OllamaChatResponse = resp
            .json()
            .await
            .map_err(|e| format!("failed to parse Ollama chat response: {e}"))?;
        Ok(body.message.content)
    }

    async fn call_openai(&self, prompt: &str) -> std::result::Result<String, String> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let req = OpenAiChatRequest {
            model: self.config.chat_model.clone(),
            messages: Self::user_message(prompt),
            temperature: 0.3,
        };

        let resp = self
            .client
            .post(&url)
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&req)
            .send()
            .await
            .map_err(|e| format!("failed to call OpenAI chat API: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("OpenAI chat API returned {status}: {body}"));
        }

        let body: OpenAiChatResponse = resp
            .json()
            .await
            .map_err(|e| format!("failed to parse OpenAI chat response: {e}"))?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| "chat response had no choices".to_string())
    }
}
