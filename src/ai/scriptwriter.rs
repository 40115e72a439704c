use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

const CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";
const CLAUDE_MODEL: &str = "claude-3-5-haiku-20241022";

// Per-article slice of context handed to the model. Keeps a large queue
// inside the request token budget.
const ARTICLE_SNIPPET_CHARS: usize = 2000;

const SYSTEM_PROMPT: &str = r#"You are the producer of "ReadCast", a daily podcast where two AI hosts, Alex (energetic, curious) and Jamie (analytical, calm), discuss articles the user has saved.

Your goal is to synthesize the provided articles into a natural, engaging conversation.
- Don't just read the summary; discuss the implications.
- Find connections between different articles if possible.
- Keep it under 1000 words.
- Format the output as a script:
  Alex: [text]
  Jamie: [text]"#;

/// Drafts a two-host dialogue script from the queued articles. Failures
/// (missing credentials, upstream errors) surface as `AppError::Synthesis`.
#[async_trait]
pub trait ScriptSynthesizer: Send + Sync {
    async fn synthesize(&self, articles: &[SourceArticle]) -> Result<String>;
}

/// What a queued article contributes to the script: its title and cleaned
/// text, nothing else.
#[derive(Debug, Clone)]
pub struct SourceArticle {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct MessageRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    system: Option<String>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    content_type: String,
    text: Option<String>,
}

pub struct ClaudeScriptwriter {
    client: Client,
    api_key: String,
}

impl ClaudeScriptwriter {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");
        Self { client, api_key }
    }
}

#[async_trait]
impl ScriptSynthesizer for ClaudeScriptwriter {
    async fn synthesize(&self, articles: &[SourceArticle]) -> Result<String> {
        let user_message = format!(
            "Here are the articles for today:\n{}",
            build_context(articles)
        );

        let request = MessageRequest {
            model: CLAUDE_MODEL.to_string(),
            max_tokens: 2048,
            messages: vec![Message {
                role: "user".to_string(),
                content: user_message,
            }],
            system: Some(SYSTEM_PROMPT.to_string()),
        };

        let response = self
            .client
            .post(CLAUDE_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Synthesis(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| AppError::Synthesis(e.to_string()))?;
            return Err(AppError::Synthesis(format!("API error: {}", error_text)));
        }

        let message_response: MessageResponse = response
            .json()
            .await
            .map_err(|e| AppError::Synthesis(e.to_string()))?;

        let script = message_response
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        if script.trim().is_empty() {
            return Err(AppError::Synthesis("empty response from model".to_string()));
        }

        Ok(script)
    }
}

fn build_context(articles: &[SourceArticle]) -> String {
    let mut context = String::new();
    for (idx, article) in articles.iter().enumerate() {
        let snippet = truncate_chars(&article.content, ARTICLE_SNIPPET_CHARS);
        context.push_str(&format!(
            "Article {}: {}\nContent: {}\n\n",
            idx + 1,
            article.title,
            snippet
        ));
    }
    context
}

/// Truncate to at most `max` chars without splitting a multibyte char.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
