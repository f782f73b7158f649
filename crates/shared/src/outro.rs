use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::models::EnrichedItem;
use crate::sources::SHOW_NAME;

/// Spoken when closing-line generation is unavailable or misbehaves.
pub const FALLBACK_OUTRO: &str =
    "How might the stories you heard today change your path through the city tomorrow?";

/// The closing line is one sentence; anything longer than this gets the
/// fallback instead.
pub const OUTRO_MAX_WORDS: usize = 30;

/// Generation boundary for the episode's closing line. Implementations
/// may fail freely; the pipeline collapses every failure to
/// `FALLBACK_OUTRO`.
#[async_trait]
pub trait ClosingLine: Send + Sync {
    async fn closing_line(&self, stories: &[EnrichedItem]) -> Result<String>;
}

/// Applies the closing-line contract to a generation attempt: one
/// non-empty line of at most `OUTRO_MAX_WORDS` words, or the fixed
/// fallback sentence. Never fatal to the pipeline.
pub fn validated_or_fallback(result: Result<String>) -> String {
    match result {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() || text.split_whitespace().count() > OUTRO_MAX_WORDS {
                FALLBACK_OUTRO.to_string()
            } else {
                text.to_string()
            }
        }
        Err(e) => {
            eprintln!("Closing line generation failed: {e:#}");
            FALLBACK_OUTRO.to_string()
        }
    }
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<Content>,
}

#[derive(Deserialize)]
struct Content {
    text: String,
}

pub struct OutroGenerator {
    client: Client,
    api_key: String,
}

impl OutroGenerator {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, api_key })
    }
}

fn build_prompt(stories: &[EnrichedItem]) -> String {
    let story_lines = stories
        .iter()
        .enumerate()
        .map(|(i, story)| {
            let excerpt: String = story.editorial_excerpt.chars().take(200).collect();
            format!("{}. [{}] {}: {}", i + 1, story.item.source, story.item.title, excerpt)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an editorial assistant for "{SHOW_NAME}", a daily short-form news podcast.
I will provide news excerpts from Boston sources.

Create a single, gentle, open-ended reflection question related to these stories to leave the listener thinking.
It must be ONE sentence.

Stories:
{story_lines}

Constraint: Max {OUTRO_MAX_WORDS} words. Calm, non-sensational, professional tone."#
    )
}

#[async_trait]
impl ClosingLine for OutroGenerator {
    async fn closing_line(&self, stories: &[EnrichedItem]) -> Result<String> {
        let request = ClaudeRequest {
            model: "claude-3-5-haiku-20241022".to_string(),
            max_tokens: 120,
            messages: vec![Message {
                role: "user".to_string(),
                content: build_prompt(stories),
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Claude API")?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Claude API error: {}", error_text);
        }

        let claude_response = response
            .json::<ClaudeResponse>()
            .await
            .context("Failed to parse Claude API response")?;

        let text = claude_response
            .content
            .first()
            .map(|c| c.text.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            anyhow::bail!("Claude returned an empty closing line");
        }

        Ok(text)
    }
}
