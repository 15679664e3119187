use async_trait::async_trait;
use rand::seq::IndexedRandom;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{config::AiConfig, AppError};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Text provider answered {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Text provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Text provider returned no message")]
    Empty,
}

impl From<GenerateError> for AppError {
    fn from(err: GenerateError) -> Self {
        AppError::Upstream { message: err.to_string(), details: None }
    }
}

/// What the writer knows about the two members.
#[derive(Debug, Clone)]
pub struct Outreach {
    pub prompt: String,
    pub receiver_name: String,
    pub shared_interest: Option<String>,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, outreach: &Outreach) -> Result<String, GenerateError>;
}

/// OpenAI-compatible chat completions.
pub struct ChatCompletions {
    client: reqwest::Client,
    config: AiConfig,
}

impl ChatCompletions {
    pub fn new(client: reqwest::Client, config: AiConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl TextGenerator for ChatCompletions {
    async fn generate(&self, outreach: &Outreach) -> Result<String, GenerateError> {
        let response = self.client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "model": self.config.model,
                "messages": [{ "role": "user", "content": outreach.prompt }],
                "max_tokens": 200,
                "temperature": 0.8,
            }))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            let message = body["error"]["message"].as_str().unwrap_or("request failed").to_owned();
            return Err(GenerateError::Provider { status: status.as_u16(), message });
        }

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(|text| text.trim().trim_matches('"').to_owned())
            .filter(|text| !text.is_empty())
            .ok_or(GenerateError::Empty)
    }
}

/// Offline writer that fills a canned opener.
pub struct Canned;

const OPENERS: [&str; 5] = [
    "Hi {name}! Your profile caught my eye. I'd love to hear more about your love of {interest}.",
    "Hello {name}, I couldn't scroll past without saying hi. Coffee sometime? We could talk {interest}.",
    "{name}, you seem like someone with great stories. Tell me your favourite thing about {interest}?",
    "Hey {name}! I'm new here and your profile stood out. What got you into {interest}?",
    "Good to meet you, {name}. I think we'd get along. {interest} is high on my list too.",
];

#[async_trait]
impl TextGenerator for Canned {
    async fn generate(&self, outreach: &Outreach) -> Result<String, GenerateError> {
        let opener = OPENERS.choose(&mut rand::rng()).ok_or(GenerateError::Empty)?;
        Ok(opener
            .replace("{name}", &outreach.receiver_name)
            .replace("{interest}", outreach.shared_interest.as_deref().unwrap_or("life")))
    }
}
