use async_trait::async_trait;
use log::debug;

use crate::error::{Error, Result};
use crate::schema::{self, StructuredInsights};

pub const DEFAULT_MODEL: &str = "gpt-4o-2024-08-06";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

const STRUCTURED_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that analyzes video transcripts and extracts structured insights.";

const TEXT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that analyzes video transcripts and extracts meaningful insights.";

const SCHEMA_NAME: &str = "video_insights";
const TEXT_TEMPERATURE: f64 = 0.7;
const TEXT_MAX_TOKENS: u32 = 1000;

/// Language-model analysis of a transcript
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Structured analysis, validated against the closed insight schema.
    async fn analyze(&self, transcript: &str) -> Result<StructuredInsights>;

    /// Free-form analysis text.
    async fn analyze_text(&self, transcript: &str) -> Result<String>;
}

/// Insight generator for OpenAI-compatible chat-completions endpoints
pub struct OpenAiInsights {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl OpenAiInsights {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    async fn chat(&self, body: &serde_json::Value) -> Result<serde_json::Value> {
        let url = format!("{}/chat/completions", self.api_base);
        debug!("Requesting analysis from {url} with model {}", self.model);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::upstream(format!("OpenAI API returned {status}"), body));
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl InsightGenerator for OpenAiInsights {
    async fn analyze(&self, transcript: &str) -> Result<StructuredInsights> {
        let body = structured_request(&self.model, transcript);
        let json = self.chat(&body).await?;
        extract_structured(&json)
    }

    async fn analyze_text(&self, transcript: &str) -> Result<String> {
        let body = text_request(&self.model, transcript);
        let json = self.chat(&body).await?;
        extract_text(&json)
    }
}

fn structured_prompt(transcript: &str) -> String {
    format!(
        "Analyze the following video transcript and extract:\n\
         1. summary (str): A concise summary of the video.\n\
         2. topics (list of main topics discussed)\n\
         3. sentiment (object): {{positive (int), negative (int), neutral (int), emotions (list of str)}}\n\
         4. key_points (list of key insights and takeaways)\n\
         5. quotes (list of important quotes or statements)\n\
         Respond in the format of the provided JSON schema.\n\
         \nTranscript:\n{transcript}"
    )
}

fn text_prompt(transcript: &str) -> String {
    format!(
        "Please analyze the following video transcript and provide key insights:\n\n\
         Transcript:\n{transcript}\n\n\
         Please provide:\n\
         1. Main topics discussed\n\
         2. Key insights and takeaways\n\
         3. Important quotes or statements\n\
         4. Overall sentiment and tone\n\
         5. Any notable patterns or recurring themes\n\n\
         Format the response in a clear, structured way."
    )
}

fn structured_request(model: &str, transcript: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "messages": [
            { "role": "system", "content": STRUCTURED_SYSTEM_PROMPT },
            { "role": "user", "content": structured_prompt(transcript) }
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": SCHEMA_NAME,
                "strict": true,
                "schema": schema::json_schema()
            }
        }
    })
}

fn text_request(model: &str, transcript: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "messages": [
            { "role": "system", "content": TEXT_SYSTEM_PROMPT },
            { "role": "user", "content": text_prompt(transcript) }
        ],
        "temperature": TEXT_TEMPERATURE,
        "max_tokens": TEXT_MAX_TOKENS
    })
}

fn first_message(json: &serde_json::Value) -> Option<&serde_json::Value> {
    json.get("choices").and_then(|c| c.get(0)).and_then(|c| c.get("message"))
}

fn extract_structured(json: &serde_json::Value) -> Result<StructuredInsights> {
    let message =
        first_message(json).ok_or_else(|| Error::upstream("OpenAI API", "unexpected response format"))?;

    if let Some(refusal) = message.get("refusal").and_then(|r| r.as_str()) {
        return Err(Error::upstream("model refused to analyze transcript", refusal));
    }

    let content = message
        .get("content")
        .and_then(|c| c.as_str())
        .ok_or_else(|| Error::upstream("OpenAI API", "response has no content"))?;

    Ok(schema::parse(content)?)
}

fn extract_text(json: &serde_json::Value) -> Result<String> {
    match first_message(json)
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
    {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(Error::upstream("OpenAI API", "unexpected response format")),
    }
}
