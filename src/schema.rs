//! Closed schema for the model's structured reply.
//!
//! The same field lists drive both the JSON schema sent with the request and
//! the validator run on the reply, so the two cannot drift apart.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

const INSIGHT_FIELDS: &[&str] = &["summary", "topics", "sentiment", "key_points", "quotes"];
const SENTIMENT_FIELDS: &[&str] = &["positive", "negative", "neutral", "emotions"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sentiment {
    pub positive: i32,
    pub negative: i32,
    pub neutral: i32,
    pub emotions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructuredInsights {
    pub summary: String,
    pub topics: Vec<String>,
    pub sentiment: Sentiment,
    pub key_points: Vec<String>,
    pub quotes: Vec<String>,
}

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("expected a JSON object at `{0}`")]
    NotAnObject(String),

    #[error("unexpected field `{field}` in `{path}`")]
    UnknownField { path: String, field: String },

    #[error("missing field `{field}` in `{path}`")]
    MissingField { path: String, field: String },

    #[error("malformed insights: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// JSON schema handed to the model; strict mode requires every property
/// listed as required and `additionalProperties: false` on each object.
pub fn json_schema() -> Value {
    let string_list = json!({ "type": "array", "items": { "type": "string" } });

    json!({
        "type": "object",
        "properties": {
            "summary": { "type": "string" },
            "topics": string_list,
            "sentiment": {
                "type": "object",
                "properties": {
                    "positive": { "type": "integer" },
                    "negative": { "type": "integer" },
                    "neutral": { "type": "integer" },
                    "emotions": string_list,
                },
                "required": SENTIMENT_FIELDS,
                "additionalProperties": false,
            },
            "key_points": string_list,
            "quotes": string_list,
        },
        "required": INSIGHT_FIELDS,
        "additionalProperties": false,
    })
}

/// Validate a raw model reply against the closed schema and convert it.
pub fn validate(value: &Value) -> Result<StructuredInsights, SchemaError> {
    let root = as_object(value, "$")?;
    check_fields(root, "$", INSIGHT_FIELDS)?;

    // check_fields guarantees presence
    let sentiment = as_object(&root["sentiment"], "$.sentiment")?;
    check_fields(sentiment, "$.sentiment", SENTIMENT_FIELDS)?;

    Ok(StructuredInsights::deserialize(value)?)
}

/// Parse the model's text content and validate it.
pub fn parse(content: &str) -> Result<StructuredInsights, SchemaError> {
    let value: Value = serde_json::from_str(content)?;
    validate(&value)
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SchemaError> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::NotAnObject(path.to_string()))
}

fn check_fields(object: &Map<String, Value>, path: &str, allowed: &[&str]) -> Result<(), SchemaError> {
    if let Some(field) = object.keys().find(|k| !allowed.contains(&k.as_str())) {
        return Err(SchemaError::UnknownField {
            path: path.to_string(),
            field: field.clone(),
        });
    }

    if let Some(field) = allowed.iter().find(|f| !object.contains_key(**f)) {
        return Err(SchemaError::MissingField {
            path: path.to_string(),
            field: field.to_string(),
        });
    }

    Ok(())
}
