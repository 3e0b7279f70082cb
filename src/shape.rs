//! Turns caption segments and model insights into the API payload.
//!
//! Nothing here does I/O or fails: inputs are already validated.

use serde::Serialize;

use crate::CaptionSegment;
use crate::schema::StructuredInsights;

const KEY_POINT_TYPE: &str = "insight";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub published_at: String,
    pub thumbnail_url: String,
    pub duration: u64,
    pub view_count: u64,
    pub like_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicMention {
    pub timestamp: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topic {
    pub name: String,
    pub relevance: u32,
    pub mentions: Vec<TopicMention>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Emotion {
    pub name: String,
    pub strength: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SentimentAnalysis {
    pub positive: i32,
    pub negative: i32,
    pub neutral: i32,
    pub emotions: Vec<Emotion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyPoint {
    pub timestamp: f64,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInsights {
    pub summary: String,
    pub topics: Vec<Topic>,
    pub sentiment: SentimentAnalysis,
    pub key_points: Vec<KeyPoint>,
    pub quotes: Vec<String>,
}

/// Full `/analyze` response body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub video_info: VideoInfo,
    pub transcript: Vec<TranscriptSegment>,
    pub insights: VideoInsights,
    pub available_languages: Vec<String>,
    pub selected_language: String,
}

/// Analysis result before shaping: structured, or legacy free text
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Structured(StructuredInsights),
    FreeText(String),
}

pub fn shape(
    video_id: &str,
    segments: &[CaptionSegment],
    analysis: &Analysis,
    available_languages: &[String],
    selected_language: &str,
) -> AnalysisResponse {
    let insights = match analysis {
        Analysis::Structured(insights) => shape_insights(insights),
        Analysis::FreeText(text) => VideoInsights {
            summary: text.clone(),
            ..VideoInsights::default()
        },
    };

    AnalysisResponse {
        video_info: VideoInfo {
            id: video_id.to_string(),
            ..VideoInfo::default()
        },
        transcript: shape_transcript(segments),
        insights,
        available_languages: available_languages.to_vec(),
        selected_language: selected_language.to_string(),
    }
}

pub fn shape_transcript(segments: &[CaptionSegment]) -> Vec<TranscriptSegment> {
    segments
        .iter()
        .map(|s| TranscriptSegment {
            start: s.start,
            end: s.start + s.duration,
            text: s.text.clone(),
        })
        .collect()
}

pub fn shape_insights(insights: &StructuredInsights) -> VideoInsights {
    // Integer division: three topics get 33 each, not a 100 total
    let topic_count = insights.topics.len().max(1) as u32;
    let topics = insights
        .topics
        .iter()
        .map(|name| Topic {
            name: name.clone(),
            relevance: 100 / topic_count,
            mentions: Vec::new(),
        })
        .collect();

    let emotion_count = insights.sentiment.emotions.len() as u32;
    let emotions = insights
        .sentiment
        .emotions
        .iter()
        .map(|name| Emotion {
            name: name.clone(),
            strength: 100 / emotion_count,
        })
        .collect();

    let key_points = insights
        .key_points
        .iter()
        .map(|text| KeyPoint {
            timestamp: 0.0,
            title: text.clone(),
            description: text.clone(),
            kind: KEY_POINT_TYPE.to_string(),
        })
        .collect();

    VideoInsights {
        summary: insights.summary.clone(),
        topics,
        sentiment: SentimentAnalysis {
            positive: insights.sentiment.positive,
            negative: insights.sentiment.negative,
            neutral: insights.sentiment.neutral,
            emotions,
        },
        key_points,
        quotes: insights.quotes.clone(),
    }
}
