use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ytlens::analyzer::Analyzer;
use ytlens::config::AnalysisMode;
use ytlens::insights::InsightGenerator;
use ytlens::schema::{Sentiment, StructuredInsights};
use ytlens::shape::Analysis;
use ytlens::youtube::CaptionSource;
use ytlens::{CaptionSegment, Captions, Error, Result};

struct ScriptedCaptions {
    languages: Vec<String>,
    fetch_failures: AtomicUsize,
    fetches: AtomicUsize,
}

impl ScriptedCaptions {
    fn new(languages: &[&str], fetch_failures: usize) -> Self {
        Self {
            languages: languages.iter().map(|l| l.to_string()).collect(),
            fetch_failures: AtomicUsize::new(fetch_failures),
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CaptionSource for ScriptedCaptions {
    async fn list_languages(&self, _video_id: &str) -> Result<Vec<String>> {
        Ok(self.languages.clone())
    }

    async fn fetch_captions(&self, _video_id: &str, language: &str) -> Result<Captions> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let remaining = self.fetch_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fetch_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::upstream("timedtext", "502 Bad Gateway"));
        }
        Ok(Captions::new(
            language,
            vec![
                CaptionSegment {
                    text: "welcome back".to_string(),
                    start: 0.0,
                    duration: 1.5,
                },
                CaptionSegment {
                    text: "to the channel".to_string(),
                    start: 1.5,
                    duration: 2.25,
                },
            ],
        ))
    }
}

struct CannedInsights;

#[async_trait]
impl InsightGenerator for CannedInsights {
    async fn analyze(&self, transcript: &str) -> Result<StructuredInsights> {
        Ok(StructuredInsights {
            summary: transcript.to_uppercase(),
            topics: vec!["intro".to_string(), "channel".to_string()],
            sentiment: Sentiment {
                positive: 80,
                negative: 5,
                neutral: 15,
                emotions: vec!["joy".to_string(), "excitement".to_string(), "warmth".to_string()],
            },
            key_points: vec!["The host greets viewers".to_string()],
            quotes: vec!["welcome back".to_string()],
        })
    }

    async fn analyze_text(&self, transcript: &str) -> Result<String> {
        Ok(format!("{} words analyzed", transcript.split_whitespace().count()))
    }
}

fn analyzer(captions: Arc<ScriptedCaptions>) -> Analyzer {
    Analyzer::new(captions, Arc::new(CannedInsights))
}

#[tokio::test]
async fn structured_pipeline_produces_shaped_response() {
    let captions = Arc::new(ScriptedCaptions::new(&["es", "en"], 0));
    let response = analyzer(captions)
        .analyze("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        .await
        .expect("pipeline succeeds");

    assert_eq!(response.video_info.id, "dQw4w9WgXcQ");
    assert_eq!(response.selected_language, "en");
    assert_eq!(response.available_languages, vec!["es", "en"]);
    assert_eq!(response.transcript.len(), 2);
    assert_eq!(response.transcript[1].end, 3.75);
    assert_eq!(response.insights.summary, "WELCOME BACK TO THE CHANNEL");
    assert!(response.insights.topics.iter().all(|t| t.relevance == 50));
    assert!(response.insights.sentiment.emotions.iter().all(|e| e.strength == 33));
    assert_eq!(response.insights.key_points[0].description, "The host greets viewers");
}

#[tokio::test]
async fn preferred_language_is_configurable() {
    let captions = Arc::new(ScriptedCaptions::new(&["en", "es"], 0));
    let video = analyzer(captions)
        .with_preferred_lang("es")
        .analyze_video("dQw4w9WgXcQ")
        .await
        .expect("pipeline succeeds");

    assert_eq!(video.captions.language, "es");
    assert_eq!(video.captions.text, "welcome back to the channel");
}

#[tokio::test]
async fn text_mode_puts_analysis_in_summary() {
    let captions = Arc::new(ScriptedCaptions::new(&["en"], 0));
    let video = analyzer(captions)
        .with_mode(AnalysisMode::Text)
        .analyze_video("dQw4w9WgXcQ")
        .await
        .expect("pipeline succeeds");

    assert_eq!(video.analysis, Analysis::FreeText("5 words analyzed".to_string()));
    let response = video.to_response();
    assert_eq!(response.insights.summary, "5 words analyzed");
    assert!(response.insights.topics.is_empty());
}

#[tokio::test(start_paused = true)]
async fn caption_fetch_is_retried_once() {
    let captions = Arc::new(ScriptedCaptions::new(&["en"], 1));
    let response = analyzer(captions.clone())
        .with_max_attempts(2)
        .analyze("dQw4w9WgXcQ")
        .await;

    assert!(response.is_ok());
    assert_eq!(captions.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn persistent_fetch_failure_is_upstream_error() {
    let captions = Arc::new(ScriptedCaptions::new(&["en"], 5));
    let err = analyzer(captions.clone())
        .with_max_attempts(2)
        .analyze("dQw4w9WgXcQ")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upstream { .. }));
    assert!(err.to_string().starts_with("Failed to get captions"));
    assert_eq!(captions.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unresolvable_url_is_invalid_input() {
    let captions = Arc::new(ScriptedCaptions::new(&["en"], 0));
    let err = analyzer(captions.clone()).analyze("https://example.com/watch").await.unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(captions.fetches.load(Ordering::SeqCst), 0);
}
