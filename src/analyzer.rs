//! Per-request pipeline: resolve → list languages → fetch captions →
//! analyze → shape.
//!
//! An [`Analyzer`] holds no mutable state. Build one at startup and share it
//! behind an `Arc`.

use std::sync::Arc;

use log::{debug, info};

use crate::config::AnalysisMode;
use crate::error::{Error, Result};
use crate::insights::InsightGenerator;
use crate::retry::retry;
use crate::shape::{Analysis, AnalysisResponse, shape};
use crate::youtube::CaptionSource;
use crate::{Captions, extract_video_id};

pub const INVALID_URL: &str = "Invalid YouTube URL";
pub const NO_CAPTIONS: &str = "No captions available for this video";

/// Everything gathered for one video before shaping
#[derive(Debug, Clone)]
pub struct VideoAnalysis {
    pub video_id: String,
    pub available_languages: Vec<String>,
    pub captions: Captions,
    pub analysis: Analysis,
}

impl VideoAnalysis {
    pub fn to_response(&self) -> AnalysisResponse {
        shape(
            &self.video_id,
            &self.captions.segments,
            &self.analysis,
            &self.available_languages,
            &self.captions.language,
        )
    }
}

pub struct Analyzer {
    captions: Arc<dyn CaptionSource>,
    insights: Arc<dyn InsightGenerator>,
    preferred_lang: String,
    mode: AnalysisMode,
    max_attempts: u32,
}

impl Analyzer {
    pub fn new(captions: Arc<dyn CaptionSource>, insights: Arc<dyn InsightGenerator>) -> Self {
        Self {
            captions,
            insights,
            preferred_lang: "en".to_string(),
            mode: AnalysisMode::default(),
            max_attempts: 1,
        }
    }

    pub fn with_preferred_lang(mut self, lang: impl Into<String>) -> Self {
        self.preferred_lang = lang.into();
        self
    }

    pub fn with_mode(mut self, mode: AnalysisMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn resolve(&self, url: &str) -> Result<String> {
        extract_video_id(url).ok_or_else(|| Error::InvalidInput(INVALID_URL.to_string()))
    }

    /// Caption languages for a video; an empty listing is `NotFound`.
    pub async fn languages(&self, video_id: &str) -> Result<Vec<String>> {
        let languages = retry(self.max_attempts, || self.captions.list_languages(video_id)).await?;
        if languages.is_empty() {
            return Err(Error::NotFound(NO_CAPTIONS.to_string()));
        }
        Ok(languages)
    }

    pub async fn captions(&self, video_id: &str, language: &str) -> Result<Captions> {
        retry(self.max_attempts, || self.captions.fetch_captions(video_id, language)).await
    }

    /// Run the model in the configured mode.
    pub async fn insights(&self, transcript: &str) -> Result<Analysis> {
        match self.mode {
            AnalysisMode::Structured => retry(self.max_attempts, || self.insights.analyze(transcript))
                .await
                .map(Analysis::Structured),
            AnalysisMode::Text => retry(self.max_attempts, || self.insights.analyze_text(transcript))
                .await
                .map(Analysis::FreeText),
        }
    }

    /// Free-text analysis regardless of mode, for the offline file analyzer.
    pub async fn text_insights(&self, transcript: &str) -> Result<String> {
        retry(self.max_attempts, || self.insights.analyze_text(transcript)).await
    }

    pub fn choose_language(&self, languages: &[String]) -> Option<String> {
        languages
            .iter()
            .find(|l| **l == self.preferred_lang)
            .or_else(|| languages.first())
            .cloned()
    }

    /// Gather captions and insights for a URL without shaping them.
    pub async fn analyze_video(&self, url: &str) -> Result<VideoAnalysis> {
        let video_id = self.resolve(url)?;
        info!("Analyzing video {video_id}");

        let available_languages = self.languages(&video_id).await?;
        let language = self
            .choose_language(&available_languages)
            .ok_or_else(|| Error::NotFound(NO_CAPTIONS.to_string()))?;
        debug!("Selected language {language} from {available_languages:?}");

        let captions = self
            .captions(&video_id, &language)
            .await
            .map_err(|e| Error::upstream("Failed to get captions", e))?;
        debug!("Fetched {} caption segments", captions.segments.len());

        let analysis = self
            .insights(&captions.text)
            .await
            .map_err(|e| Error::upstream("Failed to analyze captions", e))?;

        Ok(VideoAnalysis {
            video_id,
            available_languages,
            captions,
            analysis,
        })
    }

    pub async fn analyze(&self, url: &str) -> Result<AnalysisResponse> {
        Ok(self.analyze_video(url).await?.to_response())
    }
}
