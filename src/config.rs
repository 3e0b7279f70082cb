use std::path::PathBuf;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::insights::{DEFAULT_API_BASE, DEFAULT_MODEL};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_LANG: &str = "en";
const DEFAULT_OUTPUT_DIR: &str = "analysis";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_ATTEMPTS: u32 = 2;
const DEFAULT_CORS_ORIGIN: &str = "*";

/// Which kind of reply `/analyze` asks the model for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    #[default]
    Structured,
    /// Free-text reply placed in the summary; everything else stays empty
    Text,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub bind: Option<String>,
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub preferred_lang: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub analysis_mode: Option<AnalysisMode>,
    pub request_timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub cors_allow_origin: Option<String>,
}

impl Config {
    /// Load config from ~/.config/ytlens/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
            Self::parse(&content)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    pub fn preferred_lang(&self) -> &str {
        self.preferred_lang.as_deref().unwrap_or(DEFAULT_LANG)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn analysis_mode(&self) -> AnalysisMode {
        self.analysis_mode.unwrap_or_default()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS)
    }

    pub fn cors_allow_origin(&self) -> &str {
        self.cors_allow_origin.as_deref().unwrap_or(DEFAULT_CORS_ORIGIN)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytlens")
        .join("config.toml")
}

/// Read the LLM credential; its absence is fatal at startup.
pub fn api_key() -> Result<String> {
    api_key_from(std::env::var(API_KEY_ENV).ok())
}

fn api_key_from(value: Option<String>) -> Result<String> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(Error::Config(format!("{API_KEY_ENV} not found in environment variables"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
bind = "127.0.0.1:9000"
model = "gpt-4o-mini"
api_base = "http://localhost:11434/v1"
preferred_lang = "es"
output_dir = "/tmp/ytlens"
analysis_mode = "text"
request_timeout_secs = 15
max_attempts = 3
cors_allow_origin = "http://localhost:3000"
"#;
        let config = Config::parse(toml_str).unwrap();
        assert_eq!(config.bind(), "127.0.0.1:9000");
        assert_eq!(config.model(), "gpt-4o-mini");
        assert_eq!(config.api_base(), "http://localhost:11434/v1");
        assert_eq!(config.preferred_lang(), "es");
        assert_eq!(config.output_dir(), PathBuf::from("/tmp/ytlens"));
        assert_eq!(config.analysis_mode(), AnalysisMode::Text);
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.max_attempts(), 3);
        assert_eq!(config.cors_allow_origin(), "http://localhost:3000");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert!(config.bind.is_none());
        assert_eq!(config.bind(), "0.0.0.0:8000");
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.preferred_lang(), "en");
        assert_eq!(config.output_dir(), PathBuf::from("analysis"));
        assert_eq!(config.analysis_mode(), AnalysisMode::Structured);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.max_attempts(), 2);
        assert_eq!(config.cors_allow_origin(), "*");
    }

    #[test]
    fn test_parse_partial_config() {
        let config = Config::parse(r#"preferred_lang = "fr""#).unwrap();
        assert_eq!(config.preferred_lang(), "fr");
        assert!(config.model.is_none());
    }

    #[test]
    fn test_parse_bad_mode() {
        let err = Config::parse(r#"analysis_mode = "poetry""#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_api_key_required() {
        assert!(matches!(api_key_from(None), Err(Error::Config(_))));
        assert!(matches!(api_key_from(Some("  ".to_string())), Err(Error::Config(_))));
        assert_eq!(api_key_from(Some("sk-test\n".to_string())).unwrap(), "sk-test");
    }
}
