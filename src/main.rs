use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::HeaderValue;
use clap::Parser;
use eyre::{Result, eyre};
use log::{LevelFilter, debug, info};

use ytlens::analyzer::{Analyzer, NO_CAPTIONS};
use ytlens::config::{self, AnalysisMode, Config};
use ytlens::insights::OpenAiInsights;
use ytlens::youtube::YouTubeCaptions;
use ytlens::{output, server};

mod cli;

use cli::{Cli, Command};

fn setup_logging(to_file: bool, verbose: bool) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(if verbose { LevelFilter::Debug } else { LevelFilter::Info });
    builder.parse_default_env();

    if to_file {
        let log_dir = log_dir();
        std::fs::create_dir_all(&log_dir)?;
        let log_file = log_dir.join("ytlens.log");
        let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);
        builder.target(env_logger::Target::Pipe(target));
        builder.init();
        info!("Logging initialized: {}", log_file.display());
    } else {
        builder.init();
    }

    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytlens")
        .join("logs")
}

fn http_client(config: &Config) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(config.request_timeout()).build()?)
}

fn build_analyzer(
    config: &Config,
    client: reqwest::Client,
    model: Option<String>,
    mode: Option<AnalysisMode>,
    require_key: bool,
) -> Result<Analyzer> {
    // The credential is only optional for commands that never reach the model
    let api_key = match config::api_key() {
        Ok(key) => key,
        Err(e) if require_key => return Err(e.into()),
        Err(_) => String::new(),
    };
    let model = model.unwrap_or_else(|| config.model().to_string());
    debug!("Using model {model} at {}", config.api_base());

    let insights = OpenAiInsights::new(client.clone(), api_key, model).with_api_base(config.api_base());
    let max_attempts = ytlens::retry::check_attempts(config.max_attempts())?;

    Ok(Analyzer::new(Arc::new(YouTubeCaptions::new(client)), Arc::new(insights))
        .with_preferred_lang(config.preferred_lang())
        .with_mode(mode.unwrap_or(config.analysis_mode()))
        .with_max_attempts(max_attempts))
}

async fn run_serve(
    config: &Config,
    bind: Option<String>,
    model: Option<String>,
    mode: Option<AnalysisMode>,
) -> Result<()> {
    let analyzer = build_analyzer(config, http_client(config)?, model, mode, true)?;
    let origin = HeaderValue::from_str(config.cors_allow_origin())
        .map_err(|e| eyre!("invalid cors_allow_origin: {e}"))?;

    let bind = bind.unwrap_or_else(|| config.bind().to_string());
    let app = server::router(Arc::new(analyzer), origin);
    server::serve(&bind, app).await?;
    Ok(())
}

async fn run_captions(config: &Config, url: &str, lang: Option<String>, output_dir: Option<PathBuf>) -> Result<()> {
    let analyzer = build_analyzer(config, http_client(config)?, None, None, false)?;
    let video_id = analyzer.resolve(url)?;

    let languages = analyzer.languages(&video_id).await?;
    info!("Available languages: {languages:?}");

    let language = match lang {
        Some(lang) => lang,
        None => analyzer
            .choose_language(&languages)
            .ok_or_else(|| eyre!(NO_CAPTIONS))?,
    };

    let captions = analyzer.captions(&video_id, &language).await?;
    let dir = output_dir.unwrap_or_else(|| config.output_dir());
    let (json_path, text_path) = output::save_captions(&dir, &video_id, &captions)?;

    println!("{}", json_path.display());
    println!("{}", text_path.display());
    Ok(())
}

async fn run_analyze(
    config: &Config,
    url: &str,
    output_dir: Option<PathBuf>,
    model: Option<String>,
    mode: Option<AnalysisMode>,
    json: bool,
) -> Result<()> {
    let analyzer = build_analyzer(config, http_client(config)?, model, mode, true)?;
    let video = analyzer.analyze_video(url).await?;

    let dir = output_dir.unwrap_or_else(|| config.output_dir());
    let (json_path, text_path) = output::save_captions(&dir, &video.video_id, &video.captions)?;
    let analysis_path = output::save_analysis(&dir, &video.video_id, &output::render_analysis(&video.analysis)?)?;
    info!("Analysis complete for {}", video.video_id);

    if json {
        println!("{}", serde_json::to_string_pretty(&video.to_response())?);
    } else {
        for path in [json_path, text_path, analysis_path] {
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn run_analyze_file(
    config: &Config,
    file: &Path,
    output_dir: Option<PathBuf>,
    model: Option<String>,
) -> Result<()> {
    let video_id = output::video_id_from_caption_file(file)
        .ok_or_else(|| eyre!("cannot derive a video ID from {}", file.display()))?;
    let captions = output::load_caption_text(file)?;

    let analyzer = build_analyzer(config, http_client(config)?, model, None, true)?;
    let analysis = analyzer.text_insights(&captions).await?;

    let dir = output_dir.unwrap_or_else(|| config.output_dir());
    let path = output::save_analysis(&dir, &video_id, &analysis)?;
    println!("{}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let serving = matches!(cli.command, Command::Serve { .. });
    setup_logging(!serving, cli.verbose)?;

    let config = Config::load()?;

    match cli.command {
        Command::Serve { bind, model, mode } => run_serve(&config, bind, model, mode).await,
        Command::Captions { url, lang, output_dir } => run_captions(&config, &url, lang, output_dir).await,
        Command::Analyze {
            url,
            output_dir,
            model,
            mode,
            json,
        } => run_analyze(&config, &url, output_dir, model, mode, json).await,
        Command::AnalyzeFile {
            file,
            output_dir,
            model,
        } => run_analyze_file(&config, &file, output_dir, model).await,
    }
}
