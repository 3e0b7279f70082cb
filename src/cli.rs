use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ytlens::config::AnalysisMode;

#[derive(Parser)]
#[command(
    name = "ytlens",
    about = "YouTube caption analyzer",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to listen on (default 0.0.0.0:8000)
        #[arg(short, long)]
        bind: Option<String>,

        /// LLM model for analysis
        #[arg(long)]
        model: Option<String>,

        /// Structured insights or free-text analysis
        #[arg(long, value_enum)]
        mode: Option<AnalysisMode>,
    },

    /// Download captions to {video_id}_{lang}.json and .txt
    Captions {
        /// YouTube video URL or video ID
        url: String,

        /// Caption language (default: preferred language, else the first available)
        #[arg(short, long)]
        lang: Option<String>,

        /// Directory for output files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Fetch captions, analyze them, and save captions plus analysis
    Analyze {
        /// YouTube video URL or video ID
        url: String,

        /// Directory for output files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// LLM model for analysis
        #[arg(long)]
        model: Option<String>,

        /// Structured insights or free-text analysis
        #[arg(long, value_enum)]
        mode: Option<AnalysisMode>,

        /// Print the API response shape instead of file paths
        #[arg(long)]
        json: bool,
    },

    /// Analyze a saved caption text file into {video_id}_analysis.txt
    AnalyzeFile {
        /// Caption text file, e.g. captions/VIDEOID_en.txt
        file: PathBuf,

        /// Directory for output files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// LLM model for analysis
        #[arg(long)]
        model: Option<String>,
    },
}
