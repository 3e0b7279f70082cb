use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use log::{debug, info};

use crate::Captions;
use crate::shape::Analysis;

pub fn captions_json_path(dir: &Path, video_id: &str, language: &str) -> PathBuf {
    dir.join(format!("{video_id}_{language}.json"))
}

pub fn captions_text_path(dir: &Path, video_id: &str, language: &str) -> PathBuf {
    dir.join(format!("{video_id}_{language}.txt"))
}

pub fn analysis_path(dir: &Path, video_id: &str) -> PathBuf {
    dir.join(format!("{video_id}_analysis.txt"))
}

/// Render an analysis for the analysis file: free text as-is, structured
/// insights as pretty JSON.
pub fn render_analysis(analysis: &Analysis) -> Result<String> {
    match analysis {
        Analysis::FreeText(text) => Ok(text.clone()),
        Analysis::Structured(insights) => Ok(serde_json::to_string_pretty(insights)?),
    }
}

/// Write `{video_id}_{language}.json` and `{video_id}_{language}.txt`.
pub fn save_captions(dir: &Path, video_id: &str, captions: &Captions) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir).wrap_err_with(|| format!("creating {}", dir.display()))?;

    let json_path = captions_json_path(dir, video_id, &captions.language);
    std::fs::write(&json_path, serde_json::to_string_pretty(captions)?)?;
    debug!("Wrote {}", json_path.display());

    let text_path = captions_text_path(dir, video_id, &captions.language);
    std::fs::write(&text_path, &captions.text)?;
    debug!("Wrote {}", text_path.display());

    info!("Captions saved to {} and {}", json_path.display(), text_path.display());
    Ok((json_path, text_path))
}

/// Write `{video_id}_analysis.txt`.
pub fn save_analysis(dir: &Path, video_id: &str, analysis: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).wrap_err_with(|| format!("creating {}", dir.display()))?;

    let path = analysis_path(dir, video_id);
    std::fs::write(&path, analysis)?;
    info!("Analysis saved to {}", path.display());
    Ok(path)
}

pub fn load_caption_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).wrap_err_with(|| format!("loading captions from {}", path.display()))
}

/// `abc123_en.txt` → `abc123`
pub fn video_id_from_caption_file(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    // Video IDs may contain '_', so only the last one separates the language
    let id = stem.rsplit_once('_').map_or(stem, |(id, _)| id);
    (!id.is_empty()).then(|| id.to_string())
}
