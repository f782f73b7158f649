use anyhow::{Context, Result};
use chrono::DateTime;
use std::fs;
use std::path::PathBuf;

use crate::models::EpisodeDocument;

/// Get the default directory for storing episode files
pub fn get_default_episodes_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .context("Could not determine local data directory")?
        .join("boston-pulse")
        .join("episodes");

    fs::create_dir_all(&data_dir).context("Failed to create episodes directory")?;

    Ok(data_dir)
}

/// Save a finalized episode to a JSON file
pub fn save_episode(doc: &EpisodeDocument, filename: &str) -> Result<PathBuf> {
    let episodes_dir = get_default_episodes_dir()?;
    let filepath = episodes_dir.join(filename);

    let json = serde_json::to_string_pretty(doc).context("Failed to serialize episode")?;

    fs::write(&filepath, json).context("Failed to write episode file")?;

    Ok(filepath)
}

/// Load an episode from a JSON file
pub fn load_episode(filepath: &PathBuf) -> Result<EpisodeDocument> {
    if !filepath.exists() {
        anyhow::bail!("Episode file not found: {}", filepath.display());
    }

    let content = fs::read_to_string(filepath)
        .with_context(|| format!("Failed to read episode file: {}", filepath.display()))?;

    let doc: EpisodeDocument = serde_json::from_str(&content).with_context(|| {
        format!(
            "Failed to parse episode JSON from {}. The file may be corrupted or not an episode file.",
            filepath.display()
        )
    })?;

    if doc.version != "1.0" {
        anyhow::bail!(
            "Unsupported episode file version: {}. Expected 1.0. Please regenerate with run-pulse.",
            doc.version
        );
    }

    if doc.episode.stories.is_empty() {
        anyhow::bail!(
            "Episode file {} contains no stories. The file may be incomplete.",
            filepath.display()
        );
    }

    Ok(doc)
}

/// List all saved episodes with metadata, newest first
pub fn list_episode_files() -> Result<Vec<(PathBuf, EpisodeDocument)>> {
    let episodes_dir = get_default_episodes_dir()?;

    let mut files = Vec::new();

    if episodes_dir.exists() {
        for entry in fs::read_dir(&episodes_dir).context("Failed to read episodes directory")? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                match load_episode(&path) {
                    Ok(doc) => {
                        files.push((path, doc));
                    }
                    Err(e) => {
                        eprintln!("Warning: Could not load {}: {}", path.display(), e);
                    }
                }
            }
        }
    }

    files.sort_by(|a, b| {
        let time_a = DateTime::parse_from_rfc3339(&a.1.created_at).ok();
        let time_b = DateTime::parse_from_rfc3339(&b.1.created_at).ok();
        time_b.cmp(&time_a)
    });

    Ok(files)
}
