use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use shared::transcript::TranscriptGenerator;
use std::io::{self, Write as _};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "export-transcript")]
#[command(about = "Render a saved Boston Pulse episode as HTML and a narration script")]
struct Args {
    /// Path to the episode JSON file (if not provided, will list saved episodes)
    #[arg(short, long)]
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let episode_file = if let Some(path) = args.file {
        path
    } else {
        select_episode_file()?
    };

    println!("📖 Reading episode: {}", episode_file.display());
    let doc = shared::io::load_episode(&episode_file)?;

    let date = DateTime::parse_from_rfc3339(&doc.created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    println!(
        "✓ {} stories, assembled {}",
        doc.episode.stories.len(),
        doc.created_at
    );

    println!("\n📝 Generating HTML transcript...");
    let html = TranscriptGenerator::generate(&doc.episode, date);
    let html_path =
        TranscriptGenerator::save(&html, "html", date).context("Failed to save HTML file")?;
    println!("✓ HTML saved to: {}", html_path.display());

    println!("\n📝 Generating narration script...");
    let script = TranscriptGenerator::generate_text(&doc.episode);
    let script_path =
        TranscriptGenerator::save(&script, "txt", date).context("Failed to save script file")?;
    println!("✓ Script saved to: {}", script_path.display());

    println!("\n✅ Done!");

    Ok(())
}

fn select_episode_file() -> Result<PathBuf> {
    let episodes = shared::io::list_episode_files()?;

    if episodes.is_empty() {
        anyhow::bail!("No saved episodes found. Run run-pulse --save first.");
    }

    println!("Available episodes:\n");
    for (i, (path, doc)) in episodes.iter().enumerate() {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        println!(
            "  {}) {} ({} stories, {})",
            i + 1,
            filename,
            doc.episode.stories.len(),
            doc.created_at
        );
    }

    print!("\nSelect episode (1-{}): ", episodes.len());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let selection: usize = input
        .trim()
        .parse()
        .context("Invalid selection. Please enter a number.")?;

    if selection < 1 || selection > episodes.len() {
        anyhow::bail!("Selection out of range. Please choose 1-{}", episodes.len());
    }

    Ok(episodes[selection - 1].0.clone())
}
