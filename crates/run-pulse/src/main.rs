use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use shared::{
    build_segments, default_sources, resume_segment_index, ClosingLine, Config, EpisodeDocument,
    Narrator, OutroGenerator, Pipeline, PlaybackEvent, RelayGateway, Session, SpeechEngine, Voice,
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "run-pulse")]
#[command(about = "Assemble today's Boston Pulse episode and narrate it")]
struct Args {
    /// Re-fetch feeds even if the pool cache is still fresh
    #[arg(short, long)]
    refresh: bool,

    /// Preferred voice name (exact match against the engine's voices)
    #[arg(long)]
    voice: Option<String>,

    /// Speaking rate; the engine clamps it to its supported range
    #[arg(long, default_value = "1.0")]
    rate: f32,

    /// Resume narration from this story index (0-based) instead of the top
    #[arg(long)]
    from_story: Option<usize>,

    /// Skip the generated closing line even when an API key is configured
    #[arg(long)]
    no_ai: bool,

    /// Save the finalized episode for later transcript export
    #[arg(short, long)]
    save: bool,
}

/// Speech engine that reads the episode to the terminal, pacing output
/// roughly like speech so start/end notifications mean something.
struct ConsoleSpeech;

#[async_trait]
impl SpeechEngine for ConsoleSpeech {
    fn voices(&self) -> Vec<Voice> {
        vec![Voice {
            name: "Console Narrator".to_string(),
            lang: "en-US".to_string(),
        }]
    }

    async fn speak(&self, text: &str, _voice: Option<&Voice>, rate: f32) -> Result<()> {
        let rate = rate.clamp(0.5, 2.0);
        println!("\n{text}");

        let words = text.split_whitespace().count() as f32;
        let seconds = (words / (3.0 * rate)).min(2.0);
        tokio::time::sleep(std::time::Duration::from_secs_f32(seconds)).await;

        Ok(())
    }

    fn cancel(&self) {}
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env();

    let gateway = Arc::new(RelayGateway::new(config.gateway_url.clone())?);

    let closing_line: Option<Box<dyn ClosingLine>> = match (&config.anthropic_api_key, args.no_ai)
    {
        (Some(key), false) => Some(Box::new(OutroGenerator::new(key.clone())?)),
        _ => None,
    };

    let pipeline = Pipeline::new(gateway, default_sources(), closing_line);
    let mut session = Session::new();

    println!("📡 Assembling today's pulse...");
    let episode = pipeline.run(&mut session, args.refresh).await?;

    println!("\n✓ {}-story pulse ready", episode.stories.len());
    for (index, story) in episode.stories.iter().enumerate() {
        let cached = if story.from_cache { ", cached" } else { "" };
        println!(
            "  {}) [{}] {} ({}, {} chars{})",
            index + 1,
            story.item.source,
            story.item.title,
            story.method,
            story.editorial_excerpt.len(),
            cached
        );
    }

    if args.save {
        let filename = format!("pulse-{}.json", chrono::Utc::now().format("%Y-%m-%d-%H%M%S"));
        let doc = EpisodeDocument::new(episode.clone());
        let path = shared::io::save_episode(&doc, &filename)?;
        println!("✓ Episode saved to: {}", path.display());
    }

    let segments = build_segments(&episode);
    let start_index = match args.from_story {
        Some(story_index) => resume_segment_index(&segments, &episode, story_index),
        None => 0,
    };

    let (narrator, mut events) = Narrator::new(Arc::new(ConsoleSpeech));

    let story_count = episode.stories.len();
    let listener = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                PlaybackEvent::IntroStarted => {}
                PlaybackEvent::StoryActivated(index) => {
                    eprintln!("▶ story {}/{}", index + 1, story_count)
                }
                PlaybackEvent::OutroActivated => eprintln!("▶ outro"),
                PlaybackEvent::Finished => eprintln!("\n✅ Pulse finished."),
            }
        }
    });

    narrator
        .play(&segments, args.voice.as_deref(), args.rate, start_index)
        .await;

    drop(narrator);
    listener.await?;

    Ok(())
}
