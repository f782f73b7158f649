use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::models::Episode;
use crate::sources::SHOW_NAME;

/// Names that mark a voice as worth hearing. Everything else is a
/// robotic legacy voice on most platforms.
const QUALITY_KEYWORDS: [&str; 12] = [
    "natural", "google", "premium", "enhanced", "neural", "samantha", "alex", "daniel",
    "serena", "aria", "jenny", "guy",
];
const LEGACY_MARKERS: [&str; 3] = ["compact", "classic", "legacy"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

/// Narration boundary. The engine speaks one segment at a time and owns
/// rate clamping; `cancel` must be safe to call at any moment.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    fn voices(&self) -> Vec<Voice>;
    async fn speak(&self, text: &str, voice: Option<&Voice>, rate: f32) -> Result<()>;
    fn cancel(&self);
}

/// Lifecycle notifications delivered to the caller, in narration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    IntroStarted,
    StoryActivated(usize),
    OutroActivated,
    Finished,
}

/// One atomic unit of narration.
#[derive(Debug, Clone)]
pub struct SpeechSegment {
    pub text: String,
    pub on_start: Option<PlaybackEvent>,
    pub on_end: Option<PlaybackEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Finished,
}

/// Turns a finalized episode into the ordered narration script: one
/// intro, one segment per excerpt paragraph (the first of each story
/// prefixed with its source and title), one outro.
pub fn build_segments(episode: &Episode) -> Vec<SpeechSegment> {
    let count_text = if episode.stories.len() == 1 {
        "One story".to_string()
    } else {
        format!("{} stories", episode.stories.len())
    };

    let mut segments = vec![SpeechSegment {
        text: format!("{SHOW_NAME}. {count_text} for today."),
        on_start: Some(PlaybackEvent::IntroStarted),
        on_end: None,
    }];

    for (index, story) in episode.stories.iter().enumerate() {
        for (paragraph_index, paragraph) in story.editorial_excerpt.split("\n\n").enumerate() {
            let segment = if paragraph_index == 0 {
                SpeechSegment {
                    text: format!(
                        "From {}. {}. {}",
                        story.item.source, story.item.title, paragraph
                    ),
                    on_start: Some(PlaybackEvent::StoryActivated(index)),
                    on_end: None,
                }
            } else {
                SpeechSegment {
                    text: paragraph.to_string(),
                    on_start: None,
                    on_end: None,
                }
            };
            segments.push(segment);
        }
    }

    segments.push(SpeechSegment {
        text: episode.outro.clone(),
        on_start: Some(PlaybackEvent::OutroActivated),
        on_end: Some(PlaybackEvent::Finished),
    });

    segments
}

/// Maps a story index back to a narration position: the first segment
/// that mentions the story's title. Paragraph-granular, which is close
/// enough for resume.
pub fn resume_segment_index(
    segments: &[SpeechSegment],
    episode: &Episode,
    story_index: usize,
) -> usize {
    episode
        .stories
        .get(story_index)
        .and_then(|story| {
            segments
                .iter()
                .position(|segment| segment.text.contains(&story.item.title))
        })
        .unwrap_or(0)
}

/// Keeps only English voices that sound human, or all English voices
/// when the quality filter would leave nothing.
pub fn natural_voices(all: &[Voice]) -> Vec<Voice> {
    let english: Vec<Voice> = all
        .iter()
        .filter(|v| v.lang.starts_with("en"))
        .cloned()
        .collect();

    let natural: Vec<Voice> = english
        .iter()
        .filter(|v| {
            let name = v.name.to_lowercase();
            !LEGACY_MARKERS.iter().any(|m| name.contains(m))
                && QUALITY_KEYWORDS.iter().any(|k| name.contains(k))
        })
        .cloned()
        .collect();

    if natural.is_empty() {
        english
    } else {
        natural
    }
}

/// Exact preferred-name match first, then a vendor-preferred en-US
/// voice, then any en-US, any English, any voice at all.
pub fn select_voice(voices: &[Voice], preferred: Option<&str>) -> Option<Voice> {
    if let Some(name) = preferred {
        if let Some(voice) = voices.iter().find(|v| v.name == name) {
            return Some(voice.clone());
        }
    }

    let regional: Vec<&Voice> = voices.iter().filter(|v| v.lang == "en-US").collect();
    regional
        .iter()
        .find(|v| v.name.contains("Google") || v.name.contains("Microsoft"))
        .copied()
        .or_else(|| regional.first().copied())
        .cloned()
        .or_else(|| voices.iter().find(|v| v.lang.starts_with("en")).cloned())
        .or_else(|| voices.first().cloned())
}

/// Playback state machine. Narrates segments strictly in order, one at
/// a time; a failing segment is logged and skipped. `stop` (and any new
/// `play`) cancels in-flight narration and discards the remainder.
pub struct Narrator {
    engine: Arc<dyn SpeechEngine>,
    events: mpsc::UnboundedSender<PlaybackEvent>,
    state: Mutex<PlaybackState>,
    generation: AtomicU64,
}

impl Narrator {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let narrator = Self {
            engine,
            events,
            state: Mutex::new(PlaybackState::Idle),
            generation: AtomicU64::new(0),
        };
        (narrator, receiver)
    }

    pub fn state(&self) -> PlaybackState {
        *self.state.lock().unwrap()
    }

    /// Idempotent: always lands in `Idle`, cancelling anything in
    /// flight and invalidating any running `play` loop.
    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.engine.cancel();
        *self.state.lock().unwrap() = PlaybackState::Idle;
    }

    pub async fn play(
        &self,
        segments: &[SpeechSegment],
        voice_preference: Option<&str>,
        rate: f32,
        start_index: usize,
    ) {
        self.stop();
        let generation = self.generation.load(Ordering::SeqCst);
        *self.state.lock().unwrap() = PlaybackState::Playing;

        let voice = select_voice(&natural_voices(&self.engine.voices()), voice_preference);

        for segment in segments.iter().skip(start_index) {
            if self.generation.load(Ordering::SeqCst) != generation {
                return;
            }

            if let Some(event) = segment.on_start {
                self.emit(event);
            }

            if let Err(e) = self.engine.speak(&segment.text, voice.as_ref(), rate).await {
                eprintln!("Narration error, skipping segment: {e:#}");
            }

            if self.generation.load(Ordering::SeqCst) != generation {
                return;
            }

            if let Some(event) = segment.on_end {
                self.emit(event);
                if event == PlaybackEvent::Finished {
                    *self.state.lock().unwrap() = PlaybackState::Finished;
                }
            }
        }

        let mut state = self.state.lock().unwrap();
        if *state == PlaybackState::Playing {
            *state = PlaybackState::Idle;
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        let _ = self.events.send(event);
    }
}
