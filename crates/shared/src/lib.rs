// Public modules
pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod enricher;
pub mod extractor;
pub mod gateway;
pub mod io;
pub mod models;
pub mod narrator;
pub mod outro;
pub mod pipeline;
pub mod selector;
pub mod sources;
pub mod transcript;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used types
pub use config::Config;
pub use enricher::Enricher;
pub use gateway::{FeedGateway, RelayGateway};
pub use models::{
    EnrichedItem, Episode, EpisodeDocument, ExtractionMethod, FeedDiagnostic, FeedStatus, RawItem,
};
pub use narrator::{
    build_segments, resume_segment_index, Narrator, PlaybackEvent, PlaybackState, SpeechEngine,
    SpeechSegment, Voice,
};
pub use outro::{ClosingLine, OutroGenerator, FALLBACK_OUTRO};
pub use pipeline::{Pipeline, PipelineError, Session};
pub use sources::{default_sources, FeedSource, SHOW_NAME};
