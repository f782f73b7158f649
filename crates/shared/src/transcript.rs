use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;

use crate::models::Episode;
use crate::narrator::build_segments;
use crate::sources::SHOW_NAME;

pub struct TranscriptGenerator;

impl TranscriptGenerator {
    /// Renders a readable HTML transcript of a finalized episode.
    pub fn generate(episode: &Episode, date: DateTime<Utc>) -> String {
        let mut html = String::new();

        let formatted_date = date.format("%A, %-d %B %Y").to_string();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("  <meta charset=\"UTF-8\">\n");
        html.push_str(&format!(
            "  <title>{} Transcript - {}</title>\n",
            SHOW_NAME, formatted_date
        ));
        html.push_str("  <style>\n");
        html.push_str("    body { font-family: Georgia, serif; max-width: 700px; margin: 40px auto; padding: 0 20px; line-height: 1.7; color: #1c1917; }\n");
        html.push_str("    h1 { text-align: center; border-bottom: 3px solid #1c1917; padding-bottom: 10px; }\n");
        html.push_str("    h1 .date { display: block; font-size: 0.6em; font-weight: normal; color: #78716c; margin-top: 8px; }\n");
        html.push_str("    h2 { margin-top: 40px; }\n");
        html.push_str("    .metadata { color: #78716c; font-size: 0.85em; margin: 5px 0 15px 0; }\n");
        html.push_str("    .link { color: #0369a1; text-decoration: none; }\n");
        html.push_str("    .link:hover { text-decoration: underline; }\n");
        html.push_str("    .outro { margin-top: 50px; padding: 20px; background-color: #f5f5f4; border-left: 4px solid #1c1917; font-style: italic; }\n");
        html.push_str("  </style>\n");
        html.push_str("</head>\n<body>\n");

        html.push_str(&format!(
            "<h1>{} Transcript<span class=\"date\">{}</span></h1>\n",
            SHOW_NAME, formatted_date
        ));

        for (index, story) in episode.stories.iter().enumerate() {
            html.push_str(&format!(
                "<h2>{}. {}</h2>\n",
                index + 1,
                Self::escape_html(&story.item.title)
            ));
            html.push_str("<div class=\"metadata\">\n");
            html.push_str(&format!(
                "  <strong>{}</strong> &middot; <a href=\"{}\" class=\"link\" target=\"_blank\">{}</a>\n",
                Self::escape_html(&story.item.source),
                story.item.link,
                Self::escape_html(&story.item.link)
            ));
            html.push_str("</div>\n");

            for paragraph in story.editorial_excerpt.split("\n\n") {
                html.push_str(&format!("<p>{}</p>\n", Self::escape_html(paragraph)));
            }
        }

        html.push_str(&format!(
            "<div class=\"outro\">&ldquo;{}&rdquo;</div>\n",
            Self::escape_html(&episode.outro)
        ));

        html.push_str("</body>\n</html>");
        html
    }

    /// Renders the narration script as plain text: exactly the segments
    /// the narrator would speak, one block per segment.
    pub fn generate_text(episode: &Episode) -> String {
        build_segments(episode)
            .iter()
            .map(|segment| segment.text.clone())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    pub fn save(content: &str, extension: &str, date: DateTime<Utc>) -> Result<PathBuf> {
        let filename = format!("pulse-{}.{}", date.format("%Y-%m-%d"), extension);

        let documents_dir = dirs::document_dir().unwrap_or_else(|| PathBuf::from("."));
        let filepath = documents_dir.join(&filename);

        fs::write(&filepath, content).context("Failed to write transcript file")?;

        Ok(filepath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnrichedItem, ExtractionMethod, RawItem};
    use chrono::TimeZone;

    fn story(source: &str, title: &str, excerpt: &str) -> EnrichedItem {
        EnrichedItem {
            item: RawItem {
                id: title.to_string(),
                source: source.to_string(),
                source_key: source.to_lowercase(),
                title: title.to_string(),
                excerpt: String::new(),
                link: "https://example.com/story".to_string(),
                pub_date: Utc::now(),
            },
            editorial_excerpt: excerpt.to_string(),
            method: ExtractionMethod::GatewayHtml,
            paragraph_count: excerpt.split("\n\n").count(),
            from_cache: false,
        }
    }

    fn episode() -> Episode {
        Episode {
            stories: vec![story(
                "WBUR",
                "Harbor cleanup",
                "First paragraph.\n\nSecond paragraph.",
            )],
            outro: "What happens next?".to_string(),
        }
    }

    // ==================== HTML Escaping Tests ====================

    #[test]
    fn escape_html_handles_special_characters() {
        assert_eq!(TranscriptGenerator::escape_html("A & B"), "A &amp; B");
        assert_eq!(
            TranscriptGenerator::escape_html("<script>"),
            "&lt;script&gt;"
        );
        assert_eq!(
            TranscriptGenerator::escape_html("He said \"hello\""),
            "He said &quot;hello&quot;"
        );
        assert_eq!(TranscriptGenerator::escape_html("It's here"), "It&#39;s here");
    }

    // ==================== HTML Generation Tests ====================

    #[test]
    fn html_transcript_contains_stories_and_outro() {
        let date = Utc.with_ymd_and_hms(2026, 8, 2, 12, 0, 0).unwrap();
        let html = TranscriptGenerator::generate(&episode(), date);

        assert!(html.contains("Boston Pulse Transcript"));
        assert!(html.contains("1. Harbor cleanup"));
        assert!(html.contains("<p>First paragraph.</p>"));
        assert!(html.contains("<p>Second paragraph.</p>"));
        assert!(html.contains("What happens next?"));
        assert!(html.contains("https://example.com/story"));
    }

    #[test]
    fn html_transcript_escapes_story_titles() {
        let mut ep = episode();
        ep.stories[0].item.title = "Tolls & <detours>".to_string();
        let date = Utc.with_ymd_and_hms(2026, 8, 2, 12, 0, 0).unwrap();
        let html = TranscriptGenerator::generate(&ep, date);

        assert!(html.contains("Tolls &amp; &lt;detours&gt;"));
    }

    // ==================== Text Generation Tests ====================

    #[test]
    fn text_transcript_is_the_narration_script() {
        let text = TranscriptGenerator::generate_text(&episode());

        assert!(text.starts_with("Boston Pulse. One story for today."));
        assert!(text.contains("From WBUR. Harbor cleanup. First paragraph."));
        assert!(text.contains("\n\nSecond paragraph.\n\n"));
        assert!(text.ends_with("What happens next?"));
    }
}
