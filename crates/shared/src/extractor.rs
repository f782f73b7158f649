use scraper::{ElementRef, Html, Selector};

use crate::classifier::is_editorial;

/// Soft floor: stop adding paragraphs once the excerpt reaches this length.
pub const TARGET_MIN: usize = 250;
/// Hard cap: never start another paragraph past this length.
pub const TARGET_MAX: usize = 1100;

/// Regions that never contain narration-worthy text.
const STRIP_TAGS: [&str; 7] = [
    "script",
    "style",
    "nav",
    "footer",
    "header",
    "aside",
    "figcaption",
];
const STRIP_CLASSES: [&str; 4] = ["ad", "caption", "credits", "advertisement"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    pub paragraph_count: usize,
}

impl Extraction {
    fn empty() -> Self {
        Self {
            text: String::new(),
            paragraph_count: 0,
        }
    }
}

/// Reduces raw markup to a narration-ready excerpt.
///
/// Picks the most specific content container available, walks its
/// paragraphs in document order, keeps the ones the classifier accepts,
/// and grows the excerpt greedily: hard-capped at `target_max` (checked
/// before appending), soft-stopped at `target_min` (checked after).
///
/// Empty text is a meaningful result signaling extraction failure, not
/// an error.
pub fn extract_editorial_content(html: &str, target_min: usize, target_max: usize) -> Extraction {
    let doc = Html::parse_document(html);

    let container_selectors = ["article", ".article-content", "main"];
    let container = container_selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|sel| doc.select(&sel).next())
        .unwrap_or_else(|| doc.root_element());

    let paragraph = Selector::parse("p").unwrap();
    let mut accumulated = String::new();
    let mut paragraph_count = 0;

    for p in container.select(&paragraph) {
        if in_stripped_region(p) {
            continue;
        }
        let text: String = p.text().collect();
        let text = text.trim();
        if !is_editorial(text) {
            continue;
        }

        if accumulated.len() >= target_max {
            break;
        }
        if !accumulated.is_empty() {
            accumulated.push_str("\n\n");
        }
        accumulated.push_str(text);
        paragraph_count += 1;
        if accumulated.len() >= target_min {
            break;
        }
    }

    if accumulated.is_empty() {
        return Extraction::empty();
    }
    Extraction {
        text: accumulated.trim().to_string(),
        paragraph_count,
    }
}

/// True when the element itself carries a boilerplate class, or any
/// ancestor is a non-content region.
fn in_stripped_region(el: ElementRef<'_>) -> bool {
    if has_stripped_class(el) {
        return true;
    }
    el.ancestors().filter_map(ElementRef::wrap).any(|anc| {
        STRIP_TAGS.contains(&anc.value().name()) || has_stripped_class(anc)
    })
}

fn has_stripped_class(el: ElementRef<'_>) -> bool {
    el.value().classes().any(|c| STRIP_CLASSES.contains(&c))
}
