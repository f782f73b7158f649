/// Fragments shorter than this never read as a full editorial paragraph.
const MIN_EDITORIAL_LEN: usize = 60;

/// Caption and byline openers that mark a fragment as non-editorial.
const BLACKLISTED_PREFIXES: [&str; 8] = [
    "photo:",
    "image:",
    "courtesy of",
    "by ",
    "credit:",
    "source:",
    "updated",
    "published",
];

/// Boilerplate markers that disqualify a fragment wherever they appear.
const BLACKLISTED_KEYWORDS: [&str; 7] = [
    "getty images",
    "photo by",
    "caption:",
    "staff writer",
    "associated press",
    "advertisement",
    "appeared first on",
];

/// Decides whether a text fragment reads as real editorial prose rather
/// than a caption, byline, or syndication footer. Pure and deterministic.
pub fn is_editorial(text: &str) -> bool {
    let clean = text.trim();
    if clean.len() < MIN_EDITORIAL_LEN {
        return false;
    }

    let lowercase = clean.to_lowercase();
    if BLACKLISTED_PREFIXES.iter().any(|p| lowercase.starts_with(p)) {
        return false;
    }
    if BLACKLISTED_KEYWORDS.iter().any(|k| lowercase.contains(k)) {
        return false;
    }

    true
}
