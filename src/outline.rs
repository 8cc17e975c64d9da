use serde::Deserialize;

/// Top-level outline document, as supplied by the caller.
///
/// ```json
/// { "topic": "AI in Healthcare",
///   "slides": [ { "title": "…", "bullets": ["…"] }, "bare title", … ] }
/// ```
#[derive(Debug, Deserialize)]
pub struct Outline {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub slides: Vec<SlideEntry>,
}

/// One outline entry: a structured record, or any other JSON value treated
/// as a bare title.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SlideEntry {
    Structured {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        bullets: Option<Vec<String>>,
    },
    Loose(serde_json::Value),
}

/// Canonical per-slide record after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideContent {
    pub title: String,
    /// `None` when the entry carried no `bullets` key at all; in that case
    /// the body frame is left untouched rather than cleared.
    pub bullets: Option<Vec<String>>,
    /// Search text for the image fetch. Empty means: do not fetch.
    pub query: String,
}

/// Normalizes outline entries in order. No entry is dropped or reordered;
/// entry index determines output slide index.
pub fn normalize(outline: &Outline) -> Vec<SlideContent> {
    outline
        .slides
        .iter()
        .map(|entry| normalize_entry(entry, outline.topic.as_deref()))
        .collect()
}

fn normalize_entry(entry: &SlideEntry, topic: Option<&str>) -> SlideContent {
    match entry {
        SlideEntry::Structured { title, bullets } => {
            let title = title.clone().unwrap_or_default();
            let first_bullet = bullets
                .as_ref()
                .and_then(|b| b.first())
                .map(String::as_str)
                .unwrap_or("");
            let query = build_query(&title, first_bullet, topic);
            SlideContent {
                title,
                bullets: bullets.clone(),
                query,
            }
        }
        SlideEntry::Loose(value) => {
            let title = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let query = build_query(&title, "", topic);
            SlideContent {
                title,
                bullets: Some(Vec::new()),
                query,
            }
        }
    }
}

fn build_query(title: &str, first_bullet: &str, topic: Option<&str>) -> String {
    let combined = format!("{title} {first_bullet}");
    let combined = combined.trim();
    if !combined.is_empty() {
        return combined.to_string();
    }
    topic.map(str::trim).unwrap_or_default().to_string()
}
