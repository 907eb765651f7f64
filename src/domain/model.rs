use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enclosure {
    pub href: String,
    pub mime_type: Option<String>,
}

/// One item of an RSS or Atom feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published: Option<String>,
    pub description: Option<String>,
    pub itunes_summary: Option<String>,
    pub content_html: Option<String>,
    pub enclosures: Vec<Enclosure>,
    pub dc_identifier: Option<String>,
    pub prism_doi: Option<String>,
}

impl FeedEntry {
    /// Identifier used in podcast history files: the first enclosure, falling back to the link.
    pub fn unique_id(&self) -> &str {
        self.enclosures
            .first()
            .map(|e| e.href.as_str())
            .filter(|href| !href.is_empty())
            .unwrap_or(&self.link)
    }

    pub fn audio_url(&self) -> Option<&str> {
        self.enclosures
            .first()
            .map(|e| e.href.as_str())
            .filter(|href| !href.is_empty())
    }

    /// iTunes summary when present, otherwise the plain description.
    pub fn summary_html(&self) -> &str {
        self.itunes_summary
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedContent {
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub doi_link: Option<String>,
}

impl ScrapedContent {
    pub fn text_only(text: Option<String>) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }

    /// Text that is present and not blank.
    pub fn usable_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// News and paper posts: optional photo with a short caption, then the full text.
    Article {
        message: String,
        caption: String,
        image_url: Option<String>,
    },
    /// A single HTML message with link previews enabled.
    Text { message: String },
    /// A bare video link (so Telegram embeds it) followed by the analysis as a reply.
    VideoThenReply {
        title: String,
        video_url: String,
        analysis: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub source_name: String,
    pub history_file: String,
    pub unique_id: String,
    pub delivery: Delivery,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub pipeline: String,
    pub candidates: usize,
    pub published: Vec<String>,
    pub failed: Vec<(String, String)>,
    pub dry_run: bool,
}

impl RunReport {
    pub fn new(pipeline: &str, dry_run: bool) -> Self {
        Self {
            pipeline: pipeline.to_string(),
            dry_run,
            ..Self::default()
        }
    }

    pub fn nothing_published(&self) -> bool {
        self.published.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_id_prefers_enclosure() {
        let mut entry = FeedEntry {
            link: "https://example.com/ep/1".to_string(),
            ..FeedEntry::default()
        };
        assert_eq!(entry.unique_id(), "https://example.com/ep/1");

        entry.enclosures.push(Enclosure {
            href: "https://cdn.example.com/ep1.mp3".to_string(),
            mime_type: Some("audio/mpeg".to_string()),
        });
        assert_eq!(entry.unique_id(), "https://cdn.example.com/ep1.mp3");
        assert_eq!(entry.audio_url(), Some("https://cdn.example.com/ep1.mp3"));
    }

    #[test]
    fn test_summary_prefers_itunes() {
        let entry = FeedEntry {
            description: Some("plain".to_string()),
            itunes_summary: Some("itunes".to_string()),
            ..FeedEntry::default()
        };
        assert_eq!(entry.summary_html(), "itunes");
        assert_eq!(FeedEntry::default().summary_html(), "");
    }

    #[test]
    fn test_blank_text_is_not_usable() {
        assert!(ScrapedContent::text_only(Some("  ".to_string())).usable_text().is_none());
        assert_eq!(
            ScrapedContent::text_only(Some("body".to_string())).usable_text(),
            Some("body")
        );
    }
}
