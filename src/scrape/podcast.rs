//! Episode and transcript pages of the podcast sites that are scraped
//! rather than read from a feed.

use super::html::{attr, has_class, resolve_url, select_all, select_first, strip_join};
use scraper::{ElementRef, Html};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeLink {
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptPage {
    pub transcript: Option<String>,
    pub mp3_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexEpisodePage {
    pub transcript_url: Option<String>,
    pub video_url: Option<String>,
}

fn join_blocks(blocks: Vec<ElementRef<'_>>) -> Option<String> {
    if blocks.is_empty() {
        return None;
    }
    let text = blocks.into_iter().map(strip_join).collect::<Vec<_>>().join(" ");
    tracing::info!("  Successfully scraped {} characters from transcript.", text.chars().count());
    Some(text)
}

pub fn philosophybites_index(page: &str) -> Vec<EpisodeLink> {
    let doc = Html::parse_document(page);
    let episodes: Vec<EpisodeLink> = select_all(doc.root_element(), "div.e-loop-item")
        .into_iter()
        .filter_map(|block| {
            let url = select_first(block, "a").and_then(|a| attr(a, "href"))?;
            let title = select_first(block, "h3.elementor-heading-title")?;
            Some(EpisodeLink {
                url,
                title: strip_join(title),
            })
        })
        .collect();
    tracing::info!("  Found {} episodes on this page.", episodes.len());
    episodes
}

/// The widget holding the paragraphs that follow the `TRANSCRIPT` heading.
fn transcript_widget(root: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let heading = select_all(root, "h3")
        .into_iter()
        .find(|h3| h3.text().collect::<String>().trim().eq_ignore_ascii_case("TRANSCRIPT"))?;

    let heading_widget = heading
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "div" && has_class(*e, "elementor-widget"))?;

    heading_widget
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "div" && has_class(*e, "elementor-widget"))
}

pub fn philosophybites_episode(page: &str) -> TranscriptPage {
    let doc = Html::parse_document(page);
    let root = doc.root_element();

    let transcript = transcript_widget(root)
        .and_then(|widget| join_blocks(select_all(widget, "p")))
        .filter(|t| !t.is_empty());
    if transcript.is_none() {
        tracing::info!("  Could not find transcript content.");
    }

    let mp3_url = select_first(root, "audio")
        .and_then(|audio| select_first(audio, "source"))
        .and_then(|source| attr(source, "src"));
    if mp3_url.is_none() {
        tracing::info!("  Could not find MP3 URL.");
    }

    TranscriptPage { transcript, mp3_url }
}

/// Absolute URL of the newest transcript on the archive page.
pub fn philosophizethis_latest(page: &str, index_url: &str) -> Option<String> {
    let doc = Html::parse_document(page);
    let href = select_first(doc.root_element(), "li.archive-item a.archive-item-link")
        .and_then(|a| attr(a, "href"));
    match href {
        Some(href) => {
            let url = resolve_url(index_url, &href);
            tracing::info!("  Found latest transcript URL: {}", url);
            Some(url)
        }
        None => {
            tracing::info!("  Could not find the link for the latest transcript.");
            None
        }
    }
}

pub fn philosophizethis_transcript(page: &str) -> Option<String> {
    let doc = Html::parse_document(page);
    let Some(content) = select_first(doc.root_element(), "div.sqs-block-content") else {
        tracing::info!("  Could not find transcript content in div.sqs-block-content.");
        return None;
    };
    join_blocks(select_all(content, "p"))
}

/// Title-cases like Python's `str.title`: a letter is uppercased when it does
/// not follow another letter and lowercased otherwise.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(ch);
            prev_letter = false;
        }
    }
    out
}

/// Episode title derived from a transcript URL such as `.../episode-200-transcript`.
pub fn philosophizethis_title(transcript_url: &str) -> String {
    let slug = transcript_url.rsplit('/').next().unwrap_or_default();
    let words = slug.replace("-transcript", "").replace('-', " ");
    format!("Philosophize This! - {}", title_case(&words))
}

/// Episode URL without tracking parameters.
pub fn clean_episode_url(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

pub fn lexfridman_episode(page: &str) -> LexEpisodePage {
    let doc = Html::parse_document(page);
    let root = doc.root_element();

    let transcript_url = select_all(root, "b")
        .into_iter()
        .find(|b| b.text().collect::<String>().contains("Transcript:"))
        .and_then(|b| {
            b.next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().name() == "a")
        })
        .and_then(|a| attr(a, "href"));

    let video_url = select_first(root, r#"iframe[src*="youtube.com/embed/"]"#)
        .or_else(|| select_first(root, "div.episode-player iframe"))
        .and_then(|iframe| attr(iframe, "src"));

    tracing::info!(
        "  - Transcript URL: {}",
        if transcript_url.is_some() { "Found" } else { "Not Found" }
    );
    tracing::info!(
        "  - YouTube URL: {}",
        if video_url.is_some() { "Found" } else { "Not Found" }
    );
    LexEpisodePage {
        transcript_url,
        video_url,
    }
}

pub fn lexfridman_transcript(page: &str) -> Option<String> {
    let doc = Html::parse_document(page);
    let Some(content) = select_first(doc.root_element(), "div.entry-content") else {
        tracing::info!("  Could not find transcript container div.entry-content.");
        return None;
    };
    let spans = select_all(content, "span.ts-text");
    if spans.is_empty() {
        tracing::info!("  Found entry-content, but no 'ts-text' spans inside.");
    }
    join_blocks(spans)
}
