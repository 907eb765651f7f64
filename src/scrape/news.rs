//! Article extraction for each news source kind. Functions take the page HTML
//! and never touch the network.

use super::html::{attr, fragment_text, paragraph_text, resolve_url, select_all, select_first, spaced_text};
use crate::domain::model::ScrapedContent;
use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;

fn doi_href_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"dx\.doi\.org").expect("valid regex"))
}

fn log_scraped(content: &ScrapedContent) {
    tracing::info!(
        "  Scraped: {} chars, Image: {}, DOI: {}",
        content.text.as_deref().map_or(0, |t| t.chars().count()),
        if content.image_url.is_some() { "Yes" } else { "No" },
        if content.doi_link.is_some() { "Yes" } else { "No" },
    );
}

pub fn sciencedaily(page: &str, page_url: &str) -> ScrapedContent {
    let doc = Html::parse_document(page);
    let root = doc.root_element();
    let Some(body) = select_first(root, "div#story_text") else {
        tracing::info!("  Could not find article body 'div#story_text'.");
        return ScrapedContent::default();
    };

    let image_url = select_first(root, "figure.mainimg img")
        .and_then(|img| attr(img, "src"))
        .map(|src| resolve_url(page_url, &src));

    let doi_link = select_first(root, "div#journal_references").and_then(|refs| {
        select_all(refs, "a[href]")
            .into_iter()
            .filter_map(|a| attr(a, "href"))
            .find(|href| doi_href_regex().is_match(href))
    });

    let content = ScrapedContent {
        text: Some(paragraph_text(body)),
        image_url,
        doi_link,
    };
    log_scraped(&content);
    content
}

pub fn phys_org(page: &str) -> ScrapedContent {
    let doc = Html::parse_document(page);
    let root = doc.root_element();
    let Some(body) = select_first(root, "div.article-main") else {
        tracing::info!("  Could not find article body 'div.article-main'.");
        return ScrapedContent::default();
    };

    let image_url = select_first(body, "figure.article-img img").and_then(|img| attr(img, "src"));
    let doi_link = select_first(root, "div.article-main__more")
        .and_then(|more| select_first(more, r#"a[data-doi="1"]"#))
        .and_then(|a| attr(a, "href"));

    let content = ScrapedContent {
        text: Some(paragraph_text(body)),
        image_url,
        doi_link,
    };
    log_scraped(&content);
    content
}

const POPSCI_IMAGE_SELECTORS: [&str; 3] = [
    "figure.featured-image img",
    "img.article-featured-image",
    "figure.wp-block-image img",
];

/// URL of the last `srcset` candidate, usually the widest one.
fn last_srcset_url(srcset: &str) -> Option<String> {
    srcset
        .split(',')
        .last()
        .map(str::trim)
        .and_then(|candidate| candidate.split(' ').next())
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

pub fn popsci(page: &str) -> ScrapedContent {
    let doc = Html::parse_document(page);
    let root = doc.root_element();
    let Some(body) = select_first(root, "div.content-wrapper") else {
        tracing::info!("  Could not find article body with class 'content-wrapper'.");
        return ScrapedContent::default();
    };

    let mut image_url = None;
    for css in POPSCI_IMAGE_SELECTORS {
        let Some(img) = select_first(root, css) else {
            continue;
        };
        if let Some(srcset) = img.value().attr("srcset") {
            tracing::debug!("  Image tag found with srcset using selector: '{}'", css);
            image_url = last_srcset_url(srcset);
            break;
        }
        if let Some(src) = attr(img, "src") {
            tracing::debug!("  Image tag found with src (no srcset) using selector: '{}'", css);
            image_url = Some(src);
            break;
        }
    }

    let content = ScrapedContent {
        text: Some(paragraph_text(body)),
        image_url,
        doi_link: None,
    };
    log_scraped(&content);
    content
}

pub fn nvidia_news(page: &str) -> ScrapedContent {
    let doc = Html::parse_document(page);
    let root = doc.root_element();
    let Some(body) = select_first(root, "div.entry-content") else {
        tracing::info!("  Could not find article body with class 'entry-content'.");
        return ScrapedContent::default();
    };

    let content = ScrapedContent {
        text: Some(paragraph_text(body)),
        image_url: select_first(root, "div.entry-title img").and_then(|img| attr(img, "src")),
        doi_link: None,
    };
    log_scraped(&content);
    content
}

pub fn full_page(page: &str) -> Option<String> {
    let doc = Html::parse_document(page);
    let root = doc.root_element();
    let body = select_first(root, "div.c-article-body").or_else(|| select_first(root, "div.article__body"));
    match body {
        Some(body) => {
            let text = paragraph_text(body);
            tracing::info!("  Successfully scraped {} characters.", text.chars().count());
            Some(text)
        }
        None => {
            tracing::info!("  Could not find main article body. Scraping failed.");
            None
        }
    }
}

pub fn pubmed(page: &str) -> Option<String> {
    let doc = Html::parse_document(page);
    match select_first(doc.root_element(), "div.abstract-content") {
        Some(abstract_div) => {
            let text = spaced_text(abstract_div);
            tracing::info!("  Successfully scraped {} characters from PubMed.", text.chars().count());
            Some(text)
        }
        None => {
            tracing::info!("  Could not find abstract content. Scraping failed.");
            None
        }
    }
}

/// Text of the entry's own `content:encoded` body.
pub fn rss_content(content_html: Option<&str>) -> Option<String> {
    let html = content_html.filter(|c| !c.trim().is_empty())?;
    let text = fragment_text(html);
    tracing::info!("  Extracted {} chars from RSS.", text.chars().count());
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sciencedaily_extracts_text_image_and_doi() {
        let page = r#"<html><body>
            <figure class="mainimg"><img src="/images/2025/07/pic.jpg"></figure>
            <div id="story_text"><p> Scientists found </p><p>a <em>new</em> thing.</p></div>
            <div id="journal_references"><ol><li>
              <a href="https://example.org/other">Other</a>
              <a href="http://dx.doi.org/10.1038/s41586-025-1">DOI</a>
            </li></ol></div>
        </body></html>"#;

        let content = sciencedaily(page, "https://www.sciencedaily.com/releases/2025/07/250724.htm");
        assert_eq!(content.text.as_deref(), Some("Scientists found anewthing."));
        assert_eq!(
            content.image_url.as_deref(),
            Some("https://www.sciencedaily.com/images/2025/07/pic.jpg")
        );
        assert_eq!(
            content.doi_link.as_deref(),
            Some("http://dx.doi.org/10.1038/s41586-025-1")
        );
    }

    #[test]
    fn test_missing_body_yields_empty_content() {
        let content = sciencedaily("<html><body><p>nothing</p></body></html>", "https://x.example/");
        assert_eq!(content, ScrapedContent::default());
        assert!(phys_org("<p>x</p>").text.is_none());
        assert!(full_page("<p>x</p>").is_none());
    }

    #[test]
    fn test_phys_org_image_must_be_inside_body() {
        let page = r#"<html><body>
            <figure class="article-img"><img src="https://cdn/outside.jpg"></figure>
            <div class="article-main">
              <p>Body text</p>
              <div class="article-main__more"><a data-doi="1" href="https://doi.org/10.1/abc">DOI</a></div>
            </div>
        </body></html>"#;

        let content = phys_org(page);
        assert_eq!(content.text.as_deref(), Some("Body text"));
        assert_eq!(content.image_url, None);
        assert_eq!(content.doi_link.as_deref(), Some("https://doi.org/10.1/abc"));
    }

    #[test]
    fn test_popsci_prefers_last_srcset_candidate() {
        let page = r#"<html><body>
            <figure class="wp-block-image"><img src="https://cdn/fallback.jpg"></figure>
            <img class="article-featured-image" src="https://cdn/small.jpg"
                 srcset="https://cdn/small.jpg 500w, https://cdn/large.jpg 1000w">
            <div class="content-wrapper"><p>Popular</p><p>science</p></div>
        </body></html>"#;

        let content = popsci(page);
        assert_eq!(content.text.as_deref(), Some("Popular science"));
        assert_eq!(content.image_url.as_deref(), Some("https://cdn/large.jpg"));
        assert_eq!(content.doi_link, None);
    }

    #[test]
    fn test_popsci_falls_back_to_src() {
        let page = r#"<div class="content-wrapper"><p>x</p></div>
            <figure class="wp-block-image"><img src="https://cdn/only.jpg"></figure>"#;
        assert_eq!(popsci(page).image_url.as_deref(), Some("https://cdn/only.jpg"));
    }

    #[test]
    fn test_nvidia_news_title_image() {
        let page = r#"<div class="entry-title"><img src="https://nvidia/hero.png"></div>
            <div class="entry-content"><p>GPU news</p></div>"#;
        let content = nvidia_news(page);
        assert_eq!(content.text.as_deref(), Some("GPU news"));
        assert_eq!(content.image_url.as_deref(), Some("https://nvidia/hero.png"));
    }

    #[test]
    fn test_full_page_uses_either_body_class() {
        assert_eq!(
            full_page(r#"<div class="article__body"><p>One</p><p>Two</p></div>"#).as_deref(),
            Some("One Two")
        );
    }

    #[test]
    fn test_pubmed_abstract_is_spaced() {
        let page = r#"<div class="abstract-content"><p><strong>Background:</strong> Cells</p></div>"#;
        assert_eq!(pubmed(page).as_deref(), Some("Background: Cells"));
    }

    #[test]
    fn test_rss_content() {
        assert_eq!(
            rss_content(Some("<p>Full <b>body</b></p>")).as_deref(),
            Some("Full body")
        );
        assert_eq!(rss_content(None), None);
        assert_eq!(rss_content(Some("  ")), None);
    }
}
