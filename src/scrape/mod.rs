//! Page scrapers: pure HTML extraction in submodules, fetching here.

pub mod crossref;
pub mod html;
pub mod news;
pub mod podcast;

use crate::adapters::http::{
    fetch_text, BROWSER_USER_AGENT, LONG_PAGE_TIMEOUT, PAGE_TIMEOUT, PLAIN_USER_AGENT,
};
use crate::config::toml_config::SourceKind;
use crate::domain::model::{FeedEntry, ScrapedContent};
use crate::utils::error::Result;
use crossref::CrossrefClient;
use podcast::{EpisodeLink, LexEpisodePage, TranscriptPage};
use reqwest::Client;

/// Fetches pages with the shared client and hands them to the extractors.
#[derive(Clone)]
pub struct Scraper {
    client: Client,
    crossref: CrossrefClient,
}

impl Scraper {
    pub fn new(client: Client, crossref_api_base: &str) -> Self {
        Self {
            crossref: CrossrefClient::new(client.clone(), crossref_api_base),
            client,
        }
    }

    async fn page(&self, url: &str, user_agent: &str) -> Result<String> {
        fetch_text(&self.client, url, user_agent, PAGE_TIMEOUT).await
    }

    /// Article text (and image/DOI where the site has them) for one feed entry.
    pub async fn article(&self, kind: SourceKind, entry: &FeedEntry) -> Result<ScrapedContent> {
        let url = entry.link.as_str();
        let content = match kind {
            SourceKind::Sciencedaily => {
                tracing::info!("  Scraping ScienceDaily article: {}", url);
                news::sciencedaily(&self.page(url, BROWSER_USER_AGENT).await?, url)
            }
            SourceKind::PhysOrg => {
                tracing::info!("  Scraping Phys.org article: {}", url);
                news::phys_org(&self.page(url, BROWSER_USER_AGENT).await?)
            }
            SourceKind::Popsci => {
                tracing::info!("  Scraping Popular Science article: {}", url);
                news::popsci(&self.page(url, BROWSER_USER_AGENT).await?)
            }
            SourceKind::NvidiaNews => {
                tracing::info!("  Scraping NVIDIA News article: {}", url);
                news::nvidia_news(&self.page(url, BROWSER_USER_AGENT).await?)
            }
            SourceKind::FullPageScrape => {
                tracing::info!("  Scraping full article page: {}", url);
                ScrapedContent::text_only(news::full_page(&self.page(url, PLAIN_USER_AGENT).await?))
            }
            SourceKind::Pubmed => {
                tracing::info!("  Scraping PubMed abstract: {}", url);
                ScrapedContent::text_only(news::pubmed(&self.page(url, PLAIN_USER_AGENT).await?))
            }
            SourceKind::CrossrefDoi => {
                ScrapedContent::text_only(self.crossref.abstract_for(entry).await?)
            }
            SourceKind::RssContentOnly => {
                ScrapedContent::text_only(news::rss_content(entry.content_html.as_deref()))
            }
        };
        Ok(content)
    }

    pub async fn philosophybites_index(&self, url: &str) -> Result<Vec<EpisodeLink>> {
        tracing::info!("  Scraping Philosophy Bites index page: {}", url);
        Ok(podcast::philosophybites_index(&self.page(url, PLAIN_USER_AGENT).await?))
    }

    pub async fn philosophybites_episode(&self, url: &str) -> Result<TranscriptPage> {
        tracing::info!("  Scraping episode page: {}", url);
        Ok(podcast::philosophybites_episode(&self.page(url, BROWSER_USER_AGENT).await?))
    }

    pub async fn philosophizethis_latest(&self, index_url: &str) -> Result<Option<String>> {
        tracing::info!("  Scraping Philosophize This index page: {}", index_url);
        let page = self.page(index_url, PLAIN_USER_AGENT).await?;
        Ok(podcast::philosophizethis_latest(&page, index_url))
    }

    pub async fn philosophizethis_transcript(&self, url: &str) -> Result<Option<String>> {
        tracing::info!("  Scraping transcript page: {}", url);
        Ok(podcast::philosophizethis_transcript(&self.page(url, PLAIN_USER_AGENT).await?))
    }

    pub async fn lexfridman_episode(&self, url: &str) -> Result<LexEpisodePage> {
        let clean_url = podcast::clean_episode_url(url);
        tracing::info!("  Scraping Lex Fridman episode page: {}", clean_url);
        Ok(podcast::lexfridman_episode(&self.page(clean_url, PLAIN_USER_AGENT).await?))
    }

    pub async fn lexfridman_transcript(&self, url: &str) -> Result<Option<String>> {
        tracing::info!("  Scraping transcript page: {}", url);
        let page = fetch_text(&self.client, url, PLAIN_USER_AGENT, LONG_PAGE_TIMEOUT).await?;
        Ok(podcast::lexfridman_transcript(&page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_article_dispatches_on_kind() {
        let server = MockServer::start_async().await;
        let page = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/news/1")
                    .header("user-agent", BROWSER_USER_AGENT);
                then.status(200)
                    .body(r#"<div class="entry-content"><p>Chips</p></div>"#);
            })
            .await;

        let scraper = Scraper::new(Client::new(), &server.base_url());
        let entry = FeedEntry {
            link: server.url("/news/1"),
            ..FeedEntry::default()
        };
        let content = scraper.article(SourceKind::NvidiaNews, &entry).await.unwrap();

        page.assert_async().await;
        assert_eq!(content.text.as_deref(), Some("Chips"));
    }

    #[tokio::test]
    async fn test_rss_content_needs_no_request() {
        let scraper = Scraper::new(Client::new(), "http://127.0.0.1:9");
        let entry = FeedEntry {
            link: "http://127.0.0.1:9/unreachable".to_string(),
            content_html: Some("<p>Inline</p>".to_string()),
            ..FeedEntry::default()
        };
        let content = scraper
            .article(SourceKind::RssContentOnly, &entry)
            .await
            .unwrap();
        assert_eq!(content.usable_text(), Some("Inline"));
    }

    #[tokio::test]
    async fn test_lexfridman_episode_drops_query() {
        let server = MockServer::start_async().await;
        let page = server
            .mock_async(|when, then| {
                when.method(GET).path("/guest/");
                then.status(200).body("<html></html>");
            })
            .await;

        let scraper = Scraper::new(Client::new(), &server.base_url());
        let data = scraper
            .lexfridman_episode(&format!("{}?utm_source=rss", server.url("/guest/")))
            .await
            .unwrap();

        page.assert_async().await;
        assert_eq!(data, LexEpisodePage::default());
    }
}
