use crate::config::toml_config::{NewsProfile, NewsSource, PostFormat, Selection};
use crate::core::analyst::Analyst;
use crate::core::publish::Publisher;
use crate::core::random::Randomizer;
use crate::domain::model::{Delivery, FeedEntry, Post, RunReport};
use crate::domain::ports::{Pipeline, Storage};
use crate::feed::FeedReader;
use crate::format::{self, Origin, DEFAULT_CAPTION};
use crate::scrape::Scraper;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Unposted entries of one source, in the order they should be tried.
#[derive(Debug, Clone)]
pub struct SourceCandidates {
    pub source: NewsSource,
    pub entries: Vec<FeedEntry>,
}

pub struct NewsPipeline<S: Storage> {
    profile: NewsProfile,
    feeds: FeedReader,
    scraper: Scraper,
    analyst: Arc<Analyst>,
    publisher: Publisher<S>,
    random: Arc<Randomizer>,
}

impl<S: Storage> NewsPipeline<S> {
    pub fn new(
        profile: NewsProfile,
        feeds: FeedReader,
        scraper: Scraper,
        analyst: Arc<Analyst>,
        publisher: Publisher<S>,
        random: Arc<Randomizer>,
    ) -> Self {
        Self {
            profile,
            feeds,
            scraper,
            analyst,
            publisher,
            random,
        }
    }

    /// Entries of every feed of `source`; a failing feed is logged and skipped.
    async fn fetch_all(&self, source: &NewsSource) -> Vec<FeedEntry> {
        let mut entries = Vec::new();
        for url in &source.urls {
            match self.feeds.fetch(url).await {
                Ok(mut fetched) => entries.append(&mut fetched),
                Err(e) => tracing::warn!("  !! ERROR fetching or parsing feed {}: {}", url, e),
            }
        }
        entries
    }

    async fn sample_candidates(
        &self,
        source: &NewsSource,
        posted: &BTreeSet<String>,
    ) -> Vec<FeedEntry> {
        let mut entries = self.fetch_all(source).await;
        if entries.is_empty() {
            tracing::info!("  Feed is empty. Skipping.");
            return entries;
        }
        entries.truncate(self.profile.sample_size);
        self.random.shuffle(&mut entries);
        entries.retain(|entry| !posted.contains(&entry.link));
        entries
    }

    async fn pooled_candidates(
        &self,
        source: &NewsSource,
        posted: &BTreeSet<String>,
    ) -> Vec<FeedEntry> {
        let mut entries = self.fetch_all(source).await;
        entries.retain(|entry| !posted.contains(&entry.link));
        if entries.is_empty() {
            return entries;
        }
        tracing::info!(
            "  Found {} new items for {}. Picking one randomly.",
            entries.len(),
            source.name
        );
        self.random.choose(&entries).into_iter().collect()
    }

    /// Scrape, analyse and format one entry. `Ok(None)` means the entry
    /// produced nothing worth posting.
    async fn compose(&self, source: &NewsSource, entry: &FeedEntry) -> Result<Option<Post>> {
        let content = self.scraper.article(source.kind, entry).await?;
        let Some(text) = content.usable_text() else {
            tracing::info!("  No content extracted for '{}'.", entry.title);
            return Ok(None);
        };

        let origin = Origin {
            name: &source.name,
            category_fa: &source.category_fa,
            hashtag_en: &source.hashtag_en,
        };
        let delivery = match source.post_format {
            PostFormat::ScientificNews => {
                let Some(analysis) = self.analyst.news(text).await? else {
                    return Ok(None);
                };
                Delivery::Article {
                    message: format::news_message(
                        &entry.title,
                        origin,
                        &analysis,
                        &entry.link,
                        content.doi_link.as_deref(),
                    ),
                    caption: format::article_caption(&analysis),
                    image_url: content.image_url.clone(),
                }
            }
            PostFormat::ScientificPaper => {
                let Some(analysis) = self.analyst.paper(text).await? else {
                    return Ok(None);
                };
                Delivery::Article {
                    message: format::paper_message(&entry.title, origin, &analysis, &entry.link),
                    caption: DEFAULT_CAPTION.to_string(),
                    image_url: content.image_url.clone(),
                }
            }
        };

        Ok(Some(Post {
            source_name: source.name.clone(),
            history_file: self.profile.history_file.clone(),
            unique_id: entry.link.clone(),
            delivery,
        }))
    }
}

#[async_trait]
impl<S: Storage> Pipeline for NewsPipeline<S> {
    type Candidate = SourceCandidates;

    fn name(&self) -> &str {
        &self.profile.name
    }

    async fn extract(&self) -> Result<Vec<SourceCandidates>> {
        let posted = self.publisher.history().load(&self.profile.history_file).await?;
        let mut sources = self.profile.sources.clone();
        self.random.shuffle(&mut sources);

        let mut candidates = Vec::new();
        for source in sources {
            tracing::info!("--- Checking {} (Type: {:?}) ---", source.name, source.kind);
            let entries = match self.profile.selection {
                Selection::Sample => self.sample_candidates(&source, &posted).await,
                Selection::Pooled => self.pooled_candidates(&source, &posted).await,
            };
            if entries.is_empty() {
                tracing::info!("  No new, processable items found for {}.", source.name);
                continue;
            }
            candidates.push(SourceCandidates { source, entries });
        }
        Ok(candidates)
    }

    async fn transform(&self, candidates: Vec<SourceCandidates>) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        let mut taken: HashSet<String> = HashSet::new();

        for SourceCandidates { source, entries } in candidates {
            tracing::info!("--- Processing {} ---", source.name);
            for entry in &entries {
                if taken.contains(&entry.link) {
                    continue;
                }
                tracing::info!("  Selected to process: {}", entry.title);
                match self.compose(&source, entry).await {
                    Ok(Some(post)) => {
                        taken.insert(post.unique_id.clone());
                        posts.push(post);
                        break;
                    }
                    Ok(None) => tracing::info!("  Skipping post due to AI/formatting failure."),
                    Err(e) => tracing::warn!("  Skipping '{}': {}", entry.title, e),
                }
            }
        }
        Ok(posts)
    }

    async fn load(&self, posts: Vec<Post>) -> Result<RunReport> {
        self.publisher.publish_all(&self.profile.name, posts).await
    }
}
