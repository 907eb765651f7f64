use crate::config::toml_config::{PodcastGroup, PodcastScraper};
use crate::core::analyst::Analyst;
use crate::core::publish::Publisher;
use crate::core::random::Randomizer;
use crate::domain::model::{Delivery, FeedEntry, Post, RunReport};
use crate::domain::ports::{Pipeline, Storage};
use crate::feed::FeedReader;
use crate::format::{self, Origin};
use crate::scrape::html::fragment_text;
use crate::scrape::podcast::{philosophizethis_title, EpisodeLink};
use crate::scrape::Scraper;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// What was picked for a group; decides how the post is built.
#[derive(Debug, Clone)]
pub enum Episode {
    /// Philosophy Bites episode page holding transcript and MP3.
    BitesPage(EpisodeLink),
    /// Philosophize This! transcript page.
    PhilosophizeTranscript { url: String },
    /// Feed item analysed from its description.
    FeedItem(FeedEntry),
    /// Lex Fridman feed item; transcript and video come from the episode page.
    LexEpisode(FeedEntry),
}

impl Episode {
    pub fn unique_id(&self) -> &str {
        match self {
            Episode::BitesPage(link) => &link.url,
            Episode::PhilosophizeTranscript { url } => url,
            Episode::FeedItem(entry) => entry.unique_id(),
            Episode::LexEpisode(entry) => &entry.link,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EpisodeCandidate {
    pub group: PodcastGroup,
    pub episode: Episode,
}

pub struct PodcastPipeline<S: Storage> {
    groups: Vec<PodcastGroup>,
    feeds: FeedReader,
    scraper: Scraper,
    analyst: Arc<Analyst>,
    publisher: Publisher<S>,
    random: Arc<Randomizer>,
}

impl<S: Storage> PodcastPipeline<S> {
    pub fn new(
        groups: Vec<PodcastGroup>,
        feeds: FeedReader,
        scraper: Scraper,
        analyst: Arc<Analyst>,
        publisher: Publisher<S>,
        random: Arc<Randomizer>,
    ) -> Self {
        Self {
            groups,
            feeds,
            scraper,
            analyst,
            publisher,
            random,
        }
    }

    fn first_url<'a>(urls: &'a [String], group: &PodcastGroup) -> Option<&'a str> {
        let url = urls.first().map(String::as_str);
        if url.is_none() {
            tracing::warn!("  Group '{}' has no URL configured. Skipping.", group.name);
        }
        url
    }

    /// Newest entry of the group's first feed.
    async fn latest_entry(&self, group: &PodcastGroup) -> Result<Option<FeedEntry>> {
        let Some(url) = Self::first_url(&group.feed_urls, group) else {
            return Ok(None);
        };
        let entry = self.feeds.fetch(url).await?.into_iter().next();
        if entry.is_none() {
            tracing::info!("  Podcast feed is empty. Skipping.");
        }
        Ok(entry)
    }

    async fn pick(
        &self,
        group: &PodcastGroup,
        posted: &BTreeSet<String>,
    ) -> Result<Option<Episode>> {
        let episode = match group.scraper {
            PodcastScraper::PhilosophybitesWeb => {
                let mut seen = HashSet::new();
                let mut fresh: Vec<EpisodeLink> = Vec::new();
                for index_url in &group.index_urls {
                    let episodes = match self.scraper.philosophybites_index(index_url).await {
                        Ok(episodes) => episodes,
                        Err(e) => {
                            tracing::warn!("  Error scraping index page {}: {}", index_url, e);
                            continue;
                        }
                    };
                    for episode in episodes {
                        if !posted.contains(&episode.url) && seen.insert(episode.url.clone()) {
                            fresh.push(episode);
                        }
                    }
                }
                if fresh.is_empty() {
                    tracing::info!("  No new episodes found across all index pages.");
                    return Ok(None);
                }
                tracing::info!(
                    "  Found {} unique new episodes. Picking one randomly.",
                    fresh.len()
                );
                self.random.choose(&fresh).map(Episode::BitesPage)
            }
            PodcastScraper::PhilosophizethisWeb => {
                let Some(index_url) = Self::first_url(&group.index_urls, group) else {
                    return Ok(None);
                };
                let Some(url) = self.scraper.philosophizethis_latest(index_url).await? else {
                    return Ok(None);
                };
                if posted.contains(&url) {
                    tracing::info!("  Latest transcript '{}' has already been posted.", url);
                    return Ok(None);
                }
                Some(Episode::PhilosophizeTranscript { url })
            }
            PodcastScraper::MultiRssRandom => {
                let mut fresh = Vec::new();
                for feed_url in &group.feed_urls {
                    match self.feeds.fetch(feed_url).await {
                        Ok(entries) => fresh.extend(
                            entries
                                .into_iter()
                                .filter(|e| !posted.contains(e.unique_id())),
                        ),
                        Err(e) => tracing::warn!("  !! ERROR fetching feed {}: {}", feed_url, e),
                    }
                }
                if fresh.is_empty() {
                    tracing::info!("  No new episodes found across all feeds in this group.");
                    return Ok(None);
                }
                tracing::info!("  Found {} new episodes. Picking one randomly.", fresh.len());
                self.random.choose(&fresh).map(Episode::FeedItem)
            }
            PodcastScraper::PodscribeRss | PodcastScraper::Lexfridman => {
                let Some(entry) = self.latest_entry(group).await? else {
                    return Ok(None);
                };
                let episode = if group.scraper == PodcastScraper::Lexfridman {
                    Episode::LexEpisode(entry)
                } else {
                    Episode::FeedItem(entry)
                };
                if posted.contains(episode.unique_id()) {
                    tracing::info!("  Latest episode '{}' already posted.", episode.unique_id());
                    return Ok(None);
                }
                Some(episode)
            }
        };
        Ok(episode)
    }

    async fn compose(&self, candidate: &EpisodeCandidate) -> Result<Option<Delivery>> {
        let group = &candidate.group;
        let origin = Origin {
            name: &group.name,
            category_fa: &group.category_fa,
            hashtag_en: &group.hashtag_en,
        };

        match &candidate.episode {
            Episode::BitesPage(link) => {
                let page = self.scraper.philosophybites_episode(&link.url).await?;
                let Some(transcript) = page.transcript else {
                    tracing::info!("  Failed to scrape transcript content. Aborting.");
                    return Ok(None);
                };
                let Some(analysis) = self.analyst.transcript(&transcript).await? else {
                    return Ok(None);
                };
                Ok(Some(Delivery::Text {
                    message: format::transcript_podcast_message(
                        &analysis,
                        &link.title,
                        None,
                        origin,
                        page.mp3_url.as_deref(),
                    ),
                }))
            }
            Episode::PhilosophizeTranscript { url } => {
                let Some(transcript) = self.scraper.philosophizethis_transcript(url).await? else {
                    tracing::info!("  Failed to scrape transcript content. Aborting.");
                    return Ok(None);
                };
                let Some(analysis) = self.analyst.transcript(&transcript).await? else {
                    return Ok(None);
                };
                let title = philosophizethis_title(url);
                Ok(Some(Delivery::Text {
                    message: format::transcript_podcast_message(&analysis, &title, None, origin, None),
                }))
            }
            Episode::FeedItem(entry) => {
                let description = fragment_text(entry.summary_html());
                let Some(mp3_url) = entry.audio_url().filter(|_| !description.is_empty()) else {
                    tracing::info!("  Selected episode is missing description or MP3 URL. Aborting.");
                    return Ok(None);
                };
                let Some(analysis) = self.analyst.rss_podcast(&entry.title, &description).await?
                else {
                    return Ok(None);
                };
                Ok(Some(Delivery::Text {
                    message: format::rss_podcast_message(
                        &analysis,
                        &entry.title,
                        entry.published.as_deref(),
                        mp3_url,
                        origin,
                    ),
                }))
            }
            Episode::LexEpisode(entry) => {
                let page = self.scraper.lexfridman_episode(&entry.link).await?;
                let Some(transcript_url) = page.transcript_url else {
                    tracing::info!("  Lex Fridman scraper failed to find page data.");
                    return Ok(None);
                };
                let transcript = self.scraper.lexfridman_transcript(&transcript_url).await?;
                let (Some(video_url), Some(transcript)) = (page.video_url, transcript) else {
                    tracing::info!("  Failed to get essential data. Aborting.");
                    return Ok(None);
                };
                let Some(analysis) = self.analyst.transcript(&transcript).await? else {
                    return Ok(None);
                };
                Ok(Some(Delivery::VideoThenReply {
                    title: entry.title.clone(),
                    video_url,
                    analysis: format::transcript_podcast_message(
                        &analysis,
                        &entry.title,
                        entry.published.as_deref(),
                        origin,
                        None,
                    ),
                }))
            }
        }
    }
}

#[async_trait]
impl<S: Storage> Pipeline for PodcastPipeline<S> {
    type Candidate = EpisodeCandidate;

    fn name(&self) -> &str {
        "podcasts"
    }

    async fn extract(&self) -> Result<Vec<EpisodeCandidate>> {
        let mut groups = self.groups.clone();
        self.random.shuffle(&mut groups);

        let mut candidates = Vec::new();
        for group in groups {
            tracing::info!("--- Checking Podcast Group: {} ---", group.name);
            let posted = match self.publisher.history().load(&group.history_file).await {
                Ok(posted) => posted,
                Err(e) => {
                    tracing::error!(
                        "!! Cannot read history '{}' for group '{}': {}",
                        group.history_file,
                        group.name,
                        e
                    );
                    continue;
                }
            };
            match self.pick(&group, &posted).await {
                Ok(Some(episode)) => {
                    tracing::info!("  Selected to process: '{}'", episode.unique_id());
                    candidates.push(EpisodeCandidate { group, episode });
                }
                Ok(None) => {}
                Err(e) => tracing::error!("!! Error processing podcast group '{}': {}", group.name, e),
            }
        }
        Ok(candidates)
    }

    async fn transform(&self, candidates: Vec<EpisodeCandidate>) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        for candidate in candidates {
            match self.compose(&candidate).await {
                Ok(Some(delivery)) => posts.push(Post {
                    source_name: candidate.group.name.clone(),
                    history_file: candidate.group.history_file.clone(),
                    unique_id: candidate.episode.unique_id().to_string(),
                    delivery,
                }),
                Ok(None) => tracing::info!("  Nothing to post for {}.", candidate.group.name),
                Err(e) => tracing::warn!("  Skipping {}: {}", candidate.group.name, e),
            }
        }
        Ok(posts)
    }

    async fn load(&self, posts: Vec<Post>) -> Result<RunReport> {
        self.publisher.publish_all(self.name(), posts).await
    }
}
