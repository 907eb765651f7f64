use crate::adapters::http::build_client;
use crate::adapters::llm::provider_from_config;
use crate::adapters::storage::{HistoryStore, LocalStorage};
use crate::adapters::telegram::TelegramClient;
use crate::config::toml_config::{AppConfig, NewsProfile, PodcastGroup};
use crate::core::{
    Analyst, NewsPipeline, PodcastPipeline, Publisher, Randomizer, RunEngine, RunReport,
};
use crate::feed::FeedReader;
use crate::scrape::Scraper;
use crate::utils::error::{MokhberError, Result};
use crate::utils::monitor::RunMonitor;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a pipeline needs, built once per process from the config.
pub struct Services {
    feeds: FeedReader,
    scraper: Scraper,
    analyst: Arc<Analyst>,
    history: HistoryStore<LocalStorage>,
    telegram: Option<TelegramClient>,
    random: Arc<Randomizer>,
}

impl Services {
    /// Fails before any network work when the AI key, or the Telegram
    /// credentials outside a dry run, are missing.
    pub fn from_config(
        config: &AppConfig,
        data_dir: impl Into<PathBuf>,
        dry_run: bool,
    ) -> Result<Self> {
        let client = build_client()?;
        let analyst = Analyst::new(provider_from_config(client.clone(), config)?);
        tracing::info!("Using AI provider: {}", analyst.provider_name());

        let telegram = if dry_run {
            tracing::info!("Dry run: posts will be logged, not sent");
            None
        } else {
            let (token, channel_id) = config.require_telegram()?;
            Some(TelegramClient::new(
                client.clone(),
                &config.endpoints.telegram_api_base,
                token,
                channel_id,
            ))
        };

        Ok(Self {
            feeds: FeedReader::new(client.clone()),
            scraper: Scraper::new(client, &config.endpoints.crossref_api_base),
            analyst: Arc::new(analyst),
            history: HistoryStore::new(LocalStorage::new(data_dir)),
            telegram,
            random: Arc::new(Randomizer::from_entropy()),
        })
    }

    pub fn with_random(mut self, random: Randomizer) -> Self {
        self.random = Arc::new(random);
        self
    }

    fn publisher(&self) -> Publisher<LocalStorage> {
        match &self.telegram {
            Some(telegram) => Publisher::new(self.history.clone(), telegram.clone()),
            None => Publisher::dry_run(self.history.clone()),
        }
    }

    pub fn news_pipeline(&self, profile: NewsProfile) -> NewsPipeline<LocalStorage> {
        NewsPipeline::new(
            profile,
            self.feeds.clone(),
            self.scraper.clone(),
            Arc::clone(&self.analyst),
            self.publisher(),
            Arc::clone(&self.random),
        )
    }

    pub fn podcast_pipeline(&self, groups: Vec<PodcastGroup>) -> PodcastPipeline<LocalStorage> {
        PodcastPipeline::new(
            groups,
            self.feeds.clone(),
            self.scraper.clone(),
            Arc::clone(&self.analyst),
            self.publisher(),
            Arc::clone(&self.random),
        )
    }
}

/// Runs the named news profile, or every profile in config order.
pub async fn run_news(
    config: &AppConfig,
    services: &Services,
    profile: Option<&str>,
    monitor: &RunMonitor,
) -> Result<Vec<RunReport>> {
    let profiles = match profile {
        Some(name) => vec![config
            .news_profile(name)
            .cloned()
            .ok_or_else(|| MokhberError::ConfigError {
                message: format!("no news profile named '{}'", name),
            })?],
        None => config.news.clone(),
    };
    if profiles.is_empty() {
        tracing::warn!("No news profiles configured");
    }

    let mut reports = Vec::new();
    for profile in profiles {
        let engine = RunEngine::new(services.news_pipeline(profile)).with_monitor(monitor);
        reports.push(engine.run().await?);
    }
    Ok(reports)
}

/// Runs all podcast groups, or only the named one.
pub async fn run_podcasts(
    config: &AppConfig,
    services: &Services,
    only: Option<&str>,
    monitor: &RunMonitor,
) -> Result<RunReport> {
    let groups = match only {
        Some(name) => vec![config
            .podcast_group(name)
            .cloned()
            .ok_or_else(|| MokhberError::ConfigError {
                message: format!("no podcast group named '{}'", name),
            })?],
        None => config.podcasts.clone(),
    };

    RunEngine::new(services.podcast_pipeline(groups))
        .with_monitor(monitor)
        .run()
        .await
}
