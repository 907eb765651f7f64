use crate::utils::error::{MokhberError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url,
    validate_url_list, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GROQ_MODEL: &str = "llama3-70b-8192";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub ai: AiConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub news: Vec<NewsProfile>,
    #[serde(default)]
    pub podcasts: Vec<PodcastGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    Gemini,
    Groq,
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiProvider::Gemini => write!(f, "GEMINI"),
            AiProvider::Groq => write!(f, "GROQ"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub provider: AiProvider,
    pub gemini_api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    pub groq_api_key: Option<String>,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    #[serde(default = "default_site_url")]
    pub site_url: String,
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub token: Option<String>,
    pub channel_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub gemini_api_base: String,
    pub groq_api_url: String,
    pub telegram_api_base: String,
    pub crossref_api_base: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            gemini_api_base: "https://generativelanguage.googleapis.com".to_string(),
            groq_api_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            telegram_api_base: "https://api.telegram.org".to_string(),
            crossref_api_base: "https://api.crossref.org".to_string(),
        }
    }
}

/// How a news profile picks the entry to post from each source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// Shuffle the newest entries and try them in turn until one posts.
    #[default]
    Sample,
    /// Pool unposted entries from all feeds of the source and try one at random.
    Pooled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsProfile {
    pub name: String,
    pub history_file: String,
    #[serde(default)]
    pub selection: Selection,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    pub sources: Vec<NewsSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Sciencedaily,
    PhysOrg,
    Popsci,
    NvidiaNews,
    FullPageScrape,
    Pubmed,
    CrossrefDoi,
    RssContentOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostFormat {
    ScientificNews,
    ScientificPaper,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsSource {
    pub name: String,
    pub urls: Vec<String>,
    pub category_fa: String,
    pub hashtag_en: String,
    pub kind: SourceKind,
    pub post_format: PostFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PodcastScraper {
    PhilosophybitesWeb,
    PhilosophizethisWeb,
    MultiRssRandom,
    PodscribeRss,
    Lexfridman,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodcastGroup {
    pub name: String,
    pub history_file: String,
    pub scraper: PodcastScraper,
    #[serde(default)]
    pub index_urls: Vec<String>,
    #[serde(default)]
    pub feed_urls: Vec<String>,
    pub category_fa: String,
    pub hashtag_en: String,
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_groq_model() -> String {
    DEFAULT_GROQ_MODEL.to_string()
}

fn default_site_url() -> String {
    "https://github.com/SangeRooYakh/MokhberAi".to_string()
}

fn default_app_name() -> String {
    "Farsi Science News by AI".to_string()
}

fn default_sample_size() -> usize {
    20
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder regex is valid"))
}

/// A secret counts as set when it is non-blank and no placeholder survived substitution.
pub fn resolved_secret(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !placeholder_regex().is_match(v))
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            MokhberError::IoError(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.as_ref().display(), e),
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| MokhberError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left untouched.
    fn substitute_env_vars(content: &str) -> String {
        placeholder_regex()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn news_profile(&self, name: &str) -> Option<&NewsProfile> {
        self.news.iter().find(|p| p.name == name)
    }

    pub fn podcast_group(&self, name: &str) -> Option<&PodcastGroup> {
        self.podcasts.iter().find(|g| g.name == name)
    }

    /// The selected provider must have its key; checked before any network work.
    pub fn require_ai_key(&self) -> Result<&str> {
        let (field, value) = match self.ai.provider {
            AiProvider::Gemini => ("ai.gemini_api_key", &self.ai.gemini_api_key),
            AiProvider::Groq => ("ai.groq_api_key", &self.ai.groq_api_key),
        };
        resolved_secret(value).ok_or_else(|| MokhberError::MissingConfigError {
            field: field.to_string(),
        })
    }

    pub fn require_telegram(&self) -> Result<(&str, &str)> {
        let token =
            resolved_secret(&self.telegram.token).ok_or_else(|| MokhberError::MissingConfigError {
                field: "telegram.token".to_string(),
            })?;
        let channel = resolved_secret(&self.telegram.channel_id).ok_or_else(|| {
            MokhberError::MissingConfigError {
                field: "telegram.channel_id".to_string(),
            }
        })?;
        Ok((token, channel))
    }

    fn validate_news(&self) -> Result<()> {
        for (i, profile) in self.news.iter().enumerate() {
            let prefix = format!("news[{}]", i);
            validate_non_empty_string(&format!("{}.name", prefix), &profile.name)?;
            validate_path(&format!("{}.history_file", prefix), &profile.history_file)?;
            validate_positive_number(&format!("{}.sample_size", prefix), profile.sample_size, 1)?;
            for (j, source) in profile.sources.iter().enumerate() {
                let source_prefix = format!("{}.sources[{}]", prefix, j);
                validate_non_empty_string(&format!("{}.name", source_prefix), &source.name)?;
                validate_url_list(&format!("{}.urls", source_prefix), &source.urls)?;
            }
        }
        Ok(())
    }

    fn validate_podcasts(&self) -> Result<()> {
        for (i, group) in self.podcasts.iter().enumerate() {
            let prefix = format!("podcasts[{}]", i);
            validate_non_empty_string(&format!("{}.name", prefix), &group.name)?;
            validate_path(&format!("{}.history_file", prefix), &group.history_file)?;
            match group.scraper {
                PodcastScraper::PhilosophybitesWeb | PodcastScraper::PhilosophizethisWeb => {
                    validate_url_list(&format!("{}.index_urls", prefix), &group.index_urls)?
                }
                PodcastScraper::MultiRssRandom
                | PodcastScraper::PodscribeRss
                | PodcastScraper::Lexfridman => {
                    validate_url_list(&format!("{}.feed_urls", prefix), &group.feed_urls)?
                }
            }
        }
        Ok(())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("endpoints.gemini_api_base", &self.endpoints.gemini_api_base)?;
        validate_url("endpoints.groq_api_url", &self.endpoints.groq_api_url)?;
        validate_url("endpoints.telegram_api_base", &self.endpoints.telegram_api_base)?;
        validate_url("endpoints.crossref_api_base", &self.endpoints.crossref_api_base)?;
        validate_non_empty_string("ai.gemini_model", &self.ai.gemini_model)?;
        validate_non_empty_string("ai.groq_model", &self.ai.groq_model)?;
        self.validate_news()?;
        self.validate_podcasts()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
