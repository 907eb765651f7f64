//! Prompts, length gates and typed answers on top of an [`LlmProvider`].

use crate::adapters::http::truncate_chars;
use crate::domain::analysis::{NewsAnalysis, PaperAnalysis, RssPodcastAnalysis, TranscriptAnalysis};
use crate::domain::ports::LlmProvider;
use crate::utils::error::Result;
use serde::de::DeserializeOwned;

const NEWS_MIN_CHARS: usize = 50;
const PAPER_MIN_CHARS: usize = 100;
const TRANSCRIPT_MIN_CHARS: usize = 500;
const DESCRIPTION_MIN_CHARS: usize = 100;

const ARTICLE_MAX_CHARS: usize = 15_000;
const TRANSCRIPT_MAX_CHARS: usize = 25_000;

pub struct Analyst {
    provider: Box<dyn LlmProvider>,
}

impl Analyst {
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn ask<T: DeserializeOwned>(&self, prompt: &str) -> Result<T> {
        let answer = self.provider.complete_json(prompt).await?;
        Ok(serde_json::from_value(answer)?)
    }

    fn long_enough(text: &str, min_chars: usize) -> bool {
        text.chars().count() >= min_chars
    }

    pub async fn news(&self, text: &str) -> Result<Option<NewsAnalysis>> {
        if !Self::long_enough(text, NEWS_MIN_CHARS) {
            tracing::info!("  Text too short, skipping AI news analysis.");
            return Ok(None);
        }
        tracing::info!(
            "  Sending for GENERAL NEWS analysis via [{}]...",
            self.provider_name()
        );
        let prompt = format!(
            r#"You are a science news editor. Summarize the following article for a general Persian-speaking audience. Provide a response ONLY in a valid JSON object format in modern Persian (Farsi).
The JSON object must have these exact keys:
- "catchy_title": An engaging, human-like title for the news piece.
- "summary": A simple paragraph, clear summary of the main points.
- "keywords": A list of 3-4 relevant keyword strings.
- "eli5": A single paragraph, ultra-simple explaining the core idea as if to a 5-year-old.

Article Text to Analyze:
---
{}
---"#,
            truncate_chars(text, ARTICLE_MAX_CHARS)
        );
        self.ask(&prompt).await.map(Some)
    }

    pub async fn paper(&self, text: &str) -> Result<Option<PaperAnalysis>> {
        if !Self::long_enough(text, PAPER_MIN_CHARS) {
            tracing::info!("  Text too short, skipping AI paper analysis.");
            return Ok(None);
        }
        tracing::info!(
            "  Sending for DETAILED PAPER analysis via [{}]...",
            self.provider_name()
        );
        let prompt = format!(
            r#"You are an expert science communicator. Analyze the following scientific text and provide a response ONLY in a valid JSON object format in modern Persian (Farsi). The JSON object must have these exact keys:
- "summary": A 3-4 sentence summary.
- "highlights": A list of 3 key finding strings.
- "keywords": A list of 4-5 keyword strings.
- "eli5": A single sentence explanation.
- "big_so_what": A 1-2 sentence explanation of why this matters.
- "analogy": A single sentence analogy.
- "next_steps": A list of 2-3 short strings about future research.

Scientific Text to Analyze:
---
{}
---"#,
            truncate_chars(text, ARTICLE_MAX_CHARS)
        );
        self.ask(&prompt).await.map(Some)
    }

    pub async fn transcript(&self, transcript: &str) -> Result<Option<TranscriptAnalysis>> {
        if !Self::long_enough(transcript, TRANSCRIPT_MIN_CHARS) {
            tracing::info!("  Transcript too short, skipping AI podcast analysis.");
            return Ok(None);
        }
        tracing::info!(
            "  Sending transcript for PODCAST analysis via [{}]...",
            self.provider_name()
        );
        let prompt = format!(
            r#"You are a podcast analyst. Your task is to analyze the following podcast transcript and summarize it for a general audience. Provide a response ONLY in a valid JSON object format in modern Persian (Farsi).

The JSON object must have these exact keys:
- "guest_name": The full name of the guest being interviewed. if not, mention "بدون مهمان"
- "summary": A concise, engaging 2-3 paragraph summary of the entire conversation.
- "key_topics": A list of 4-5 main topics or ideas discussed, as short strings.
- "notable_questions": A list of 2-3 interesting questions the host asked the guest.
- "memorable_quote": One impactful or thought-provoking quote from the guest (or the host if solo).
- "hashtags": A list of 4-5 relevant Persian hashtags (without the # symbol).

Podcast Transcript to Analyze:
---
{}
---"#,
            truncate_chars(transcript, TRANSCRIPT_MAX_CHARS)
        );
        self.ask(&prompt).await.map(Some)
    }

    pub async fn rss_podcast(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Option<RssPodcastAnalysis>> {
        if !Self::long_enough(description, DESCRIPTION_MIN_CHARS) {
            tracing::info!("  RSS description is too short, skipping AI analysis.");
            return Ok(None);
        }
        tracing::info!(
            "  Sending RSS content for PODCAST analysis via [{}]...",
            self.provider_name()
        );
        let prompt = format!(
            r#"You are a podcast summarizer. Your task is to refine and structure the following podcast description into a more engaging format for a social media post. The original podcast title is "{}". Provide a response ONLY in a valid JSON object format in modern Persian (Farsi).

The JSON object must have these exact keys:
- "catchy_title": Create a new, engaging title for the social media post based on the episode's content.
- "summary": Rewrite the provided description into a clean, easy-to-read paragraph.
- "key_takeaways": From the description, extract a list of 3-4 key takeaways or topics as short, bullet-point-style strings.
- "guest_info": Identify the guest if mentioned, otherwise state it's a solo episode.
- "hashtags": A list of 4-5 relevant Persian hashtags (without the # symbol).

Podcast Description to Analyze:
---
{}
---"#,
            title,
            truncate_chars(description, ARTICLE_MAX_CHARS)
        );
        self.ask(&prompt).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// Records prompts and replies with a fixed answer.
    struct CannedProvider {
        answer: Value,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        fn name(&self) -> &str {
            "CANNED"
        }

        async fn complete_json(&self, prompt: &str) -> Result<Value> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.answer.clone())
        }
    }

    fn analyst(answer: Value) -> (Analyst, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let provider = CannedProvider {
            answer,
            prompts: prompts.clone(),
        };
        (Analyst::new(Box::new(provider)), prompts)
    }

    #[tokio::test]
    async fn test_short_text_skips_provider() {
        let (analyst, prompts) = analyst(json!({}));
        assert!(analyst.news(&"a".repeat(49)).await.unwrap().is_none());
        assert!(analyst.paper(&"a".repeat(99)).await.unwrap().is_none());
        assert!(analyst.transcript(&"a".repeat(499)).await.unwrap().is_none());
        assert!(analyst.rss_podcast("t", &"a".repeat(99)).await.unwrap().is_none());
        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gates_count_characters_not_bytes() {
        let (analyst, prompts) = analyst(json!({"summary": "خلاصه"}));
        // 30 Persian letters are 60 bytes but still below the 50-character gate.
        assert!(analyst.news(&"ب".repeat(30)).await.unwrap().is_none());
        let answer = analyst.news(&"ب".repeat(50)).await.unwrap().unwrap();
        assert_eq!(answer.summary, "خلاصه");
        assert_eq!(prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transcript_is_truncated_in_prompt() {
        let (analyst, prompts) = analyst(json!({"guest_name": "X"}));
        let transcript = format!("{}{}", "a".repeat(TRANSCRIPT_MAX_CHARS), "TAIL");
        let answer = analyst.transcript(&transcript).await.unwrap().unwrap();

        assert_eq!(answer.guest_name.as_deref(), Some("X"));
        let prompt = prompts.lock().unwrap()[0].clone();
        assert!(!prompt.contains("TAIL"));
    }

    #[tokio::test]
    async fn test_rss_prompt_carries_title() {
        let (analyst, prompts) = analyst(json!({"catchy_title": "عنوان"}));
        let answer = analyst
            .rss_podcast("Episode 42", &"d".repeat(150))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(answer.catchy_title.as_deref(), Some("عنوان"));
        assert!(prompts.lock().unwrap()[0].contains(r#"The original podcast title is "Episode 42""#));
    }

    #[tokio::test]
    async fn test_answer_of_wrong_shape_is_an_error() {
        let (analyst, _) = analyst(json!("plain text"));
        assert!(analyst.news(&"a".repeat(60)).await.is_err());
    }
}
