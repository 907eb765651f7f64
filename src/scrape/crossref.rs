//! Abstracts from the Crossref works API for feeds that only carry a DOI.

use super::html::fragment_text;
use crate::adapters::http::CROSSREF_TIMEOUT;
use crate::domain::model::FeedEntry;
use crate::utils::error::{MokhberError, Result};
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::OnceLock;

fn doi_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)10\.\d{4,9}/[-._;()/:A-Z0-9]+").expect("valid regex"))
}

/// DOI from `dc:identifier`, then `prism:doi`, then the entry link.
pub fn extract_doi(entry: &FeedEntry) -> Option<String> {
    let from_metadata = match (&entry.dc_identifier, &entry.prism_doi) {
        (Some(dc), _) => dc.replace("doi:", "").trim().to_string(),
        (None, Some(prism)) => prism.trim().to_string(),
        (None, None) => String::new(),
    };
    if !from_metadata.is_empty() {
        return Some(from_metadata);
    }
    doi_regex()
        .find(&entry.link)
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Clone)]
pub struct CrossrefClient {
    client: Client,
    api_base: String,
}

impl CrossrefClient {
    pub fn new(client: Client, api_base: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Plain-text abstract for `doi`. `None` when the DOI is unknown or has no abstract.
    pub async fn fetch_abstract(&self, doi: &str) -> Result<Option<String>> {
        let url = format!("{}/works/{}", self.api_base, doi);
        tracing::info!("  Querying Crossref with DOI: {}", doi);

        let response = self
            .client
            .get(&url)
            .timeout(CROSSREF_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::info!("  DOI not found in Crossref (404).");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(MokhberError::ScrapeError {
                url,
                message: format!("Crossref returned HTTP status {}", status),
            });
        }

        let payload: Value = response.json().await?;
        match payload.pointer("/message/abstract").and_then(Value::as_str) {
            Some(html) => {
                let text = fragment_text(html);
                tracing::info!(
                    "  Successfully fetched {} characters from Crossref.",
                    text.chars().count()
                );
                Ok(Some(text))
            }
            None => {
                tracing::info!("  Crossref response did not contain an abstract.");
                Ok(None)
            }
        }
    }

    pub async fn abstract_for(&self, entry: &FeedEntry) -> Result<Option<String>> {
        tracing::info!("  Attempting Crossref fetch for: {}", entry.title);
        match extract_doi(entry) {
            Some(doi) => self.fetch_abstract(&doi).await,
            None => {
                tracing::info!("  Could not find or extract a DOI for this entry.");
                Ok(None)
            }
        }
    }
}
