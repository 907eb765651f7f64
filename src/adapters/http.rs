use crate::utils::error::{MokhberError, Result};
use reqwest::Client;
use std::time::Duration;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";
pub const PLAIN_USER_AGENT: &str = "Mozilla/5.0";

pub const PAGE_TIMEOUT: Duration = Duration::from_secs(20);
pub const CROSSREF_TIMEOUT: Duration = Duration::from_secs(15);
pub const LONG_PAGE_TIMEOUT: Duration = Duration::from_secs(30);
pub const LLM_TIMEOUT: Duration = Duration::from_secs(45);
pub const TELEGRAM_TIMEOUT: Duration = Duration::from_secs(30);

pub fn build_client() -> Result<Client> {
    Ok(Client::builder().connect_timeout(Duration::from_secs(10)).build()?)
}

/// GET a page as text, failing on a non-success status.
pub async fn fetch_text(
    client: &Client,
    url: &str,
    user_agent: &str,
    timeout: Duration,
) -> Result<String> {
    tracing::debug!("GET {}", url);
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, user_agent)
        .timeout(timeout)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(MokhberError::ScrapeError {
            url: url.to_string(),
            message: format!("HTTP status {}", status),
        });
    }

    Ok(response.text().await?)
}

/// Truncates to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
