//! Gemini and Groq chat endpoints, both asked to answer in JSON.

use crate::adapters::http::LLM_TIMEOUT;
use crate::config::toml_config::{AiProvider, AppConfig};
use crate::domain::ports::LlmProvider;
use crate::utils::error::{MokhberError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

pub struct GeminiProvider {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(client: Client, api_base: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    fn error(&self, message: impl Into<String>) -> MokhberError {
        MokhberError::LlmError {
            provider: "Gemini".to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "GEMINI"
    }

    async fn complete_json(&self, prompt: &str) -> Result<Value> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        );
        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {"response_mime_type": "application/json"}
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .timeout(LLM_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.error(format!("API error ({}): {}", status, text)));
        }

        let payload: Value = response.json().await?;
        let answer = payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .ok_or_else(|| self.error("response has no candidates[0].content.parts[0].text"))?;

        serde_json::from_str(answer)
            .map_err(|e| self.error(format!("answer is not valid JSON: {}", e)))
    }
}

pub struct GroqProvider {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    site_url: String,
    app_name: String,
}

impl GroqProvider {
    pub fn new(client: Client, api_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            site_url: String::new(),
            app_name: String::new(),
        }
    }

    /// Attribution headers (`HTTP-Referer`, `X-Title`) sent with each request.
    pub fn with_attribution(mut self, site_url: &str, app_name: &str) -> Self {
        self.site_url = site_url.to_string();
        self.app_name = app_name.to_string();
        self
    }

    fn error(&self, message: impl Into<String>) -> MokhberError {
        MokhberError::LlmError {
            provider: "Groq".to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    fn name(&self) -> &str {
        "GROQ"
    }

    async fn complete_json(&self, prompt: &str) -> Result<Value> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "response_format": {"type": "json_object"},
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", &self.app_name)
            .json(&body)
            .timeout(LLM_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.error(format!("API error ({}): {}", status, text)));
        }

        let payload: Value = response.json().await?;
        let answer = payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| self.error("response has no choices[0].message.content"))?;

        serde_json::from_str(answer)
            .map_err(|e| self.error(format!("answer is not valid JSON: {}", e)))
    }
}

/// Builds the provider selected in `[ai]`; fails when its key is not configured.
pub fn provider_from_config(client: Client, config: &AppConfig) -> Result<Box<dyn LlmProvider>> {
    let key = config.require_ai_key()?;
    let provider: Box<dyn LlmProvider> = match config.ai.provider {
        AiProvider::Gemini => Box::new(GeminiProvider::new(
            client,
            &config.endpoints.gemini_api_base,
            key,
            &config.ai.gemini_model,
        )),
        AiProvider::Groq => Box::new(
            GroqProvider::new(client, &config.endpoints.groq_api_url, key, &config.ai.groq_model)
                .with_attribution(&config.ai.site_url, &config.ai.app_name),
        ),
    };
    Ok(provider)
}
