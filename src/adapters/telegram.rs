use crate::adapters::http::{truncate_chars, TELEGRAM_TIMEOUT};
use crate::domain::model::Delivery;
use crate::utils::error::{MokhberError, Result};
use reqwest::Client;
use serde_json::Value;

/// Telegram rejects message texts longer than this many characters.
pub const MESSAGE_LIMIT: usize = 4096;

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_base: String,
    token: String,
    channel_id: String,
}

impl TelegramClient {
    pub fn new(client: Client, api_base: &str, token: &str, channel_id: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            channel_id: channel_id.to_string(),
        }
    }

    /// Calls a Bot API method with a form body and returns `result.message_id` when present.
    async fn call(&self, method: &str, form: &[(&str, String)]) -> Result<Option<i64>> {
        let url = format!("{}/bot{}/{}", self.api_base, self.token, method);
        let mut params: Vec<(&str, String)> = vec![("chat_id", self.channel_id.clone())];
        params.extend(form.iter().cloned());

        let response = self
            .client
            .post(&url)
            .form(&params)
            .timeout(TELEGRAM_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let failure = || MokhberError::TelegramError {
            method: method.to_string(),
            status: status.as_u16(),
            body: body.clone(),
        };
        if !status.is_success() {
            return Err(failure());
        }

        let payload: Value = serde_json::from_str(&body).map_err(|_| failure())?;
        if payload.get("ok").and_then(Value::as_bool) == Some(false) {
            return Err(failure());
        }
        Ok(payload.pointer("/result/message_id").and_then(Value::as_i64))
    }

    pub async fn send_message(
        &self,
        text: &str,
        parse_html: bool,
        disable_preview: bool,
        reply_to: Option<i64>,
    ) -> Result<Option<i64>> {
        let mut form = vec![
            ("text", text.to_string()),
            ("disable_web_page_preview", disable_preview.to_string()),
        ];
        if parse_html {
            form.push(("parse_mode", "HTML".to_string()));
        }
        if let Some(id) = reply_to {
            form.push(("reply_to_message_id", id.to_string()));
        }
        self.call("sendMessage", &form).await
    }

    pub async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<Option<i64>> {
        let form = vec![
            ("photo", photo_url.to_string()),
            ("caption", caption.to_string()),
            ("parse_mode", "HTML".to_string()),
        ];
        self.call("sendPhoto", &form).await
    }

    /// Sends one post using the message sequence its delivery asks for.
    pub async fn deliver(&self, delivery: &Delivery) -> Result<()> {
        match delivery {
            Delivery::Article {
                message,
                caption,
                image_url: Some(image_url),
            } => {
                tracing::info!("  Sending multipart message (photo + text)...");
                self.send_photo(image_url, caption).await?;
                tracing::info!("  ✅ Sent photo with caption: '{}'", caption);
                self.send_message(message, true, true, None).await?;
                tracing::info!("  ✅ Sent accompanying full text.");
            }
            Delivery::Article {
                message,
                image_url: None,
                ..
            } => {
                tracing::info!("  Sending text-only message to Telegram...");
                self.send_message(truncate_chars(message, MESSAGE_LIMIT), true, true, None)
                    .await?;
                tracing::info!("  ✅ Sent text-only post.");
            }
            Delivery::Text { message } => {
                tracing::info!("  Sending simple text message to Telegram...");
                self.send_message(truncate_chars(message, MESSAGE_LIMIT), true, false, None)
                    .await?;
                tracing::info!("  ✅ Sent podcast post.");
            }
            Delivery::VideoThenReply {
                title,
                video_url,
                analysis,
            } => {
                tracing::info!("  Sending podcast video link to Telegram...");
                let video_text = format!("🎙️ **پادکست روز: {}**\n\n{}", title, video_url);
                let message_id = self
                    .send_message(&video_text, false, false, None)
                    .await?
                    .ok_or_else(|| MokhberError::TelegramError {
                        method: "sendMessage".to_string(),
                        status: 200,
                        body: "response carried no result.message_id".to_string(),
                    })?;
                tracing::info!("  ✅ Sent video link, replying with analysis...");
                self.send_message(
                    truncate_chars(analysis, MESSAGE_LIMIT),
                    true,
                    false,
                    Some(message_id),
                )
                .await?;
                tracing::info!("  ✅ Sent analysis.");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn ok_response(message_id: i64) -> Value {
        json!({"ok": true, "result": {"message_id": message_id}})
    }

    #[tokio::test]
    async fn test_article_with_image_sends_photo_then_text() {
        let server = MockServer::start_async().await;
        let photo = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/botT0KEN/sendPhoto")
                    .x_www_form_urlencoded_tuple("chat_id", "@chan")
                    .x_www_form_urlencoded_tuple("photo", "https://img.example/a.jpg")
                    .x_www_form_urlencoded_tuple("parse_mode", "HTML");
                then.status(200).json_body(ok_response(10));
            })
            .await;
        let text = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/botT0KEN/sendMessage")
                    .x_www_form_urlencoded_tuple("disable_web_page_preview", "true");
                then.status(200).json_body(ok_response(11));
            })
            .await;

        let telegram = TelegramClient::new(Client::new(), &server.base_url(), "T0KEN", "@chan");
        telegram
            .deliver(&Delivery::Article {
                message: "body".to_string(),
                caption: "title".to_string(),
                image_url: Some("https://img.example/a.jpg".to_string()),
            })
            .await
            .unwrap();

        photo.assert_async().await;
        text.assert_async().await;
    }

    #[tokio::test]
    async fn test_text_only_article_is_truncated() {
        let server = MockServer::start_async().await;
        let long = "ا".repeat(MESSAGE_LIMIT + 10);
        let expected = "ا".repeat(MESSAGE_LIMIT);
        let text = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/botT/sendMessage")
                    .x_www_form_urlencoded_tuple("text", expected.as_str());
                then.status(200).json_body(ok_response(1));
            })
            .await;

        let telegram = TelegramClient::new(Client::new(), &server.base_url(), "T", "@chan");
        telegram
            .deliver(&Delivery::Article {
                message: long,
                caption: String::new(),
                image_url: None,
            })
            .await
            .unwrap();

        text.assert_async().await;
    }

    #[tokio::test]
    async fn test_video_then_reply_uses_first_message_id() {
        let server = MockServer::start_async().await;
        let video = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/botT/sendMessage")
                    .x_www_form_urlencoded_tuple("text", "🎙️ **پادکست روز: Ep 1**\n\nhttps://youtube.com/embed/x");
                then.status(200).json_body(ok_response(77));
            })
            .await;
        let reply = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/botT/sendMessage")
                    .x_www_form_urlencoded_tuple("reply_to_message_id", "77");
                then.status(200).json_body(ok_response(78));
            })
            .await;

        let telegram = TelegramClient::new(Client::new(), &server.base_url(), "T", "@chan");
        telegram
            .deliver(&Delivery::VideoThenReply {
                title: "Ep 1".to_string(),
                video_url: "https://youtube.com/embed/x".to_string(),
                analysis: "analysis".to_string(),
            })
            .await
            .unwrap();

        video.assert_async().await;
        reply.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_carries_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/botT/sendMessage");
                then.status(400)
                    .json_body(json!({"ok": false, "description": "Bad Request: chat not found"}));
            })
            .await;

        let telegram = TelegramClient::new(Client::new(), &server.base_url(), "T", "@chan");
        let err = telegram
            .deliver(&Delivery::Text {
                message: "hi".to_string(),
            })
            .await
            .unwrap_err();

        match err {
            MokhberError::TelegramError { status, body, .. } => {
                assert_eq!(status, 400);
                assert!(body.contains("chat not found"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
