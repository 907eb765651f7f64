use crate::adapters::storage::HistoryStore;
use crate::adapters::telegram::TelegramClient;
use crate::domain::model::{Delivery, Post, RunReport};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::collections::{BTreeMap, BTreeSet};

/// The load step shared by every pipeline: deliver posts and record the
/// ones that went out in their history files.
pub struct Publisher<S: Storage> {
    history: HistoryStore<S>,
    telegram: Option<TelegramClient>,
}

impl<S: Storage> Publisher<S> {
    pub fn new(history: HistoryStore<S>, telegram: TelegramClient) -> Self {
        Self {
            history,
            telegram: Some(telegram),
        }
    }

    /// Logs posts instead of sending them and leaves history files untouched.
    pub fn dry_run(history: HistoryStore<S>) -> Self {
        Self {
            history,
            telegram: None,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.telegram.is_none()
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    pub async fn publish_all(&self, pipeline: &str, posts: Vec<Post>) -> Result<RunReport> {
        let mut report = RunReport::new(pipeline, self.is_dry_run());
        let Some(telegram) = &self.telegram else {
            for post in posts {
                log_dry_run(&post);
                report.published.push(post.unique_id);
            }
            return Ok(report);
        };

        // Read every history file up front so an unreadable one stops the run
        // before anything is sent.
        let mut histories: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for post in &posts {
            if !histories.contains_key(&post.history_file) {
                let links = self.history.load(&post.history_file).await?;
                histories.insert(post.history_file.clone(), links);
            }
        }

        let mut changed: BTreeSet<String> = BTreeSet::new();
        for post in posts {
            tracing::info!("--- Publishing from {} ---", post.source_name);
            match telegram.deliver(&post.delivery).await {
                Ok(()) => {
                    if let Some(links) = histories.get_mut(&post.history_file) {
                        links.insert(post.unique_id.clone());
                    }
                    changed.insert(post.history_file);
                    report.published.push(post.unique_id);
                }
                Err(e) => {
                    tracing::error!("  ❌ Error sending post to Telegram: {}", e);
                    report.failed.push((post.unique_id, e.to_string()));
                }
            }
        }

        for (history_file, links) in &histories {
            if changed.contains(history_file) {
                self.history.save(history_file, links).await?;
            }
        }
        Ok(report)
    }
}

fn log_dry_run(post: &Post) {
    let (kind, text) = match &post.delivery {
        Delivery::Article {
            message, image_url, ..
        } => (
            if image_url.is_some() { "photo + text" } else { "text" },
            message,
        ),
        Delivery::Text { message } => ("text", message),
        Delivery::VideoThenReply { analysis, .. } => ("video + reply", analysis),
    };
    tracing::info!(
        "  [dry-run] Would send {} post for '{}' ({}) to history '{}'",
        kind,
        post.source_name,
        post.unique_id,
        post.history_file
    );
    tracing::debug!("{}", text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use httpmock::prelude::*;
    use reqwest::Client;
    use serde_json::json;
    use tempfile::TempDir;

    fn post(id: &str, history_file: &str) -> Post {
        Post {
            source_name: "Source".to_string(),
            history_file: history_file.to_string(),
            unique_id: id.to_string(),
            delivery: Delivery::Text {
                message: format!("post {}", id),
            },
        }
    }

    #[tokio::test]
    async fn test_only_delivered_posts_are_recorded() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/botT/sendMessage")
                    .x_www_form_urlencoded_tuple("text", "post https://a.example/ok");
                then.status(200)
                    .json_body(json!({"ok": true, "result": {"message_id": 1}}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/botT/sendMessage")
                    .x_www_form_urlencoded_tuple("text", "post https://a.example/bad");
                then.status(400)
                    .json_body(json!({"ok": false, "description": "Bad Request"}));
            })
            .await;

        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("h.txt"), "https://a.example/old\n").unwrap();
        let publisher = Publisher::new(
            HistoryStore::new(LocalStorage::new(dir.path())),
            TelegramClient::new(Client::new(), &server.base_url(), "T", "@chan"),
        );

        let report = publisher
            .publish_all(
                "news",
                vec![
                    post("https://a.example/bad", "h.txt"),
                    post("https://a.example/ok", "h.txt"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(report.published, vec!["https://a.example/ok".to_string()]);
        assert_eq!(report.failed.len(), 1);
        let saved = std::fs::read_to_string(dir.path().join("h.txt")).unwrap();
        assert_eq!(saved, "https://a.example/ok\nhttps://a.example/old\n");
    }

    #[tokio::test]
    async fn test_unreadable_history_stops_before_sending() {
        let server = MockServer::start_async().await;
        let send = server
            .mock_async(|when, then| {
                when.method(POST).path("/botT/sendMessage");
                then.status(200)
                    .json_body(json!({"ok": true, "result": {"message_id": 1}}));
            })
            .await;

        let dir = TempDir::new().unwrap();
        // A directory where the history file should be cannot be read as one.
        std::fs::create_dir(dir.path().join("h.txt")).unwrap();
        let publisher = Publisher::new(
            HistoryStore::new(LocalStorage::new(dir.path())),
            TelegramClient::new(Client::new(), &server.base_url(), "T", "@chan"),
        );

        let result = publisher
            .publish_all(
                "news",
                vec![
                    post("https://a.example/ok", "ok.txt"),
                    post("https://a.example/1", "h.txt"),
                ],
            )
            .await;

        assert!(result.is_err());
        send.assert_hits_async(0).await;
        assert!(!dir.path().join("ok.txt").exists());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let publisher = Publisher::dry_run(HistoryStore::new(LocalStorage::new(dir.path())));

        let report = publisher
            .publish_all("podcasts", vec![post("https://p.example/1", "p.txt")])
            .await
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.published.len(), 1);
        assert!(!dir.path().join("p.txt").exists());
    }

    #[tokio::test]
    async fn test_nothing_delivered_leaves_history_alone() {
        let dir = TempDir::new().unwrap();
        let publisher = Publisher::new(
            HistoryStore::new(LocalStorage::new(dir.path())),
            TelegramClient::new(Client::new(), "http://127.0.0.1:9", "T", "@chan"),
        );

        let report = publisher.publish_all("news", Vec::new()).await.unwrap();

        assert!(report.nothing_published());
        assert!(!dir.path().join("posted_links3.txt").exists());
    }
}
