use httpmock::prelude::*;
use mokhber::core::Randomizer;
use mokhber::utils::monitor::RunMonitor;
use mokhber::{run_podcasts, AppConfig, Services};
use serde_json::json;
use tempfile::TempDir;

const TOKEN: &str = "123:abc";

fn config_for(server: &MockServer) -> AppConfig {
    let base = server.base_url();
    AppConfig::from_toml_str(&format!(
        r##"
[ai]
provider = "gemini"
gemini_api_key = "test-key"

[telegram]
token = "{TOKEN}"
channel_id = "@pods"

[endpoints]
gemini_api_base = "{base}"
groq_api_url = "{base}/groq"
telegram_api_base = "{base}"
crossref_api_base = "{base}"

[[podcasts]]
name = "Podcast Summaries"
history_file = "posted_podcastsummary_links.txt"
scraper = "multi_rss_random"
feed_urls = ["{base}/feeds/a", "{base}/feeds/b"]
category_fa = "خلاصه‌پادکست"
hashtag_en = "#PodcastSummary"

[[podcasts]]
name = "Lex Fridman Podcast"
history_file = "posted_lexfridman_links.txt"
scraper = "lexfridman"
feed_urls = ["{base}/feed/podcast/"]
category_fa = "پادکست_لکس_فریدمن"
hashtag_en = "#LexFridmanPodcast"
"##
    ))
    .unwrap()
}

fn podcast_feed(title: &str, link: &str, mp3: &str) -> String {
    let description = "In this episode we talk about memory, attention and the long history of \
                       how people have tried to train both, with practical advice for listeners.";
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd"><channel>
<title>Show</title>
<item>
  <title>{title}</title>
  <link>{link}</link>
  <pubDate>Tue, 08 Jul 2025 09:00:00 GMT</pubDate>
  <description><![CDATA[<p>{description}</p>]]></description>
  <enclosure url="{mp3}" type="audio/mpeg" length="1"/>
</item>
</channel></rss>"#
    )
}

async fn mock_gemini(server: &MockServer, answer: serde_json::Value) {
    let text = answer.to_string();
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent");
            then.status(200).json_body(json!({
                "candidates": [{"content": {"parts": [{"text": text}]}}]
            }));
        })
        .await;
}

#[tokio::test]
async fn test_multi_feed_group_posts_an_unposted_episode() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start_async().await;

    let old_mp3 = server.url("/media/a.mp3");
    let new_mp3 = server.url("/media/b.mp3");
    std::fs::write(
        dir.path().join("posted_podcastsummary_links.txt"),
        format!("{}\n", old_mp3),
    )
    .unwrap();

    let feed_a = podcast_feed("Episode A", &server.url("/a"), &old_mp3);
    let feed_b = podcast_feed("Episode B", &server.url("/b"), &new_mp3);
    server
        .mock_async(|when, then| {
            when.method(GET).path("/feeds/a");
            then.status(200).body(feed_a);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/feeds/b");
            then.status(200).body(feed_b);
        })
        .await;
    mock_gemini(
        &server,
        json!({
            "catchy_title": "حافظه و توجه",
            "summary": "گفت‌وگویی درباره حافظه.",
            "key_takeaways": ["تمرین", "خواب"],
            "guest_info": "اپیزود تک‌نفره",
            "hashtags": ["حافظه", "روانشناسی"]
        }),
    )
    .await;
    let send_message = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("/bot{}/sendMessage", TOKEN))
                .x_www_form_urlencoded_tuple("chat_id", "@pods");
            then.status(200)
                .json_body(json!({"ok": true, "result": {"message_id": 5}}));
        })
        .await;

    let config = config_for(&server);
    let services = Services::from_config(&config, dir.path(), false)
        .unwrap()
        .with_random(Randomizer::seeded(7));

    let report = run_podcasts(&config, &services, Some("Podcast Summaries"), &RunMonitor::new(false))
        .await
        .unwrap();

    assert_eq!(report.pipeline, "podcasts");
    assert_eq!(report.published, vec![new_mp3.clone()]);
    send_message.assert_hits_async(1).await;

    let history =
        std::fs::read_to_string(dir.path().join("posted_podcastsummary_links.txt")).unwrap();
    let mut expected = vec![old_mp3.as_str(), new_mp3.as_str()];
    expected.sort();
    assert_eq!(history.lines().collect::<Vec<_>>(), expected);
}

#[tokio::test]
async fn test_lex_episode_sends_video_then_threaded_analysis() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start_async().await;

    let episode_link = format!("{}?utm_source=rss", server.url("/episode/ep1"));
    let transcript_url = server.url("/ep1-transcript");
    let video_url = "https://www.youtube.com/embed/abc123";

    let feed = podcast_feed("#470 - Guest Name: Topic", &episode_link, &server.url("/media/lex.mp3"));
    server
        .mock_async(|when, then| {
            when.method(GET).path("/feed/podcast/");
            then.status(200).body(feed);
        })
        .await;
    let episode_page = format!(
        r#"<html><body>
<p><b>Transcript:</b> <a href="{transcript_url}">{transcript_url}</a></p>
<div class="episode-player"><iframe src="{video_url}"></iframe></div>
</body></html>"#
    );
    let episode = server
        .mock_async(|when, then| {
            when.method(GET).path("/episode/ep1");
            then.status(200).body(episode_page);
        })
        .await;
    let spans = "<span class=\"ts-text\">We talked at length about the nature of intelligence.</span>"
        .repeat(20);
    let transcript_page = format!(r#"<html><body><div class="entry-content">{spans}</div></body></html>"#);
    server
        .mock_async(|when, then| {
            when.method(GET).path("/ep1-transcript");
            then.status(200).body(transcript_page);
        })
        .await;
    mock_gemini(
        &server,
        json!({
            "guest_name": "Guest Name",
            "summary": "گفت‌وگویی درباره هوش.",
            "key_topics": ["هوش"],
            "notable_questions": ["هوش چیست؟"],
            "memorable_quote": "Intelligence is a journey.",
            "hashtags": ["هوش_مصنوعی"]
        }),
    )
    .await;

    let video_text = format!("🎙️ **پادکست روز: #470 - Guest Name: Topic**\n\n{}", video_url);
    let video_message = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("/bot{}/sendMessage", TOKEN))
                .x_www_form_urlencoded_tuple("text", video_text.as_str());
            then.status(200)
                .json_body(json!({"ok": true, "result": {"message_id": 77}}));
        })
        .await;
    let reply = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("/bot{}/sendMessage", TOKEN))
                .x_www_form_urlencoded_tuple("reply_to_message_id", "77")
                .x_www_form_urlencoded_tuple("parse_mode", "HTML");
            then.status(200)
                .json_body(json!({"ok": true, "result": {"message_id": 78}}));
        })
        .await;

    let config = config_for(&server);
    let services = Services::from_config(&config, dir.path(), false).unwrap();
    let report = run_podcasts(&config, &services, Some("Lex Fridman Podcast"), &RunMonitor::new(false))
        .await
        .unwrap();

    assert_eq!(report.published, vec![episode_link.clone()]);
    episode.assert_hits_async(1).await;
    video_message.assert_hits_async(1).await;
    reply.assert_hits_async(1).await;

    let history = std::fs::read_to_string(dir.path().join("posted_lexfridman_links.txt")).unwrap();
    assert_eq!(history.trim(), episode_link);
}

#[tokio::test]
async fn test_unreachable_group_is_skipped() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/feed/podcast/");
            then.status(503);
        })
        .await;

    let config = config_for(&server);
    let services = Services::from_config(&config, dir.path(), true).unwrap();
    let report = run_podcasts(&config, &services, Some("Lex Fridman Podcast"), &RunMonitor::new(false))
        .await
        .unwrap();

    assert_eq!(report.candidates, 0);
    assert!(report.nothing_published());
}
