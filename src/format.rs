//! Telegram HTML layouts for news, paper and podcast posts.

use crate::domain::analysis::{NewsAnalysis, PaperAnalysis, RssPodcastAnalysis, TranscriptAnalysis};
use chrono::DateTime;

pub const DEFAULT_CAPTION: &str = "خبر علمی";
const UNKNOWN_GUEST: &str = "نامشخص";
const NO_SUMMARY: &str = "خلاصه‌ای موجود نیست.";

/// Where a post came from: the source or podcast group and its fixed tags.
#[derive(Debug, Clone, Copy)]
pub struct Origin<'a> {
    pub name: &'a str,
    pub category_fa: &'a str,
    pub hashtag_en: &'a str,
}

impl Origin<'_> {
    fn tag_line(&self) -> String {
        format!(
            "{} #{}",
            escape_html(self.hashtag_en),
            escape_html(&self.category_fa.replace(' ', "_"))
        )
    }
}

/// Escapes the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("▪️ {}", escape_html(item)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn bullet_section(heading: &str, items: &[String]) -> String {
    if items.is_empty() {
        String::new()
    } else {
        format!("{}\n{}\n\n", heading, bullets(items))
    }
}

/// `#tag` per keyword, with spaces and hyphens turned into underscores.
pub fn keyword_tags(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|kw| format!("#{}", escape_html(&kw.replace(' ', "_").replace('-', "_"))))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `#tag` per model hashtag; only spaces are replaced.
pub fn podcast_hashtags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{}", escape_html(&tag.replace(' ', "_"))))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `Thu, 24 Jul 2025 10:00:00 +0000` becomes `July 24, 2025`.
pub fn format_rfc2822_date(date: Option<&str>) -> Option<String> {
    let parsed = DateTime::parse_from_str(date?.trim(), "%a, %d %b %Y %H:%M:%S %z").ok()?;
    Some(parsed.format("%B %d, %Y").to_string())
}

/// Photo caption for article posts.
pub fn article_caption(analysis: &NewsAnalysis) -> String {
    escape_html(non_blank(analysis.catchy_title.as_deref()).unwrap_or(DEFAULT_CAPTION))
}

pub fn news_message(
    original_title: &str,
    origin: Origin<'_>,
    analysis: &NewsAnalysis,
    link: &str,
    doi_link: Option<&str>,
) -> String {
    let title = escape_html(non_blank(analysis.catchy_title.as_deref()).unwrap_or(original_title));
    let eli5 = if analysis.eli5.is_empty() {
        String::new()
    } else {
        format!("🧒 <b>به زبان ساده (ELI5)</b>\n{}\n\n", escape_html(&analysis.eli5))
    };
    let doi = match doi_link {
        Some(doi) => format!("📖 <b>منبع اصلی (DOI):</b>\n<a href='{}'>مشاهده مقاله پژوهشی</a>\n\n", doi),
        None => String::new(),
    };

    format!(
        "📰 <b>خبر علمی</b> 📰\n\n<b>{title}</b>\n\n{summary}\n\n{eli5}{doi}🔗 <a href='{link}'>مطالعه مطلب کامل در {source}</a>\n\n{tags}\n{keywords}",
        summary = escape_html(&analysis.summary),
        source = escape_html(origin.name),
        tags = origin.tag_line(),
        keywords = keyword_tags(&analysis.keywords),
    )
}

pub fn paper_message(
    original_title: &str,
    origin: Origin<'_>,
    analysis: &PaperAnalysis,
    link: &str,
) -> String {
    let highlights = bullet_section("✨ <b>نکات کلیدی</b>", &analysis.highlights);
    let big_so_what = if analysis.big_so_what.is_empty() {
        String::new()
    } else {
        format!("🌍 <b>چرا این مهمه؟</b>\n{}\n\n", escape_html(&analysis.big_so_what))
    };
    let analogy = if analysis.analogy.is_empty() {
        String::new()
    } else {
        format!("💡 <b>مثال برای درک بهتر</b>\n{}\n\n", escape_html(&analysis.analogy))
    };
    let next_steps = bullet_section("🚀 <b>قدم بعدی چیه؟</b>", &analysis.next_steps);

    format!(
        "🔬 <b>تحلیل مقاله علمی</b> 🔬\n\n<b>{original_title}</b>\n\n📝 <b>خلاصه خودمونی</b>\n{summary}\n\n{highlights}🧒 <b>به زبان ساده (ELI5)</b>\n{eli5}\n\n{big_so_what}{analogy}{next_steps}🔗 <a href='{link}'>مطالعه مقاله کامل در {source}</a>\n\n{tags}\n{keywords}",
        original_title = escape_html(original_title),
        summary = escape_html(&analysis.summary),
        eli5 = escape_html(&analysis.eli5),
        source = escape_html(origin.name),
        tags = origin.tag_line(),
        keywords = keyword_tags(&analysis.keywords),
    )
}

fn metadata_line(group_name: &str, pub_date: Option<&str>) -> String {
    match format_rfc2822_date(pub_date) {
        Some(date) => format!("<i>از پادکست {} | {}</i>\n\n", escape_html(group_name), date),
        None => format!("<i>از پادکست {}</i>\n\n", escape_html(group_name)),
    }
}

/// Post for a podcast analysed from its transcript.
pub fn transcript_podcast_message(
    analysis: &TranscriptAnalysis,
    original_title: &str,
    pub_date: Option<&str>,
    origin: Origin<'_>,
    mp3_url: Option<&str>,
) -> String {
    let guest = escape_html(analysis.guest_name.as_deref().unwrap_or(UNKNOWN_GUEST));
    let summary = escape_html(analysis.summary.as_deref().unwrap_or(NO_SUMMARY));
    let topics = bullet_section("🧠 **موضوعات کلیدی:**", &analysis.key_topics);
    let questions = bullet_section("❓ **پرسش‌های جالب:**", &analysis.notable_questions);
    let quote = if analysis.memorable_quote.is_empty() {
        String::new()
    } else {
        format!("💬 **نقل‌قول به یاد ماندنی:**\n*«{}»*\n\n", escape_html(&analysis.memorable_quote))
    };
    let listen = match mp3_url {
        Some(url) => format!("🎧 <a href='{}'>برای شنیدن کامل این قسمت کلیک کنید</a>\n\n", url),
        None => String::new(),
    };

    format!(
        "🎙️ <b>پادکست: {original_title}</b> 🎙️\n{meta}👤 <b>مهمان این قسمت:</b> {guest}\n\n📝 <b>چکیده گفتگو:</b>\n{summary}\n\n{topics}{questions}{quote}{listen}{tags}\n{hashtags}",
        original_title = escape_html(original_title),
        meta = metadata_line(origin.name, pub_date),
        tags = origin.tag_line(),
        hashtags = podcast_hashtags(&analysis.hashtags),
    )
}

/// Post for a podcast analysed from its feed description.
pub fn rss_podcast_message(
    analysis: &RssPodcastAnalysis,
    original_title: &str,
    pub_date: Option<&str>,
    mp3_url: &str,
    origin: Origin<'_>,
) -> String {
    let title = escape_html(analysis.catchy_title.as_deref().unwrap_or(original_title));
    let guest = escape_html(analysis.guest_info.as_deref().unwrap_or(UNKNOWN_GUEST));
    let summary = escape_html(analysis.summary.as_deref().unwrap_or(NO_SUMMARY));
    let takeaways = bullet_section("📌 <b>نکات کلیدی این قسمت:</b>", &analysis.key_takeaways);

    format!(
        "🎙️ <b>{title}</b> 🎙️\n{meta}👤 <b>مهمان یا موضوع:</b> {guest}\n\n📝 <b>چکیده گفتگو:</b>\n{summary}\n\n{takeaways}🎧 <a href='{mp3_url}'>برای شنیدن کامل این قسمت کلیک کنید</a>\n\n{tags}\n{hashtags}",
        meta = metadata_line(origin.name, pub_date),
        tags = origin.tag_line(),
        hashtags = podcast_hashtags(&analysis.hashtags),
    )
}
