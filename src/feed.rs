//! RSS 2.0 and Atom parsing on top of `quick-xml`.

use crate::adapters::http::{fetch_text, BROWSER_USER_AGENT, PAGE_TIMEOUT};
use crate::domain::model::{Enclosure, FeedEntry};
use crate::utils::error::{MokhberError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Client;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    Content,
    Published,
    Updated,
    ItunesSummary,
    DcIdentifier,
    PrismDoi,
}

fn field_for(name: &str) -> Option<Field> {
    match name {
        "title" => Some(Field::Title),
        "link" => Some(Field::Link),
        "description" | "summary" => Some(Field::Description),
        "content:encoded" | "content" => Some(Field::Content),
        "pubdate" | "published" => Some(Field::Published),
        "updated" | "dc:date" => Some(Field::Updated),
        "itunes:summary" => Some(Field::ItunesSummary),
        "dc:identifier" => Some(Field::DcIdentifier),
        "prism:doi" => Some(Field::PrismDoi),
        _ => None,
    }
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase()
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        if attr.key.as_ref().eq_ignore_ascii_case(key.as_bytes()) {
            let value = attr
                .unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            Some(value)
        } else {
            None
        }
    })
}

/// Handles `<link href=..>` (Atom) and `<enclosure url=..>` (RSS); returns true when consumed.
fn apply_link_attributes(entry: &mut FeedEntry, name: &str, e: &BytesStart<'_>) -> bool {
    match name {
        "enclosure" => {
            if let Some(href) = attribute(e, "url") {
                entry.enclosures.push(Enclosure {
                    href,
                    mime_type: attribute(e, "type"),
                });
            }
            true
        }
        "link" => {
            let Some(href) = attribute(e, "href") else {
                return false;
            };
            match attribute(e, "rel").as_deref() {
                Some("enclosure") => entry.enclosures.push(Enclosure {
                    href,
                    mime_type: attribute(e, "type"),
                }),
                None | Some("alternate") if entry.link.is_empty() => entry.link = href,
                _ => {}
            }
            true
        }
        _ => false,
    }
}

fn set_field(entry: &mut FeedEntry, field: Field, text: String) {
    let text = text.trim().to_string();
    if text.is_empty() {
        return;
    }
    match field {
        Field::Title => entry.title = text,
        Field::Link => {
            if entry.link.is_empty() {
                entry.link = text
            }
        }
        Field::Description => entry.description = Some(text),
        Field::Content => entry.content_html = Some(text),
        Field::Published => entry.published = Some(text),
        Field::Updated => {
            if entry.published.is_none() {
                entry.published = Some(text)
            }
        }
        Field::ItunesSummary => entry.itunes_summary = Some(text),
        Field::DcIdentifier => entry.dc_identifier = Some(text),
        Field::PrismDoi => entry.prism_doi = Some(text),
    }
}

/// Parses the items of an RSS channel or the entries of an Atom feed, in document order.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut current: Option<FeedEntry> = None;
    // Active field, its text so far and how many child elements deep we are inside it.
    let mut field: Option<(Field, String, usize)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = element_name(&e);
                if let Some((_, _, depth)) = field.as_mut() {
                    *depth += 1;
                    continue;
                }
                if name == "item" || name == "entry" {
                    current = Some(FeedEntry::default());
                    continue;
                }
                let Some(entry) = current.as_mut() else {
                    continue;
                };
                if apply_link_attributes(entry, &name, &e) {
                    continue;
                }
                if let Some(f) = field_for(&name) {
                    field = Some((f, String::new(), 0));
                }
            }
            Event::Empty(e) => {
                if field.is_some() {
                    continue;
                }
                if let Some(entry) = current.as_mut() {
                    apply_link_attributes(entry, &element_name(&e), &e);
                }
            }
            Event::Text(e) => {
                if let Some((_, text, _)) = field.as_mut() {
                    let decoded = e
                        .unescape()
                        .map(|t| t.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                    text.push_str(&decoded);
                }
            }
            Event::CData(e) => {
                if let Some((_, text, _)) = field.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                if let Some((f, text, depth)) = field.take() {
                    if depth > 0 {
                        field = Some((f, text, depth - 1));
                        continue;
                    }
                    if let Some(entry) = current.as_mut() {
                        set_field(entry, f, text);
                    }
                    continue;
                }
                if name == "item" || name == "entry" {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

/// Downloads and parses feeds with the shared HTTP client.
#[derive(Clone)]
pub struct FeedReader {
    client: Client,
}

impl FeedReader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>> {
        tracing::info!("  Fetching feed: {}", url);
        let xml = fetch_text(&self.client, url, BROWSER_USER_AGENT, PAGE_TIMEOUT)
            .await
            .map_err(|e| MokhberError::FeedError {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        parse_feed(&xml).map_err(|e| MokhberError::FeedError {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
